//! # request Module
//!
//! osu! beatmap requests. A viewer posts a beatmap link (optionally with `+mods`);
//! the module looks the map up through the osu! API v1, formats a message from
//! `message_format` and delivers it to the configured osu! account over osu! IRC.
//!
//! Setup: fill in `osu_user_id`, `osu_api_key`, `osu_irc_pwd` and `osu_trgt_id`
//! under `module_config.request`, add `request` to the channel's `modules`, and
//! create a command whose response is `&request&`.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::application::cooldown::CallerCooldowns;
use crate::application::modules::{
    Consumes, InvocationContext, Module, ModuleConfig, ModuleKind, Reply,
};
use crate::application::template;
use crate::domain::errors::EngineError;
use crate::domain::types::Author;
use crate::strings::{help, messages};

pub fn kind() -> ModuleKind {
    ModuleKind {
        name: "request",
        help: help::REQUEST,
        consumes: Consumes::up_to(2),
        core: false,
        defaults,
        build,
    }
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    // from your osu! profile URL
    map.insert("osu_user_id".into(), json!(""));
    // https://osu.ppy.sh/p/api
    map.insert("osu_api_key".into(), json!(""));
    // https://old.ppy.sh/p/irc
    map.insert("osu_irc_pwd".into(), json!(""));
    // account that receives the requests
    map.insert("osu_trgt_id".into(), json!(""));
    map.insert(
        "message_format".into(),
        json!("&requester& (&requesterstatus&) requested: &map& &mods& (&length& @ &bpm&BPM, &stars&*, by &creator&)"),
    );
    // seconds between requests of one viewer
    map.insert("cd_per_user".into(), json!(0));
    // only mods, subs and VIPs may request
    map.insert("submode".into(), json!(false));
    map.insert("api_base".into(), json!("https://osu.ppy.sh/api"));
    map.insert("irc_host".into(), json!("irc.ppy.sh"));
    map.insert("irc_port".into(), json!(6667));
    map
}

#[derive(Debug, Clone, Deserialize)]
struct Settings {
    osu_user_id: String,
    osu_api_key: String,
    osu_irc_pwd: String,
    osu_trgt_id: String,
    message_format: String,
    cd_per_user: u64,
    submode: bool,
    api_base: String,
    irc_host: String,
    irc_port: u16,
}

fn build(config: ModuleConfig) -> BoxFuture<'static, Result<Box<dyn Module>>> {
    async move {
        let settings: Settings = config.parse().context("invalid request config")?;
        if settings.osu_api_key.is_empty() {
            bail!("osu_api_key is not configured");
        }

        let client = OsuClient::new(&settings);
        let username = client
            .resolve_username(&settings.osu_user_id)
            .await
            .context("could not resolve own osu! username, API key may be invalid")?;
        let target = if settings.osu_user_id == settings.osu_trgt_id {
            tracing::debug!("request target is the bot account, skipping second lookup");
            username.clone()
        } else {
            client
                .resolve_username(&settings.osu_trgt_id)
                .await
                .context("could not resolve target osu! username")?
        };

        let client = client.with_identity(username, target);
        Ok(Box::new(Request::new(settings, client)) as Box<dyn Module>)
    }
    .boxed()
}

/// One difficulty as returned by `get_beatmaps`. The v1 API sends every field as a string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Beatmap {
    pub beatmap_id: String,
    pub beatmapset_id: String,
    pub approved: String,
    pub creator: String,
    pub creator_id: String,
    pub total_length: String,
    pub bpm: String,
    pub difficultyrating: String,
    pub diff_size: String,
    pub diff_overall: String,
    pub diff_approach: String,
    pub diff_drain: String,
    pub mode: String,
    pub artist: String,
    pub artist_unicode: Option<String>,
    pub title: String,
    pub title_unicode: Option<String>,
    pub source: String,
    pub version: String,
}

impl Beatmap {
    fn stars(&self) -> f64 {
        self.difficultyrating.parse().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapLink {
    Beatmap(String),
    Set(String),
}

static BEATMAP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https://osu\.ppy\.sh/beatmapsets/[\w#]+/(\d+)$",
        r"^https://osu\.ppy\.sh/b(?:eatmaps)?/(\d+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("beatmap link pattern compiles"))
    .collect()
});

static BEATMAPSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://osu\.ppy\.sh/beatmapsets/(\d+)$").expect("beatmapset link pattern compiles")
});

/// Difficulty links win over set links.
pub fn parse_link(link: &str) -> Option<MapLink> {
    for re in BEATMAP_RES.iter() {
        if let Some(id) = re.captures(link).and_then(|c| c.get(1)) {
            return Some(MapLink::Beatmap(id.as_str().to_string()));
        }
    }
    BEATMAPSET_RE
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|id| MapLink::Set(id.as_str().to_string()))
}

const OSU_MODS: &[&str] = &[
    "EZ", "NF", "HT", "HR", "SD", "PF", "DT", "NC", "HD", "FL", "RX", "AP", "SO", "V2",
];

/// `+hddt`, `HD,DT` -> `+HD,DT`; unknown and repeated mods are dropped.
pub fn mods_string(raw: &str) -> String {
    let cleaned: Vec<char> = raw
        .trim_start_matches('+')
        .replace(',', "")
        .to_uppercase()
        .chars()
        .collect();

    let mut mods: Vec<String> = Vec::new();
    for pair in cleaned.chunks(2) {
        let m: String = pair.iter().collect();
        if OSU_MODS.contains(&m.as_str()) && !mods.contains(&m) {
            mods.push(m);
        }
    }

    if mods.is_empty() {
        String::new()
    } else {
        format!("+{}", mods.join(","))
    }
}

fn approval_status(approved: &str) -> &'static str {
    match approved.parse::<i32>() {
        Ok(-2) => "Graveyard",
        Ok(-1) => "WIP",
        Ok(0) => "Pending",
        Ok(1) => "Ranked",
        Ok(2) => "Approved",
        Ok(3) => "Qualified",
        Ok(4) => "Loved",
        _ => "Unknown",
    }
}

fn game_mode(mode: &str) -> &'static str {
    match mode {
        "0" => "Standard",
        "1" => "Taiko",
        "2" => "CTB",
        "3" => "Mania",
        _ => "Unknown",
    }
}

fn author_status(author: &Author) -> &'static str {
    if author.is_moderator {
        "Moderator"
    } else if author.is_vip {
        "VIP"
    } else if author.is_subscriber {
        "Subscriber"
    } else {
        "Viewer"
    }
}

/// `180.00` -> `180`, `5.2700` -> `5.27`
fn round2(raw: &str) -> String {
    let value: f64 = raw.parse().unwrap_or(0.0);
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn length(raw: &str) -> String {
    let seconds: u64 = raw.parse().unwrap_or(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn field(key: &str, map: &Beatmap, mods: &str, sender: &Author) -> Option<String> {
    let value = match key {
        "map" => format!(
            "[https://osu.ppy.sh/b/{} {} - {} [{}]]",
            map.beatmap_id, map.artist, map.title, map.version
        ),
        "mapid" => map.beatmap_id.clone(),
        "mapsetid" => map.beatmapset_id.clone(),
        "mapstatus" => approval_status(&map.approved).to_string(),
        "creator" => format!("[https://osu.ppy.sh/users/{} {}]", map.creator_id, map.creator),
        "creatorid" => map.creator_id.clone(),
        "creatorname" => map.creator.clone(),
        "length" => length(&map.total_length),
        "bpm" => round2(&map.bpm),
        "stars" => round2(&map.difficultyrating),
        "cs" => map.diff_size.clone(),
        "od" => map.diff_overall.clone(),
        "ar" => map.diff_approach.clone(),
        "hp" => map.diff_drain.clone(),
        "gamemode" => game_mode(&map.mode).to_string(),
        "song" => format!("{} - {}", map.artist, map.title),
        "songartist" => map.artist.clone(),
        "songartistunicode" => map.artist_unicode.clone().unwrap_or_else(|| map.artist.clone()),
        "songtitle" => map.title.clone(),
        "songtitleunicode" => map.title_unicode.clone().unwrap_or_else(|| map.title.clone()),
        "songsource" => map.source.clone(),
        "requester" => sender.name.clone(),
        "requesterstatus" => author_status(sender).to_string(),
        "mods" => mods.to_string(),
        _ => return None,
    };
    Some(value)
}

/// Fills `&key&` fields of `format`. Unknown keys are a config error and stay literal.
pub fn format_message(format: &str, map: &Beatmap, mods: &str, sender: &Author) -> String {
    let mut out = String::with_capacity(format.len());
    let mut last = 0;
    for token in template::tokens(format) {
        out.push_str(&format[last..token.range.start]);
        last = token.range.end;
        match field(&token.name, map, mods, sender) {
            Some(value) => out.push_str(&value),
            None => {
                tracing::error!(key = %token.name, "config error: message_format uses invalid key");
                out.push_str(token.literal);
            }
        }
    }
    out.push_str(&format[last..]);
    out
}

/// Network side of the module.
#[async_trait]
pub trait OsuBackend: Send + Sync {
    async fn beatmaps(&self, link: &MapLink) -> Result<Vec<Beatmap>>;

    async fn deliver(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct OsuUser {
    username: String,
}

pub struct OsuClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    irc_host: String,
    irc_port: u16,
    irc_password: String,
    username: String,
    target: String,
}

impl OsuClient {
    fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.osu_api_key.clone(),
            irc_host: settings.irc_host.clone(),
            irc_port: settings.irc_port,
            irc_password: settings.osu_irc_pwd.clone(),
            username: String::new(),
            target: String::new(),
        }
    }

    fn with_identity(mut self, username: String, target: String) -> Self {
        self.username = username;
        self.target = target;
        self
    }

    /// IRC names use `_` where the profile name has spaces.
    async fn resolve_username(&self, id: &str) -> Result<String> {
        tracing::debug!(id, "resolving osu! username");
        let users: Vec<OsuUser> = self
            .http
            .get(format!("{}/get_user", self.api_base))
            .query(&[("u", id), ("k", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let user = users
            .into_iter()
            .next()
            .with_context(|| format!("no osu! user with id {id}"))?;
        let name = user.username.replace(' ', "_");
        tracing::debug!(id, name = %name, "resolved osu! username");
        Ok(name)
    }
}

#[async_trait]
impl OsuBackend for OsuClient {
    async fn beatmaps(&self, link: &MapLink) -> Result<Vec<Beatmap>> {
        let (key, id) = match link {
            MapLink::Beatmap(id) => ("b", id),
            MapLink::Set(id) => ("s", id),
        };
        tracing::debug!(key, id = %id, "retrieving osu! beatmap info");
        let maps = self
            .http
            .get(format!("{}/get_beatmaps", self.api_base))
            .query(&[(key, id.as_str()), ("k", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(maps)
    }

    async fn deliver(&self, message: &str) -> Result<()> {
        tracing::debug!(from = %self.username, to = %self.target, message, "sending osu! message");
        let mut irc = TcpStream::connect((self.irc_host.as_str(), self.irc_port))
            .await
            .with_context(|| format!("connecting to {}:{}", self.irc_host, self.irc_port))?;

        let lines = format!(
            "PASS {pass}\r\nNICK {user}\r\nUSER {user} 0 * :{user}\r\nPRIVMSG {target} :{message}\r\nQUIT\r\n",
            pass = self.irc_password,
            user = self.username,
            target = self.target,
        );
        irc.write_all(lines.as_bytes()).await?;
        irc.shutdown().await?;
        Ok(())
    }
}

pub struct Request<B> {
    settings: Settings,
    backend: B,
    cooldowns: CallerCooldowns,
}

impl<B: OsuBackend> Request<B> {
    fn new(settings: Settings, backend: B) -> Self {
        let cooldowns = CallerCooldowns::new(Duration::from_secs(settings.cd_per_user));
        Self {
            settings,
            backend,
            cooldowns,
        }
    }

    async fn lookup(&self, link: &MapLink) -> Option<Beatmap> {
        let mut maps = match self.backend.beatmaps(link).await {
            Ok(maps) => maps,
            Err(e) => {
                tracing::warn!("beatmap lookup failed: {:#}", e);
                return None;
            }
        };
        // a set link means its hardest difficulty
        maps.sort_by(|a, b| b.stars().total_cmp(&a.stars()));
        maps.into_iter().next()
    }
}

#[async_trait]
impl<B: OsuBackend> Module for Request<B> {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError> {
        let author = ctx.author;

        if self.settings.submode && !author.is_privileged() {
            return Ok(Reply::Suppress);
        }

        if !self.cooldowns.status(&author.id).is_ready() {
            tracing::debug!(author = %author.name, "request while on cooldown, ignoring");
            return Ok(Reply::Suppress);
        }

        let Some(request) = args.first().map(|a| a.to_lowercase()) else {
            return Ok(Reply::text(messages::REQUEST_NO_MAP));
        };

        if request == "submode" && author.is_moderator {
            self.settings.submode = !self.settings.submode;
            ctx.session
                .set_module_option("request", "submode", json!(self.settings.submode));
            return Ok(Reply::text(if self.settings.submode {
                messages::SUBMODE_ENABLED
            } else {
                messages::SUBMODE_DISABLED
            }));
        }

        let mods = args.get(1).map(|m| mods_string(m)).unwrap_or_default();

        let Some(link) = parse_link(&request) else {
            return Ok(Reply::text(messages::REQUEST_BAD_LINK));
        };

        let Some(map) = self.lookup(&link).await else {
            return Ok(Reply::text(messages::REQUEST_NO_INFO));
        };

        let message = format_message(&self.settings.message_format, &map, &mods, author);
        self.backend
            .deliver(&message)
            .await
            .map_err(|e| EngineError::Module(format!("osu! message delivery failed: {e:#}")))?;

        self.cooldowns.charge(&author.id);
        Ok(Reply::text(messages::REQUEST_SENT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::CommandRegistry;
    use crate::application::dispatcher::{Dispatcher, Outcome};
    use crate::application::modules::ModuleRegistry;
    use crate::application::session::{ChannelSession, SessionState};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeOsu {
        maps: Vec<Beatmap>,
        sent: Arc<Mutex<Vec<String>>>,
        fail_delivery: bool,
    }

    #[async_trait]
    impl OsuBackend for FakeOsu {
        async fn beatmaps(&self, _link: &MapLink) -> Result<Vec<Beatmap>> {
            Ok(self.maps.clone())
        }

        async fn deliver(&self, message: &str) -> Result<()> {
            if self.fail_delivery {
                bail!("connection refused");
            }
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    fn beatmap(id: &str, stars: &str) -> Beatmap {
        Beatmap {
            beatmap_id: id.to_string(),
            beatmapset_id: "100".to_string(),
            approved: "1".to_string(),
            creator: "mapper".to_string(),
            creator_id: "42".to_string(),
            total_length: "125".to_string(),
            bpm: "180".to_string(),
            difficultyrating: stars.to_string(),
            artist: "Artist".to_string(),
            title: "Song".to_string(),
            version: format!("Diff {id}"),
            mode: "0".to_string(),
            ..Beatmap::default()
        }
    }

    fn settings() -> Settings {
        serde_json::from_value(Value::Object(defaults())).unwrap()
    }

    fn request(backend: FakeOsu, tweak: impl FnOnce(&mut Settings)) -> Request<FakeOsu> {
        let mut settings = settings();
        tweak(&mut settings);
        Request::new(settings, backend)
    }

    async fn try_call(
        module: &mut Request<FakeOsu>,
        author: &Author,
        args: &[&str],
    ) -> Result<Reply, EngineError> {
        let mut session = SessionState::new("chan", "r!", CommandRegistry::new());
        let modules = ModuleRegistry::new();
        let mut ctx = InvocationContext {
            author,
            session: &mut session,
            modules: &modules,
        };
        let args = args.iter().map(|s| s.to_string()).collect();
        module.main(args, &mut ctx).await
    }

    async fn call(module: &mut Request<FakeOsu>, author: &Author, args: &[&str]) -> Reply {
        try_call(module, author, args).await.unwrap()
    }

    #[test]
    fn test_parse_link() {
        assert_eq!(
            parse_link("https://osu.ppy.sh/beatmapsets/123#osu/456"),
            Some(MapLink::Beatmap("456".into()))
        );
        assert_eq!(parse_link("https://osu.ppy.sh/b/789"), Some(MapLink::Beatmap("789".into())));
        assert_eq!(
            parse_link("https://osu.ppy.sh/beatmaps/789"),
            Some(MapLink::Beatmap("789".into()))
        );
        assert_eq!(parse_link("https://osu.ppy.sh/beatmapsets/123"), Some(MapLink::Set("123".into())));
        assert_eq!(parse_link("https://example.com/b/1"), None);
        assert_eq!(parse_link("not a link"), None);
    }

    #[test]
    fn test_mods_string() {
        assert_eq!(mods_string("+hddt"), "+HD,DT");
        assert_eq!(mods_string("HD,HR"), "+HD,HR");
        assert_eq!(mods_string("+HDHDXX"), "+HD");
        assert_eq!(mods_string("+zz"), "");
        assert_eq!(mods_string(""), "");
    }

    #[test]
    fn test_format_message() {
        let map = beatmap("7", "5.2712");
        let sender = Author::new("u1", "bob").subscriber();
        let message = format_message(
            "&requester& (&requesterstatus&) requested: &map& &mods& (&length& @ &bpm&BPM, &stars&*, &mapstatus&) &bogus&",
            &map,
            "+HD",
            &sender,
        );
        assert_eq!(
            message,
            "bob (Subscriber) requested: [https://osu.ppy.sh/b/7 Artist - Song [Diff 7]] +HD (2:05 @ 180BPM, 5.27*, Ranked) &bogus&"
        );
    }

    #[test]
    fn test_status_names() {
        assert_eq!(approval_status("-2"), "Graveyard");
        assert_eq!(approval_status("4"), "Loved");
        assert_eq!(game_mode("3"), "Mania");
        assert_eq!(round2("5.0"), "5");
    }

    #[tokio::test]
    async fn test_request_sends_hardest_difficulty() {
        let backend = FakeOsu {
            maps: vec![beatmap("1", "2.5"), beatmap("2", "6.1"), beatmap("3", "4.0")],
            ..FakeOsu::default()
        };
        let sent = backend.sent.clone();
        let mut module = request(backend, |s| s.message_format = "&mapid& &mods&".into());

        let reply = call(&mut module, &Author::new("u1", "bob"), &["https://osu.ppy.sh/beatmapsets/100", "+dt"]).await;
        assert_eq!(reply, Reply::text(messages::REQUEST_SENT));
        assert_eq!(*sent.lock().unwrap(), vec!["2 +DT".to_string()]);
    }

    #[tokio::test]
    async fn test_request_replies() {
        let mut module = request(FakeOsu::default(), |_| {});
        let bob = Author::new("u1", "bob");
        assert_eq!(call(&mut module, &bob, &[]).await, Reply::text(messages::REQUEST_NO_MAP));
        assert_eq!(
            call(&mut module, &bob, &["nope"]).await,
            Reply::text(messages::REQUEST_BAD_LINK)
        );
        // empty API answer
        assert_eq!(
            call(&mut module, &bob, &["https://osu.ppy.sh/b/1"]).await,
            Reply::text(messages::REQUEST_NO_INFO)
        );
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_charge_cooldown() {
        let backend = FakeOsu {
            maps: vec![beatmap("1", "2.0")],
            fail_delivery: true,
            ..FakeOsu::default()
        };
        let mut module = request(backend, |s| s.cd_per_user = 60);
        let bob = Author::new("u1", "bob");
        let err = try_call(&mut module, &bob, &["https://osu.ppy.sh/b/1"])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Module(ref msg) if msg.contains("connection refused")));
        assert!(module.cooldowns.status("u1").is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_user_cooldown_suppresses() {
        let backend = FakeOsu {
            maps: vec![beatmap("1", "2.0")],
            ..FakeOsu::default()
        };
        let mut module = request(backend, |s| s.cd_per_user = 30);
        let bob = Author::new("u1", "bob");
        let carol = Author::new("u2", "carol");
        let link = ["https://osu.ppy.sh/b/1"];

        assert_eq!(call(&mut module, &bob, &link).await, Reply::text(messages::REQUEST_SENT));
        assert_eq!(call(&mut module, &bob, &link).await, Reply::Suppress);
        assert_eq!(call(&mut module, &carol, &link).await, Reply::text(messages::REQUEST_SENT));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(call(&mut module, &bob, &link).await, Reply::text(messages::REQUEST_SENT));
    }

    #[tokio::test]
    async fn test_submode() {
        let backend = FakeOsu {
            maps: vec![beatmap("1", "2.0")],
            ..FakeOsu::default()
        };
        let mut module = request(backend, |_| {});
        let viewer = Author::new("u1", "bob");
        let vip = Author::new("u2", "vera").vip();
        let moderator = Author::new("u3", "mod").moderator();
        let link = ["https://osu.ppy.sh/b/1"];

        // viewers cannot toggle
        assert_eq!(call(&mut module, &viewer, &["submode"]).await, Reply::text(messages::REQUEST_BAD_LINK));
        assert_eq!(call(&mut module, &moderator, &["submode"]).await, Reply::text(messages::SUBMODE_ENABLED));
        assert_eq!(call(&mut module, &viewer, &link).await, Reply::Suppress);
        assert_eq!(call(&mut module, &vip, &link).await, Reply::text(messages::REQUEST_SENT));
        assert_eq!(call(&mut module, &moderator, &["SUBMODE"]).await, Reply::text(messages::SUBMODE_DISABLED));
        assert_eq!(call(&mut module, &viewer, &link).await, Reply::text(messages::REQUEST_SENT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submode_toggle_is_written_back() {
        let mut commands = CommandRegistry::new();
        commands.add_or_modify("req", 0, "&request&", false, false).unwrap();
        let mut modules = ModuleRegistry::new();
        let module = request(FakeOsu::default(), |_| {});
        modules.insert("request", help::REQUEST, Consumes::up_to(2), Box::new(module));
        let mut session = ChannelSession::new(SessionState::new("chan", "r!", commands), modules);

        let moderator = Author::new("m1", "mod").moderator();
        let d = Dispatcher::new(Duration::from_secs(5));
        assert_eq!(
            d.dispatch(&mut session, &moderator, "r!req submode").await,
            Outcome::Sent(messages::SUBMODE_ENABLED.into())
        );
        assert!(session.state.take_dirty());
        assert_eq!(session.to_config().module_config["request"]["submode"], json!(true));

        d.dispatch(&mut session, &moderator, "r!req submode").await;
        assert_eq!(session.to_config().module_config["request"]["submode"], json!(false));
    }

    #[tokio::test]
    async fn test_build_without_api_key_fails() {
        let config = ModuleConfig::merged("request", defaults(), None);
        let err = build(config).await.err().unwrap();
        assert!(err.to_string().contains("osu_api_key"));
    }
}
