//! # Template Resolver
//!
//! Expands a command's response template. Tokens are `&name&` and are resolved
//! left to right with a fixed precedence:
//!
//! 1. built-in variable (`caller`, `callerid`, `channel`, `uptime`)
//! 2. loaded module, which pops its arguments and runs
//! 3. unresolved: the literal token stays in the output and is reported
//!
//! Module output is inserted verbatim and never re-scanned, so resolution is a
//! single pass over the template. A module answering `Reply::Suppress` vetoes
//! the whole response, including tokens already resolved.

use regex::Regex;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::LazyLock;
use std::time::Duration;

use crate::application::modules::{InvocationContext, ModuleRegistry, Reply};
use crate::application::session::SessionState;
use crate::domain::errors::EngineError;
use crate::domain::types::Author;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z0-9_]+)&").expect("token pattern compiles"));

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'t> {
    /// Lowercased name.
    pub name: String,
    /// Literal text, delimiters included.
    pub literal: &'t str,
    pub range: Range<usize>,
}

/// Placeholders of `template` in order of appearance.
pub fn tokens(template: &str) -> impl Iterator<Item = Token<'_>> {
    TOKEN_RE.captures_iter(template).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(Token {
            name: name.as_str().to_lowercase(),
            literal: whole.as_str(),
            range: whole.range(),
        })
    })
}

/// True when the template is nothing but one token (surrounding whitespace aside).
fn is_single_token(template: &str) -> bool {
    let trimmed = template.trim();
    TOKEN_RE
        .find(trimmed)
        .is_some_and(|m| m.start() == 0 && m.end() == trimmed.len())
}

fn builtin(name: &str, author: &Author, session: &SessionState) -> Option<String> {
    match name {
        "caller" => Some(author.name.clone()),
        "callerid" => Some(author.id.clone()),
        "channel" => Some(session.channel.clone()),
        "uptime" => Some(format_uptime(session.started_at.elapsed())),
        _ => None,
    }
}

/// `H:MM:SS`
pub fn format_uptime(elapsed: Duration) -> String {
    let delta = chrono::TimeDelta::from_std(elapsed).unwrap_or_default();
    format!(
        "{}:{:02}:{:02}",
        delta.num_hours(),
        delta.num_minutes() % 60,
        delta.num_seconds() % 60
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub rendered: Rendered,
    /// `UnknownPlaceholder` errors for tokens left as literal text.
    pub unresolved: Vec<EngineError>,
}

pub struct TemplateResolver {
    module_timeout: Duration,
}

impl TemplateResolver {
    pub fn new(module_timeout: Duration) -> Self {
        Self { module_timeout }
    }

    /// Resolves `template`, popping module arguments from the front of `args`.
    ///
    /// Errors from a module (including `InsufficientArguments` and timeouts)
    /// abort the resolution; unknown tokens do not.
    pub async fn resolve(
        &self,
        template: &str,
        args: &mut VecDeque<String>,
        author: &Author,
        session: &mut SessionState,
        modules: &ModuleRegistry,
    ) -> Result<Resolution, EngineError> {
        let whole_body = is_single_token(template);
        let mut output = String::with_capacity(template.len());
        let mut unresolved = Vec::new();
        let mut last = 0;
        let found: Vec<Token<'_>> = tokens(template).collect();

        for token in found {
            output.push_str(&template[last..token.range.start]);
            last = token.range.end;

            if let Some(value) = builtin(&token.name, author, session) {
                output.push_str(&value);
                continue;
            }

            let module = match modules.lookup(&token.name) {
                Ok(module) => module,
                Err(EngineError::ModuleNotFound(_)) => {
                    output.push_str(token.literal);
                    unresolved.push(EngineError::UnknownPlaceholder(token.name));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let available = args.len();
            if available < module.consumes.required {
                return Err(EngineError::InsufficientArguments {
                    module: module.name.clone(),
                    required: module.consumes.required,
                    available,
                });
            }
            let take = match module.consumes.limit {
                Some(limit) if !whole_body => limit.min(available),
                _ => available,
            };
            let popped: Vec<String> = args.drain(..take).collect();

            tracing::debug!(module = %module.name, args = ?popped, "invoking module");
            let mut instance = module.instance.lock().await;
            let mut ctx = InvocationContext {
                author,
                session: &mut *session,
                modules,
            };
            let reply = tokio::time::timeout(self.module_timeout, instance.main(popped, &mut ctx))
                .await
                .map_err(|_| EngineError::ModuleUnavailable {
                    name: module.name.clone(),
                    reason: format!("timed out after {}s", self.module_timeout.as_secs()),
                })??;

            match reply {
                Reply::Text(text) => output.push_str(&text),
                Reply::Suppress => {
                    tracing::debug!(module = %module.name, "response suppressed");
                    return Ok(Resolution {
                        rendered: Rendered::Suppressed,
                        unresolved,
                    });
                }
            }
        }

        output.push_str(&template[last..]);
        Ok(Resolution {
            rendered: Rendered::Text(output),
            unresolved,
        })
    }
}
