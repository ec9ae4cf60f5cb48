//! # Modules
//!
//! The compiled catalogue of module types a channel can load.
//! Core modules (`help`, `cmdadd`, `cmddel`, `prefix`, `target`) are always present;
//! `request` is loaded only when a channel lists it.

pub mod cmdadd;
pub mod cmddel;
pub mod help;
pub mod prefix;
pub mod request;
pub mod target;

use crate::application::modules::ModuleKind;

pub fn catalogue() -> Vec<ModuleKind> {
    vec![
        help::kind(),
        cmdadd::kind(),
        cmddel::kind(),
        prefix::kind(),
        target::kind(),
        request::kind(),
    ]
}
