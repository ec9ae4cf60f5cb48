//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (`ChatProvider`, `ChannelStore`).

pub mod console;
pub mod matrix;
pub mod storage;
pub mod telemetry;
