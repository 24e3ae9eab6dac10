#![allow(clippy::collapsible_if)]

pub mod config;
pub mod defaults;
pub mod display;
pub mod engine;
pub mod events;
pub mod grid;
pub mod logging;
pub mod oracle;
pub mod players;
pub mod scoreboard;
pub mod shutdown;
