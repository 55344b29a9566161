#![cfg_attr(test, allow(clippy::expect_used))]

pub mod commands;
pub mod params;
pub mod types;

pub use commands::{BotCommand, UnknownCommand};
pub use params::{DEFAULT_PREFIX, keys, parameter_name, validate_prefix};
pub use types::*;
