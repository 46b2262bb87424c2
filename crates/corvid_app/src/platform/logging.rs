//! Logger setup for the terminal client.
//!
//! The terminal doubles as the UI, so `log_to_file` sends everything to
//! `./corvid.log` instead of interleaving it with the rendered screen.

use corvid_logging::{parse_level, LogDestination};

use super::config::AppConfig;

pub fn initialize(config: &AppConfig) {
    let destination = if config.log_to_file {
        LogDestination::default_file()
    } else {
        LogDestination::Terminal
    };
    corvid_logging::initialize(destination, parse_level(&config.log_level));
}
