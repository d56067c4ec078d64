//! Logging setup
//!
//! Only initializes if the ANNOTATOR_LOG environment variable is set.
//! Logs go to `config.log_file` when configured, otherwise stderr.

use std::fs::File;

use annotator_core::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ANNOTATOR_LOG";

pub fn init(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let env_filter = EnvFilter::new(filter_directive(&log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore the error if a subscriber is already installed
    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = builder.with_ansi(false).with_writer(log_file).try_init();
            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

fn filter_directive(level: &str) -> String {
    format!("annotator_core={},annotator_cli={}", level, level)
}
