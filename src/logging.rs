//! Logging setup utilities for the application.
//!
//! This module configures logging to stderr, and optionally a log file, using the `log4rs` crate.
//! Standard output is left free for the computed scores.

use std::path::Path;

use anyhow::Context;
use log::LevelFilter;
use log4rs::{
    append::{console::{ConsoleAppender, Target}, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_PATTERN: &str = "[{d(%Y-%m-%d %H:%M:%S)}] {h({l})}: {m}{n}";

/// Configure logger to write to stderr and, if specified, a log file.
pub fn setup_logger(log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = LevelFilter::Info;

    // log to stderr
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .target(Target::Stderr)
        .build();

    let mut config = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    // log to file
    if let Some(log_file) = log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .append(false)
            .build(log_file)
            .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

        config = config.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("logfile", Box::new(logfile)),
        );
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(LevelFilter::Trace))
        .context("Failed to configure logger.")?;

    log4rs::init_config(config).context("Failed to initialize logger.")?;
    Ok(())
}
