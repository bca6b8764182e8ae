//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `pwned_notice` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Reading the message file and printing incidents as JSON lines
//!
//! All core functionality is implemented in the library crate.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use pwned_notice::config::Opt;
use pwned_notice::initialization::{init_logger_with, init_resolver};
use pwned_notice::{LogObserver, Message, NoticeParser, ParseStats, ParserConfig, PwnedParser};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut config = match &opt.config {
        Some(path) => ParserConfig::from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ParserConfig::default(),
    };
    let timeout_secs = opt.dns_timeout_secs(config.dns_timeout_secs);
    config.dns_timeout_secs = Some(timeout_secs);

    let raw = std::fs::read_to_string(&opt.message)
        .with_context(|| format!("Failed to read message {}", opt.message.display()))?;
    let message = Message::from_raw(&raw);

    let stats = Arc::new(ParseStats::new());
    let resolver = init_resolver(Duration::from_secs(timeout_secs));
    let parser = PwnedParser::new(config, resolver)
        .context("Invalid parser configuration")?
        .with_observer((LogObserver, Arc::clone(&stats)));

    if !opt.skip_sender_check && !parser.accepts(&message) {
        log::warn!(
            "Message from {:?} does not match the {} sender patterns",
            message.from(),
            parser.name()
        );
        process::exit(2);
    }

    for incident in parser.parse(&message).await {
        println!(
            "{}",
            serde_json::to_string(&incident).context("Failed to serialize incident")?
        );
    }
    stats.log_summary();

    Ok(())
}
