//! Log sinks for the two front ends. The terminal UI routes `log` records into a
//! `tui-logger` pane; the admin CLI writes them to stderr.

use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use tracing_subscriber::filter::LevelFilter as SinkLevel;

/// Capture records for `TuiLoggerWidget`.
pub fn init_tui(level: LevelFilter) -> Result<()> {
    tui_logger::init_logger(level).context("install tui logger")?;
    tui_logger::set_default_level(level);
    Ok(())
}

/// Send records to stderr, bridged through the `tracing` fmt subscriber.
pub fn init_stderr(level: LevelFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_max_level(sink_level(level))
        .try_init()
        .map_err(|err| anyhow!("install stderr logger: {err}"))
}

fn sink_level(level: LevelFilter) -> SinkLevel {
    match level {
        LevelFilter::Off => SinkLevel::OFF,
        LevelFilter::Error => SinkLevel::ERROR,
        LevelFilter::Warn => SinkLevel::WARN,
        LevelFilter::Info => SinkLevel::INFO,
        LevelFilter::Debug => SinkLevel::DEBUG,
        LevelFilter::Trace => SinkLevel::TRACE,
    }
}
