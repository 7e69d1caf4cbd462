//! Stderr logging for the scanning tools.
//!
//! Records from this workspace (targets under `section_scan`) are shown at
//! the requested level. Records from dependencies such as the image decoders
//! are capped at `warn` so `-vv` stays readable. Each line reads
//! `[elapsed LEVEL stage] message`, where `stage` is the last path segment
//! of the record target (`extract`, `classify`, ...).

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// Target prefix shared by both workspace crates.
pub const WORKSPACE_TARGET: &str = "section_scan";

/// Default `tracing` filter when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
pub const DEFAULT_TRACING_FILTER: &str = "section_scan=info,section_scan_core=info,warn";

struct StageLogger {
    own: LevelFilter,
    dependencies: LevelFilter,
    started: Instant,
}

impl StageLogger {
    fn new(level: LevelFilter) -> Self {
        Self {
            own: level,
            dependencies: level.min(LevelFilter::Warn),
            started: Instant::now(),
        }
    }

    fn threshold(&self, target: &str) -> LevelFilter {
        if target.starts_with(WORKSPACE_TARGET) {
            self.own
        } else {
            self.dependencies
        }
    }
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Last `::` segment of a log target.
pub fn stage_name(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

/// One formatted log line without the trailing newline.
pub fn format_line(elapsed_s: f64, level: Level, target: &str, args: &fmt::Arguments) -> String {
    format!(
        "[{:7.3}s {:>5} {}] {}",
        elapsed_s,
        level,
        stage_name(target),
        args
    )
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Map a `-v` count to a level filter: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. Workspace records use `level`; dependency
/// records use `level` capped at warn.
///
/// Later calls are no-ops once a logger is installed.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StageLogger::new(level));
        log::set_logger(logger)?;
        log::set_max_level(logger.own.max(logger.dependencies));
    }
    Ok(())
}

/// Output format for [`init_tracing`].
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable lines with uptime and span close timings.
    Pretty,
    /// One flattened JSON object per event.
    Json,
}

/// Install a `tracing` subscriber and route `log` records into it.
///
/// The filter comes from `RUST_LOG`, falling back to
/// [`DEFAULT_TRACING_FILTER`].
#[cfg(feature = "tracing")]
pub fn init_tracing(format: TracingFormat) {
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACING_FILTER));
    let builder = tracing_fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = match format {
        TracingFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        TracingFormat::Pretty => builder
            .with_timer(tracing_fmt::time::Uptime::default())
            .finish()
            .try_init(),
    };
}
