//! Console logger for the binaries and demos.
//!
//! Implements the [`log`] facade, writing every record to stderr and, when
//! initialised with [`init_with_file`], to a log file as well. The library
//! itself only emits through the `log` macros; installing a logger is up to
//! the executable.
//!
//! Example output:
//! ```text
//! INFO [1s 20ms] pilot_assist::gnc_mod::modes - Vertical axis engaged in Vertical(Altitude)
//! ```

use std::{
    fs::File,
    io::{BufWriter, Write},
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use humantime::{format_duration, FormattedDuration};
use log::{LevelFilter, Metadata, Record, SetLoggerError};

pub struct ConsoleLogger {
    started: Instant,
    file_writer: Mutex<Option<BufWriter<File>>>,
}

impl ConsoleLogger {
    fn new(path: Option<&str>) -> Self {
        let file_writer = path
            .and_then(|p| File::create(p).ok())
            .map(BufWriter::new);
        Self { started: Instant::now(), file_writer: Mutex::new(file_writer) }
    }

    /// Time since the logger was installed, at millisecond resolution.
    fn elapsed(&self) -> FormattedDuration {
        let ms = self.started.elapsed().as_millis() as u64;
        format_duration(Duration::from_millis(ms))
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} [{}] {} - {}\n",
            record.level(),
            self.elapsed(),
            record.target(),
            record.args()
        );
        eprint!("{}", line);
        if let Ok(mut guard) = self.file_writer.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writer.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file_writer.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Install the console logger.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(None));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

/// Install the console logger and mirror every line into `path`. If the
/// file cannot be created only the console receives output.
pub fn init_with_file(level: LevelFilter, path: &str) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(Some(path)));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

#[cfg(test)]
mod tests {
    use log::{debug, info, LevelFilter};

    #[test]
    fn second_init_is_rejected() {
        // the global logger can only be installed once per process
        let first = super::init(LevelFilter::Debug);
        info!("logger installed");
        debug!("debug line");
        assert!(first.is_ok());
        assert!(super::init(LevelFilter::Info).is_err());
        assert!(log::logger().enabled(
            &log::Metadata::builder().level(log::Level::Info).target("test").build()
        ));
    }
}
