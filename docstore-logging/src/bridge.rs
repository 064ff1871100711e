//! Routes records from the `log` facade into a [`FileLogger`].

use std::sync::Arc;

use log::{Log, Metadata, Record};

use crate::{error::LoggerResult, file::FileLogger, level::LogLevel, logger::Logger};

struct LogBridge {
    logger: Arc<FileLogger>,
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.logger.enabled(metadata.level().into())
    }

    fn log(&self, record: &Record) {
        let level = LogLevel::from(record.level());
        if self.logger.enabled(level) {
            self.logger.log(level, "[{}] {}", &[&record.target(), record.args()]);
        }
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

/// Installs `logger` as the process-wide `log` sink, with the logger's minimum level as the
/// facade's maximum.
///
/// # Errors
///
/// Fails if a global logger is already installed.
pub fn install(logger: Arc<FileLogger>) -> LoggerResult<()> {
    let max_level = logger.min_level().to_level_filter();
    log::set_boxed_logger(Box::new(LogBridge { logger }))?;
    log::set_max_level(max_level);

    Ok(())
}
