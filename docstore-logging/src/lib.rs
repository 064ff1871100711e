//! Asynchronous rotating file logging for docstore.
//!
//! - [`Logger`] - leveled, templated logging with `{}` placeholders
//! - [`FileLogger`] - queue-backed file sink with size rotation into zip archives
//! - [`install`] - routes the `log` facade (used throughout docstore) into a [`FileLogger`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docstore_logging::{FileLogger, LogLevel, install};
//!
//! let logger = Arc::new(FileLogger::builder("logs").min_level(LogLevel::Debug).build()?);
//! install(Arc::clone(&logger))?;
//!
//! log::info!("ready");
//! logger.close()?;
//! ```

pub mod bridge;
pub mod error;
pub mod file;
pub mod level;
pub mod logger;

pub use bridge::install;
pub use error::{LoggerError, LoggerResult};
pub use file::{FileLogger, FileLoggerBuilder};
pub use level::LogLevel;
pub use logger::{Logger, render};
