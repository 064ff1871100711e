use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("invalid log level `{0}`, expected one of debug, info, warn, error")]
    InvalidLevel(String),
    #[error("could not create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not start logger worker: {0}")]
    Spawn(#[source] io::Error),
    #[error("logger worker panicked")]
    WorkerPanicked,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("a global logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

pub type LoggerResult<T> = Result<T, LoggerError>;
