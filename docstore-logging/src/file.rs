//! Asynchronous, size-rotating file logger.
//!
//! Callers enqueue entries on a bounded channel; a single worker thread renders and writes
//! them in order. A full queue blocks the caller. When the active file reaches the size
//! limit the worker compresses it into a zip archive next to it and starts a fresh file.

use std::{
    fmt::Display,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    thread::{self, JoinHandle},
};

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    error::{LoggerError, LoggerResult},
    level::LogLevel,
    logger::{Logger, render, stringify},
};

pub const DEFAULT_PREFIX: &str = "docstore";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_CAPACITY: usize = 100;

struct Entry {
    level: LogLevel,
    timestamp: DateTime<Local>,
    template: String,
    args: Vec<String>,
}

impl Entry {
    fn line(&self) -> String {
        format!(
            "{} {}: {}\n",
            self.timestamp.format("%Y/%m/%d %H:%M:%S"),
            self.level,
            render(&self.template, &self.args),
        )
    }
}

enum Message {
    Entry(Entry),
    /// Acknowledged once every earlier entry is written.
    Flush(Sender<()>),
    Shutdown,
}

/// Builder for [`FileLogger`].
#[derive(Debug, Clone)]
pub struct FileLoggerBuilder {
    directory: PathBuf,
    prefix: String,
    max_file_size: u64,
    min_level: LogLevel,
    capacity: usize,
}

impl FileLoggerBuilder {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_level: LogLevel::default(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// File name prefix; files are named `<prefix>-<YYYY-MM-DD>.log`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Size in bytes at which the active file is rotated.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// How many entries may wait for the worker before callers block.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Creates the directory, opens today's file and starts the worker thread.
    pub fn build(self) -> LoggerResult<FileLogger> {
        fs::create_dir_all(&self.directory).map_err(|source| LoggerError::CreateDirectory {
            path: self.directory.clone(),
            source,
        })?;

        let active = ActiveFile::open(&self.directory, &self.prefix)?;
        let (sender, receiver) = bounded(self.capacity);

        let worker = Worker {
            directory: self.directory,
            prefix: self.prefix,
            max_file_size: self.max_file_size,
            rotate_at: self.max_file_size,
            active: Some(active),
        };
        let handle = thread::Builder::new()
            .name("docstore-logger".to_string())
            .spawn(move || worker.run(receiver))
            .map_err(LoggerError::Spawn)?;

        Ok(FileLogger {
            sender,
            min_level: self.min_level,
            closed: AtomicBool::new(false),
            worker: Mutex::new(Some(handle)),
        })
    }
}

/// A [`Logger`] writing to dated, size-rotated files from a background thread.
///
/// Entries below the minimum level are dropped at the call site. Once the logger is closed,
/// logging is a no-op. Dropping the logger closes it.
///
/// # Example
///
/// ```ignore
/// use docstore_logging::{FileLogger, LogLevel, Logger};
///
/// let logger = FileLogger::builder("logs")
///     .min_level(LogLevel::Debug)
///     .build()?;
///
/// logger.info("connected to {} in {}ms", &[&"testdb", &12]);
/// logger.close()?;
/// ```
#[derive(Debug)]
pub struct FileLogger {
    sender: Sender<Message>,
    min_level: LogLevel,
    closed: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FileLogger {
    pub fn builder(directory: impl Into<PathBuf>) -> FileLoggerBuilder {
        FileLoggerBuilder::new(directory)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level && !self.closed.load(Ordering::Acquire)
    }

    /// Blocks until every entry enqueued before this call has been written.
    pub fn flush(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        let (ack, done) = bounded(1);
        if self.sender.send(Message::Flush(ack)).is_ok() {
            // Disconnects instead of acknowledging if the worker is already gone.
            let _ = done.recv();
        }
    }

    /// Writes every entry enqueued so far, then stops the worker.
    ///
    /// Later calls, and entries logged afterwards, do nothing.
    pub fn close(&self) -> LoggerResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let _ = self.sender.send(Message::Shutdown);

        match self.worker.lock().take() {
            Some(handle) => handle.join().map_err(|_| LoggerError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Logger for FileLogger {
    fn log(&self, level: LogLevel, template: &str, args: &[&dyn Display]) {
        if !self.enabled(level) {
            return;
        }

        let entry = Entry {
            level,
            timestamp: Local::now(),
            template: template.to_string(),
            args: stringify(args),
        };
        // Fails only once the worker has stopped.
        let _ = self.sender.send(Message::Entry(entry));
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("docstore-logger: {e}");
        }
    }
}

struct ActiveFile {
    path: PathBuf,
    file: File,
    size: u64,
}

impl ActiveFile {
    fn open(directory: &Path, prefix: &str) -> LoggerResult<Self> {
        let path = directory.join(format!("{prefix}-{}.log", Local::now().format("%Y-%m-%d")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggerError::Open { path: path.clone(), source })?;
        let size = file
            .metadata()
            .map_err(|source| LoggerError::Open { path: path.clone(), source })?
            .len();

        Ok(Self { path, file, size })
    }

    fn write(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.size += line.len() as u64;
        Ok(())
    }

    /// Length of the file on disk, which includes lines written by other loggers.
    fn current_size(&self) -> u64 {
        self.file.metadata().map(|metadata| metadata.len()).unwrap_or(self.size)
    }
}

struct Worker {
    directory: PathBuf,
    prefix: String,
    max_file_size: u64,
    /// Size at which the next rotation is attempted; pushed back after a failed rotation.
    rotate_at: u64,
    active: Option<ActiveFile>,
}

impl Worker {
    fn run(mut self, receiver: Receiver<Message>) {
        for message in receiver.iter() {
            match message {
                Message::Entry(entry) => self.write(&entry),
                Message::Flush(ack) => {
                    self.sync();
                    let _ = ack.send(());
                }
                Message::Shutdown => break,
            }
        }

        self.sync();
    }

    fn write(&mut self, entry: &Entry) {
        if self.active.as_ref().is_some_and(|active| active.current_size() >= self.rotate_at) {
            self.rotate();
        }

        if self.active.is_none() {
            match ActiveFile::open(&self.directory, &self.prefix) {
                Ok(active) => self.active = Some(active),
                Err(e) => {
                    eprintln!("docstore-logger: {e}");
                    return;
                }
            }
        }

        if let Some(active) = self.active.as_mut() {
            if let Err(e) = active.write(&entry.line()) {
                eprintln!("docstore-logger: could not write to {}: {e}", active.path.display());
            }
        }
    }

    fn rotate(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let path = active.path.clone();
        let size = active.current_size();
        drop(active);

        match compress(&path) {
            Ok(archive) => {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!("docstore-logger: archived {} to {} but could not remove it: {e}", path.display(), archive.display());
                }
                self.rotate_at = self.max_file_size;
            }
            Err(e) => {
                eprintln!("docstore-logger: could not rotate {}: {e}", path.display());
                self.rotate_at = size.saturating_add(self.max_file_size);
            }
        }

        match ActiveFile::open(&self.directory, &self.prefix) {
            Ok(active) => self.active = Some(active),
            Err(e) => eprintln!("docstore-logger: {e}"),
        }
    }

    fn sync(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if let Err(e) = active.file.flush() {
                eprintln!("docstore-logger: could not flush {}: {e}", active.path.display());
            }
        }
    }
}

/// Compresses `path` into a single-entry zip next to it and returns the archive path.
///
/// The archive is `<name>.zip`, or `<name>.<n>.zip` with the first free `n`.
fn compress(path: &Path) -> LoggerResult<PathBuf> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log file name is not valid UTF-8"))?
        .to_string();

    let mut archive = path.with_file_name(format!("{name}.zip"));
    let mut n = 1;
    while archive.exists() {
        archive = path.with_file_name(format!("{name}.{n}.zip"));
        n += 1;
    }

    let result = write_archive(path, &archive, &name);
    if result.is_err() {
        let _ = fs::remove_file(&archive);
    }

    result.map(|_| archive)
}

fn write_archive(source: &Path, archive: &Path, name: &str) -> LoggerResult<()> {
    let mut zip = ZipWriter::new(File::create(archive)?);
    zip.start_file(
        name,
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
    )?;
    io::copy(&mut File::open(source)?, &mut zip)?;
    zip.finish()?;

    Ok(())
}
