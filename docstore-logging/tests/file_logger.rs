use std::{fs, io::Read, path::{Path, PathBuf}, sync::Arc, thread};

use docstore_logging::{FileLogger, LogLevel, Logger};

fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.to_string_lossy().ends_with(suffix))
        .collect();
    files.sort();
    files
}

fn active_lines(dir: &Path) -> Vec<String> {
    let logs = files_with_suffix(dir, ".log");
    assert_eq!(logs.len(), 1, "expected one active file, found {logs:?}");

    fs::read_to_string(&logs[0])
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn file_is_named_after_prefix_and_date() {
    let dir = tempfile::tempdir().unwrap();
    let logger = FileLogger::builder(dir.path()).prefix("orders").build().unwrap();
    logger.close().unwrap();

    let logs = files_with_suffix(dir.path(), ".log");
    let name = logs[0].file_name().unwrap().to_string_lossy().into_owned();

    assert!(name.starts_with("orders-"));
    assert_eq!(name.len(), "orders-YYYY-MM-DD.log".len());
}

#[test]
fn entries_below_min_level_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let logger = FileLogger::builder(dir.path()).min_level(LogLevel::Warn).build().unwrap();

    logger.debug("debug", &[]);
    logger.info("info", &[]);
    logger.warn("warn", &[]);
    logger.error("error", &[]);
    logger.flush();

    let lines = active_lines(dir.path());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("WARN: warn"));
    assert!(lines[1].ends_with("ERROR: error"));
}

#[test]
fn entries_are_written_in_order_with_rendered_templates() {
    let dir = tempfile::tempdir().unwrap();
    let logger = FileLogger::builder(dir.path()).capacity(4).build().unwrap();

    for i in 0..50 {
        logger.info("entry {} of {}", &[&i, &50]);
    }
    logger.flush();

    let lines = active_lines(dir.path());
    assert_eq!(lines.len(), 50);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!("INFO: entry {i} of 50")), "{line}");
    }
}

#[test]
fn close_drains_queue_and_later_entries_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let logger = FileLogger::builder(dir.path()).build().unwrap();

    logger.info("before close", &[]);
    logger.close().unwrap();
    logger.info("after close", &[]);
    logger.flush();
    logger.close().unwrap();

    let lines = active_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("INFO: before close"));
}

#[test]
fn dropping_the_logger_writes_pending_entries() {
    let dir = tempfile::tempdir().unwrap();
    {
        let logger = FileLogger::builder(dir.path()).build().unwrap();
        logger.error("shutting down", &[]);
    }

    assert!(active_lines(dir.path())[0].ends_with("ERROR: shutting down"));
}

#[test]
fn existing_file_is_appended_to() {
    let dir = tempfile::tempdir().unwrap();

    for message in ["first run", "second run"] {
        let logger = FileLogger::builder(dir.path()).build().unwrap();
        logger.info(message, &[]);
        logger.close().unwrap();
    }

    assert_eq!(active_lines(dir.path()).len(), 2);
}

#[test]
fn full_file_is_archived_before_the_next_write() {
    let dir = tempfile::tempdir().unwrap();
    // Each line is 26 bytes plus the message, so the second write crosses the limit.
    let logger = FileLogger::builder(dir.path()).max_file_size(40).build().unwrap();

    logger.info("one", &[]);
    logger.info("two", &[]);
    logger.info("three", &[]);
    logger.flush();

    let archives = files_with_suffix(dir.path(), ".zip");
    assert_eq!(archives.len(), 1);

    let lines = active_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("INFO: three"));

    let mut archive = zip::ZipArchive::new(fs::File::open(&archives[0]).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    let mut archived = String::new();
    archive.by_index(0).unwrap().read_to_string(&mut archived).unwrap();
    let archived: Vec<_> = archived.lines().collect();
    assert_eq!(archived.len(), 2);
    assert!(archived[0].ends_with("INFO: one"));
    assert!(archived[1].ends_with("INFO: two"));
}

#[test]
fn lines_from_other_loggers_count_towards_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let first = FileLogger::builder(dir.path()).max_file_size(40).build().unwrap();
    let second = FileLogger::builder(dir.path()).max_file_size(40).build().unwrap();

    first.info("one", &[]);
    first.flush();
    second.info("two", &[]);
    second.flush();
    first.info("three", &[]);
    first.flush();

    let archives = files_with_suffix(dir.path(), ".zip");
    assert_eq!(archives.len(), 1);

    let lines = active_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("INFO: three"));

    let mut archive = zip::ZipArchive::new(fs::File::open(&archives[0]).unwrap()).unwrap();
    let mut archived = String::new();
    archive.by_index(0).unwrap().read_to_string(&mut archived).unwrap();
    let archived: Vec<_> = archived.lines().collect();
    assert_eq!(archived.len(), 2);
    assert!(archived[0].ends_with("INFO: one"));
    assert!(archived[1].ends_with("INFO: two"));

    first.close().unwrap();
    second.close().unwrap();
}

#[test]
fn concurrent_callers_share_one_logger() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Arc::new(FileLogger::builder(dir.path()).capacity(2).build().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..25 {
                    logger.info("worker {} entry {}", &[&worker, &i]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close().unwrap();

    assert_eq!(active_lines(dir.path()).len(), 100);
}
