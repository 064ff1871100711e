use std::{fs, sync::Arc};

use docstore_logging::{FileLogger, LogLevel, install};

// The global logger can only be installed once per process, so this file holds one test.
#[test]
fn log_facade_records_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Arc::new(
        FileLogger::builder(dir.path())
            .min_level(LogLevel::Info)
            .build()
            .unwrap(),
    );

    install(Arc::clone(&logger)).unwrap();
    log::debug!("hidden");
    log::warn!(target: "docstore", "slow query took {}ms", 250);
    log::logger().flush();

    assert!(install(Arc::clone(&logger)).is_err());
    assert_eq!(log::max_level(), log::LevelFilter::Info);

    let entry = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
    let contents = fs::read_to_string(entry.path()).unwrap();
    let lines: Vec<_> = contents.lines().collect();

    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("WARN: [docstore] slow query took 250ms"));
}
