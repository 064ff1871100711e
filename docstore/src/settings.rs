//! YAML configuration for stores and logging.
//!
//! ```yaml
//! logging:
//!   level: info
//!   directory: logs
//!   filePrefix: docstore
//!   maxFileSize: 10485760
//! DataStores:
//!   - dataStore:
//!       mongo:
//!         uri: mongodb://localhost:27017
//!         timeout: 30
//!         databaseName: testdb
//!         collectionName: testcol
//! ```
//!
//! Every key is optional. Missing logging keys take the logger's defaults; missing store
//! keys take the [`StoreConfig`] defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use docstore_core::config::StoreConfig;
use docstore_logging::{
    FileLoggerBuilder, LogLevel,
    file::{DEFAULT_MAX_FILE_SIZE, DEFAULT_PREFIX},
};

/// Name of the file [`Settings::load`] reads from the configuration directory.
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read the configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse the configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(rename = "DataStores", default)]
    pub data_stores: Vec<DataStoreEntry>,
}

impl Settings {
    /// Reads `config.yaml` from `directory`.
    pub fn load(directory: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = directory.as_ref().join(CONFIG_FILE);
        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read { path, source })?;

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> SettingsResult<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// One [`StoreConfig`] per configured MongoDB store, in file order.
    pub fn mongo_configs(&self) -> Vec<StoreConfig> {
        self.data_stores
            .iter()
            .filter_map(|entry| entry.data_store.mongo.as_ref())
            .map(MongoSettings::store_config)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl LoggingSettings {
    /// A file logger builder carrying these settings.
    pub fn file_logger(&self) -> FileLoggerBuilder {
        FileLoggerBuilder::new(&self.directory)
            .prefix(&self.file_prefix)
            .max_file_size(self.max_file_size)
            .min_level(self.level)
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            directory: default_directory(),
            file_prefix: default_prefix(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataStoreEntry {
    #[serde(rename = "dataStore", default)]
    pub data_store: DataStoreSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataStoreSettings {
    #[serde(default)]
    pub mongo: Option<MongoSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoSettings {
    #[serde(default)]
    pub uri: Option<String>,
    /// Seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
}

impl MongoSettings {
    pub fn store_config(&self) -> StoreConfig {
        let mut builder = StoreConfig::builder();

        if let Some(uri) = &self.uri {
            builder = builder.uri(uri);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout_secs(timeout);
        }
        if let Some(database) = &self.database_name {
            builder = builder.database(database);
        }
        if let Some(collection) = &self.collection_name {
            builder = builder.collection(collection);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use docstore_core::config::{DEFAULT_TIMEOUT, DEFAULT_URI};

    use super::*;

    const FULL: &str = r#"
logging:
  level: warning
  directory: /var/log/app
  filePrefix: orders
  maxFileSize: 2048
DataStores:
  - dataStore:
      mongo:
        uri: mongodb://db.local:27017
        timeout: 5
        databaseName: testdb
        collectionName: testcol
  - dataStore:
      redis:
        uri: redis://localhost:6379
"#;

    #[test]
    fn full_layout_is_parsed() {
        let settings = Settings::from_yaml(FULL).unwrap();

        assert_eq!(settings.logging.level, LogLevel::Warn);
        assert_eq!(settings.logging.directory, PathBuf::from("/var/log/app"));
        assert_eq!(settings.logging.file_prefix, "orders");
        assert_eq!(settings.logging.max_file_size, 2048);

        let configs = settings.mongo_configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].uri(), "mongodb://db.local:27017");
        assert_eq!(configs[0].timeout(), Duration::from_secs(5));
        assert_eq!(configs[0].database(), Some("testdb"));
        assert_eq!(configs[0].collection(), Some("testcol"));
    }

    #[test]
    fn missing_keys_take_defaults() {
        let settings = Settings::from_yaml("DataStores:\n  - dataStore:\n      mongo: {}\n").unwrap();

        assert_eq!(settings.logging.level, LogLevel::Info);
        assert_eq!(settings.logging.max_file_size, DEFAULT_MAX_FILE_SIZE);

        let config = &settings.mongo_configs()[0];
        assert_eq!(config.uri(), DEFAULT_URI);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.database(), None);
    }

    #[test]
    fn unknown_level_is_a_parse_error() {
        let err = Settings::from_yaml("logging:\n  level: loud\n").unwrap_err();

        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn load_reads_config_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), FULL).unwrap();

        let settings = Settings::load(dir.path()).unwrap();

        assert_eq!(settings.data_stores.len(), 2);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(Settings::load(dir.path()), Err(SettingsError::Read { .. })));
    }
}
