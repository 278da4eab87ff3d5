use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MediQ";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed key of the slot holding the whole appointment collection.
pub const APPOINTMENTS_SLOT: &str = "mediq_appointments";

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const DEFAULT_LLM_URL: &str = "http://localhost:11434";
const DEFAULT_LLM_MODEL: &str = "medgemma";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/MediQ/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "mediq_lib=info,mediq=info,tower_http=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Which medium backs the appointment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    JsonFile,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::JsonFile => "json",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "json" => Ok(Self::JsonFile),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue {
                var: "MEDIQ_STORAGE",
                value: other.to_string(),
            }),
        }
    }
}

/// Runtime configuration, read from `MEDIQ_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub bind_addr: SocketAddr,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("MEDIQ_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir);

        let storage = match lookup("MEDIQ_STORAGE") {
            Some(v) => v.parse()?,
            None => StorageBackend::Sqlite,
        };

        let bind_raw = lookup("MEDIQ_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: "MEDIQ_BIND",
                value: bind_raw.clone(),
            })?;

        let llm_timeout_secs = match lookup("MEDIQ_LLM_TIMEOUT_SECS") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: "MEDIQ_LLM_TIMEOUT_SECS",
                value: v.clone(),
            })?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        Ok(Self {
            data_dir,
            storage,
            bind_addr,
            llm_url: lookup("MEDIQ_LLM_URL").unwrap_or_else(|| DEFAULT_LLM_URL.to_string()),
            llm_model: lookup("MEDIQ_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs,
        })
    }

    /// SQLite file holding the slot table.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("mediq.db")
    }

    /// Directory for one-file-per-slot JSON storage.
    pub fn slots_dir(&self) -> PathBuf {
        self.data_dir.join("slots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("MediQ"));
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.llm_url, "http://localhost:11434");
        assert_eq!(config.llm_model, "medgemma");
        assert_eq!(config.llm_timeout_secs, 120);
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDIQ_DATA_DIR", "/tmp/mediq-test"),
            ("MEDIQ_STORAGE", "JSON"),
            ("MEDIQ_BIND", "0.0.0.0:9000"),
            ("MEDIQ_LLM_MODEL", "llama3"),
            ("MEDIQ_LLM_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageBackend::JsonFile);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.llm_model, "llama3");
        assert_eq!(config.llm_timeout_secs, 30);
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/mediq-test/mediq.db"));
        assert_eq!(config.slots_dir(), PathBuf::from("/tmp/mediq-test/slots"));
    }

    #[test]
    fn unknown_storage_backend_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("MEDIQ_STORAGE", "redis")])).unwrap_err();
        assert!(err.to_string().contains("MEDIQ_STORAGE"));
    }

    #[test]
    fn bad_bind_address_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("MEDIQ_BIND", "not-an-addr")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { var: "MEDIQ_BIND", .. })
        ));
    }

    #[test]
    fn bad_timeout_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("MEDIQ_LLM_TIMEOUT_SECS", "soon")]));
        assert!(result.is_err());
    }

    #[test]
    fn app_name_is_mediq() {
        assert_eq!(APP_NAME, "MediQ");
    }
}
