use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use veil_crypto::{DEFAULT_MERKLE_DEPTH, MAX_MERKLE_DEPTH};
use veil_types::{VeilError, VeilResult};

use crate::storage::StorageConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub json: bool,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json: false,
            file: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub verifying_key_path: PathBuf,
    pub merkle_depth: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            verifying_key_path: PathBuf::from("verification_key.json"),
            merkle_depth: DEFAULT_MERKLE_DEPTH,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub storage: StorageConfig,
    pub verifier: VerifierConfig,
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/var/lib/veil"));
        let data_dir = home.join(".veil");
        let storage = StorageConfig {
            path: data_dir.join("db"),
            ..Default::default()
        };

        Self {
            data_dir,
            storage,
            verifier: VerifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<std::path::Path>) -> VeilResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| VeilError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| VeilError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> VeilResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| VeilError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VeilError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| VeilError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("VEIL_DATA_DIR") {
            self.data_dir = PathBuf::from(&dir);
            self.storage.path = PathBuf::from(dir).join("db");
        }

        if let Ok(path) = std::env::var("VEIL_VERIFYING_KEY") {
            self.verifier.verifying_key_path = PathBuf::from(path);
        }

        if let Ok(depth) = std::env::var("VEIL_MERKLE_DEPTH") {
            if let Ok(d) = depth.parse() {
                self.verifier.merkle_depth = d;
            }
        }

        if let Ok(level) = std::env::var("VEIL_LOG_LEVEL") {
            match level.to_lowercase().as_str() {
                "error" => self.logging.level = LogLevel::Error,
                "warn" => self.logging.level = LogLevel::Warn,
                "info" => self.logging.level = LogLevel::Info,
                "debug" => self.logging.level = LogLevel::Debug,
                "trace" => self.logging.level = LogLevel::Trace,
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> VeilResult<()> {
        if self.verifier.merkle_depth == 0 {
            return Err(VeilError::Config("merkle depth must be nonzero".into()));
        }
        if self.verifier.merkle_depth > MAX_MERKLE_DEPTH {
            return Err(VeilError::Config(format!(
                "merkle depth {} exceeds maximum {}",
                self.verifier.merkle_depth, MAX_MERKLE_DEPTH
            )));
        }
        if self.verifier.verifying_key_path.as_os_str().is_empty() {
            return Err(VeilError::Config("verifying key path is empty".into()));
        }
        if self.storage.cache_capacity_bytes == 0 {
            return Err(VeilError::Config("storage cache capacity is zero".into()));
        }
        Ok(())
    }
}
