use crate::errors::DbError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_RESERVED_PREFIX: &str = "system.";
pub const CONFIG_FILE_NAME: &str = "docexec.toml";

/// Logging settings; unset fields fall back to `logger` defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub level: Option<String>,
    pub retention: Option<usize>,
}

/// Configuration for the executor and the storage it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Namespaces starting with this literal prefix refuse delete and update.
    pub reserved_prefix: String,
    pub db_path: Option<PathBuf>,
    pub sync_on_write: bool,
    pub log: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
            db_path: None,
            sync_on_write: false,
            log: LogConfig::default(),
        }
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DbError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Loads from the process environment. See [`EngineConfig::load_with`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, DbError> {
        Self::load_with(explicit, |k| std::env::var(k).ok())
    }

    /// Precedence: explicit file > `DOCEXEC_CONFIG` > `./docexec.toml` > defaults, then
    /// environment overrides on top. Command-line flags are applied by the caller afterwards.
    pub fn load_with(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self, DbError> {
        let file = explicit
            .map(Path::to_path_buf)
            .or_else(|| env("DOCEXEC_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                local.exists().then_some(local)
            });
        let mut cfg = match file {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env(env);
        Ok(cfg)
    }

    /// Applies `DOCEXEC_DB`, `DOCEXEC_SYNC` and `DOCEXEC_LOG_{DIR,LEVEL,RETENTION}`.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(db) = env("DOCEXEC_DB") {
            self.db_path = Some(PathBuf::from(db));
        }
        if let Some(sync) = env("DOCEXEC_SYNC").as_deref().and_then(parse_flag) {
            self.sync_on_write = sync;
        }
        if let Some(dir) = env("DOCEXEC_LOG_DIR") {
            self.log.dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = env("DOCEXEC_LOG_LEVEL") {
            self.log.level = Some(level);
        }
        if let Some(keep) = env("DOCEXEC_LOG_RETENTION").and_then(|s| s.parse::<usize>().ok()) {
            self.log.retention = Some(keep);
        }
    }
}
