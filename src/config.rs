use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app_dirs::{AppDirs, APP_NAME};
use crate::session::Mode;
use crate::storage::{FileStore, MemoryStore, PersistenceGateway, SqliteStore, StorageError};

pub const DB_FILE_NAME: &str = "jotto.db";

/// Backend for saved games and stats.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreKind {
    /// One JSON file per record
    Json,
    /// SQLite key-value table
    Sqlite,
    /// Nothing survives the process
    Memory,
}

impl StoreKind {
    pub fn open(self, state_dir: &Path) -> Result<Rc<dyn PersistenceGateway>, StorageError> {
        let store: Rc<dyn PersistenceGateway> = match self {
            StoreKind::Json => Rc::new(FileStore::with_dir(state_dir)),
            StoreKind::Sqlite => Rc::new(SqliteStore::open(state_dir.join(DB_FILE_NAME))?),
            StoreKind::Memory => Rc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store: StoreKind,
    pub state_dir: Option<PathBuf>,
    pub default_mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreKind::Json,
            state_dir: None,
            default_mode: Mode::Daily,
        }
    }
}

impl Config {
    /// The configured state directory, else the platform default.
    pub fn resolved_state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .or_else(AppDirs::state_dir)
            .unwrap_or_else(|| PathBuf::from(".jotto"))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("jotto_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
