//! Runtime settings for hosts embedding the graph.
//!
//! # Responsibility
//! - Load settings from an optional JSON file plus `KGRAPH_*` environment overrides.
//! - Build the configured store, index and tool façade as explicit handles.
//!
//! # Invariants
//! - Every field has a default; a missing config file is not an error.
//! - A malformed config file or override value is an error, never ignored.

use crate::graph::{GraphEngine, GraphResult};
use crate::index::{HashingEmbedder, InMemoryVectorIndex};
use crate::logging::default_log_level;
use crate::store::{GraphStore, JsonFileStore, SqliteStore, StoreResult};
use crate::tools::{KnowledgeGraphTools, DEFAULT_SEARCH_LIMIT};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "kgraph.json";

/// Handle type produced by [`Settings::open_store`].
pub type DynStore = Box<dyn GraphStore>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "malformed config `{}`: {source}", path.display())
            }
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid value `{value}` for {key}: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Persistence backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Json,
    #[default]
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub backend: Backend,

    /// Directory holding `nodes.json` and `edges.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    #[serde(default = "default_level")]
    pub log_level: String,

    /// Log to rotating files here; stderr when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub semantic_search: bool,

    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./graph.db")
}

fn default_level() -> String {
    default_log_level().to_string()
}

fn default_true() -> bool {
    true
}

fn default_embedding_dimensions() -> usize {
    HashingEmbedder::DEFAULT_DIMENSIONS
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            sqlite_path: default_sqlite_path(),
            log_level: default_level(),
            log_dir: None,
            semantic_search: default_true(),
            embedding_dimensions: default_embedding_dimensions(),
            search_limit: default_search_limit(),
        }
    }
}

impl Settings {
    /// Loads `path` (or defaults when it does not exist), then applies env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = if path.exists() {
            Self::load_from(path)?
        } else {
            Self::default()
        };
        settings.with_overrides(|key| std::env::var(key).ok())
    }

    /// Loads settings from one JSON file, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `KGRAPH_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("KGRAPH_BACKEND") {
            self.backend = Backend::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: "KGRAPH_BACKEND",
                value: value.clone(),
                message: "expected json|sqlite".to_string(),
            })?;
        }
        if let Some(value) = lookup("KGRAPH_DATA_DIR") {
            self.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("KGRAPH_DB_PATH") {
            self.sqlite_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("KGRAPH_LOG_LEVEL") {
            crate::logging::normalize_level(&value).map_err(|message| {
                ConfigError::InvalidValue {
                    key: "KGRAPH_LOG_LEVEL",
                    value: value.clone(),
                    message,
                }
            })?;
            self.log_level = value;
        }
        if let Some(value) = lookup("KGRAPH_LOG_DIR") {
            self.log_dir = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        Ok(self)
    }

    /// Opens the store selected by `backend`.
    pub fn open_store(&self) -> StoreResult<DynStore> {
        self.open_backend(self.backend)
    }

    /// Opens an arbitrary backend at its configured location.
    pub fn open_backend(&self, backend: Backend) -> StoreResult<DynStore> {
        let store: DynStore = match backend {
            Backend::Json => Box::new(JsonFileStore::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteStore::open(&self.sqlite_path)?),
        };
        info!(
            "event=store_open module=config status=ok backend={backend} location={}",
            store.describe()
        );
        Ok(store)
    }

    /// Builds the engine over the configured store, with a warmed similarity
    /// index when `semantic_search` is on.
    pub fn build_engine(&self) -> GraphResult<GraphEngine<DynStore>> {
        let store = self.open_store()?;
        if !self.semantic_search {
            return Ok(GraphEngine::new(store));
        }

        let embedder = HashingEmbedder::new(self.embedding_dimensions);
        let engine = GraphEngine::with_index(store, Box::new(InMemoryVectorIndex::new(embedder)));
        engine.reindex()?;
        Ok(engine)
    }

    pub fn build_tools(&self) -> GraphResult<KnowledgeGraphTools<DynStore>> {
        Ok(KnowledgeGraphTools::new(self.build_engine()?).with_search_limit(self.search_limit))
    }
}
