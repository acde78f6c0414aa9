//! Shared application state and configuration.
//!
//! The state holds only the database path and the snapshot timeout. Each
//! request opens its own `CampusStore` on the blocking pool, because a SQLite
//! connection cannot be shared between tasks, and builds a fresh snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use campusnav_lib::{load_graph, CampusStore, Error as LibError, Graph};

use crate::metrics::record_snapshot_load;

pub const DEFAULT_DB_PATH: &str = "/data/campusnav.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SNAPSHOT_TIMEOUT_MS: u64 = 5_000;

/// Service settings read from the environment.
///
/// - `CAMPUSNAV_DB`: database path (default `/data/campusnav.db`)
/// - `SERVICE_PORT`: listen port (default 8080)
/// - `SNAPSHOT_TIMEOUT_MS`: bound on one store access (default 5000)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub snapshot_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            port: DEFAULT_PORT,
            snapshot_timeout: Duration::from_millis(DEFAULT_SNAPSHOT_TIMEOUT_MS),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let db_path = lookup("CAMPUSNAV_DB")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let port = lookup("SERVICE_PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);
        let snapshot_timeout = lookup("SNAPSHOT_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.snapshot_timeout);

        Self {
            db_path,
            port,
            snapshot_timeout,
        }
    }
}

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    DatabaseNotFound(String),
    Store(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseNotFound(path) => write!(f, "database not found: {}", path),
            Self::Store(e) => write!(f, "failed to open campus database: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::DatabaseNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::DatabaseNotFound { path } => {
                Self::DatabaseNotFound(path.display().to_string())
            }
            other => Self::Store(other),
        }
    }
}

/// Shared application state for all axum handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db_path: PathBuf,
    snapshot_timeout: Duration,
}

impl AppState {
    /// State for `db_path` without touching the file.
    pub fn new(db_path: impl Into<PathBuf>, snapshot_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db_path: db_path.into(),
                snapshot_timeout,
            }),
        }
    }

    /// Check that the configured database opens before serving traffic.
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        tracing::info!(path = %config.db_path.display(), "opening campus database");
        let store = CampusStore::open(&config.db_path)?;
        let campuses = store.list_campuses(false)?;
        tracing::info!(campuses = campuses.len(), "campus database ready");

        Ok(Self::new(config.db_path.clone(), config.snapshot_timeout))
    }

    pub fn db_path(&self) -> &Path {
        &self.inner.db_path
    }

    pub fn snapshot_timeout(&self) -> Duration {
        self.inner.snapshot_timeout
    }

    /// Run `task` against a freshly opened store on the blocking pool.
    ///
    /// A missing or unreadable database, a SQLite failure such as a held lock,
    /// a task that outlives the snapshot timeout, or a panic is reported as a
    /// retryable [`LibError::GraphLoad`] for `campus`.
    pub async fn with_store<T, F>(&self, campus: &str, task: F) -> Result<T, LibError>
    where
        T: Send + 'static,
        F: FnOnce(&CampusStore) -> Result<T, LibError> + Send + 'static,
    {
        let path = self.inner.db_path.clone();
        let timeout = self.inner.snapshot_timeout;
        let handle = tokio::task::spawn_blocking(move || {
            let store = CampusStore::open(&path)?;
            task(&store)
        });

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result.map_err(|err| store_unavailable(campus, err)),
            Ok(Err(join_error)) => Err(LibError::GraphLoad {
                campus: campus.to_string(),
                message: format!("store task failed: {join_error}"),
            }),
            Err(_) => {
                tracing::warn!(campus, timeout_ms = timeout.as_millis() as u64, "store access timed out");
                Err(LibError::GraphLoad {
                    campus: campus.to_string(),
                    message: format!("snapshot load timed out after {} ms", timeout.as_millis()),
                })
            }
        }
    }

    /// Load a routing snapshot of `campus`, failing for unknown campus codes.
    pub async fn load_snapshot(&self, campus: &str) -> Result<Graph, LibError> {
        let started = Instant::now();
        let code = campus.to_string();
        let graph = self
            .with_store(campus, move |store| {
                store.campus(&code)?;
                load_graph(store, &code)
            })
            .await?;

        record_snapshot_load(started.elapsed().as_secs_f64());
        tracing::debug!(
            campus,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "snapshot loaded"
        );
        Ok(graph)
    }
}

/// Storage failures become `GraphLoad`; errors about the request itself pass through.
fn store_unavailable(campus: &str, err: LibError) -> LibError {
    match err {
        LibError::Sqlite(_) | LibError::Io(_) | LibError::DatabaseNotFound { .. } => {
            tracing::warn!(campus, error = %err, "campus store unavailable");
            LibError::GraphLoad {
                campus: campus.to_string(),
                message: err.to_string(),
            }
        }
        other => other,
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db_path", &self.inner.db_path)
            .field("snapshot_timeout", &self.inner.snapshot_timeout)
            .finish()
    }
}
