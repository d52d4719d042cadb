//! Per-request connection accessor.

use rusqlite::{Connection, OpenFlags};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Path value that selects an in-memory database instead of a file.
pub const IN_MEMORY_PATH: &str = ":memory:";

static MEMORY_DB_SEQ: AtomicU64 = AtomicU64::new(0);

/// Runtime tunables applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

/// Errors that can occur when opening or preparing the database.
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite could not open the database.
    #[error("failed to open database at {location}: {source}")]
    Open {
        /// Where the database lives.
        location: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// A connection opened but its pragmas could not be applied.
    #[error("failed to configure database connection: {0}")]
    Configure(rusqlite::Error),

    /// Copying the bundled seed database failed.
    #[error("failed to seed database {target} from {seed}: {source}")]
    Seed {
        /// The bundled source file.
        seed: PathBuf,
        /// The destination that was being created.
        target: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    /// `memdb` VFS URI naming a process-private in-memory database.
    Memory(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Memory(_) => f.write_str(IN_MEMORY_PATH),
        }
    }
}

/// Handle to the service database.
///
/// Cloning is cheap. `Database` does not hold a pool: every call to
/// [`Database::connect`] opens a new SQLite connection which the caller
/// releases by dropping it.
#[derive(Debug, Clone)]
pub struct Database {
    location: Location,
    settings: DbSettings,
    // An in-memory database disappears when its last connection closes.
    // Never locked; the Mutex only makes the anchor connection Sync.
    _keepalive: Option<Arc<Mutex<Connection>>>,
}

impl Database {
    /// Opens the database at `path`, creating the file if needed.
    ///
    /// Passing [`IN_MEMORY_PATH`] creates a fresh in-memory database that
    /// lives as long as this handle (or any clone of it).
    ///
    /// # Errors
    ///
    /// Returns `DbError` if a first connection cannot be opened and
    /// configured.
    pub fn open(path: &str, settings: DbSettings) -> Result<Self, DbError> {
        if path == IN_MEMORY_PATH {
            let seq = MEMORY_DB_SEQ.fetch_add(1, Ordering::Relaxed);
            let uri = format!(
                "file:/rolodex-{}-{}?vfs=memdb",
                std::process::id(),
                seq
            );
            let mut db = Self {
                location: Location::Memory(uri),
                settings,
                _keepalive: None,
            };
            let anchor = db.connect()?;
            db._keepalive = Some(Arc::new(Mutex::new(anchor)));
            tracing::info!("opened in-memory database");
            return Ok(db);
        }

        let db = Self {
            location: Location::File(PathBuf::from(path)),
            settings,
            _keepalive: None,
        };
        // Fail at startup rather than on the first request.
        drop(db.connect()?);
        tracing::info!(path, "opened database file");
        Ok(db)
    }

    /// Opens a new connection with foreign keys and the busy timeout set.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Open` if SQLite cannot open the database and
    /// `DbError::Configure` if the connection pragmas fail.
    pub fn connect(&self) -> Result<Connection, DbError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

        let opened = match &self.location {
            Location::File(path) => Connection::open_with_flags(path, flags),
            Location::Memory(uri) => {
                Connection::open_with_flags(uri, flags | OpenFlags::SQLITE_OPEN_URI)
            }
        };
        let conn = opened.map_err(|source| DbError::Open {
            location: self.location.to_string(),
            source,
        })?;

        let journal_mode = match self.location {
            Location::File(_) => "wal",
            // memdb has no shared-memory support for WAL and would place a
            // rollback journal on the real filesystem.
            Location::Memory(_) => "memory",
        };
        configure(&conn, journal_mode, self.settings).map_err(DbError::Configure)?;
        Ok(conn)
    }
}

fn configure(conn: &Connection, journal_mode: &str, settings: DbSettings) -> rusqlite::Result<()> {
    let applied: String = conn.query_row(
        &format!("PRAGMA journal_mode = {journal_mode};"),
        [],
        |row| row.get(0),
    )?;
    if applied != journal_mode {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!(
                "failed to set {journal_mode} journal mode, got: {applied}"
            )),
        ));
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;
    Ok(())
}

/// Copies a bundled seed database to `target` unless `target` already exists.
///
/// This supports read-only deployment bundles where only a scratch
/// directory (such as `/tmp`) is writable. Returns `true` when a copy was
/// made.
///
/// # Errors
///
/// Returns `DbError::Seed` if the parent directory cannot be created or the
/// copy fails.
pub fn seed_database(seed: &Path, target: &Path) -> Result<bool, DbError> {
    let seed_err = |source: std::io::Error| DbError::Seed {
        seed: seed.to_path_buf(),
        target: target.to_path_buf(),
        source,
    };

    if target.exists() {
        tracing::debug!(path = %target.display(), "database already present, skipping seed");
        return Ok(false);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(seed_err)?;
        }
    }

    std::fs::copy(seed, target).map_err(seed_err)?;
    tracing::info!(
        seed = %seed.display(),
        dest = %target.display(),
        "copied seed database"
    );
    Ok(true)
}
