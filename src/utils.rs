use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use rusqlite::{Connection, OpenFlags, backup::Backup};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Where Photos.sqlite is looked for when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = "db_copy/Photos.sqlite";
pub const DEFAULT_OUT_PATH: &str = "fav_dates.csv";

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub db_path: PathBuf,
    pub out_path: PathBuf,
    pub include_videos: bool,
    /// Skip favorites created before this instant.
    pub min_date: Option<DateTime<Utc>>,
    /// Fail with [`DatabaseNotFound`] before touching the output when `db_path` is not a file.
    pub check_db_exists: bool,
    /// Read from a private copy of the database instead of the original.
    pub snapshot: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            out_path: PathBuf::from(DEFAULT_OUT_PATH),
            include_videos: false,
            min_date: None,
            check_db_exists: true,
            snapshot: false,
            verbose: false,
            quiet: false,
        }
    }
}

/// The input database is missing. Kept as its own type so the binary can
/// map it to a dedicated exit status.
#[derive(Debug)]
pub struct DatabaseNotFound(pub PathBuf);

impl fmt::Display for DatabaseNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Database file not found at '{}'", self.0.display())
    }
}

impl std::error::Error for DatabaseNotFound {}

pub fn open_db(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .wrap_err_with(|| format!("Failed to open database: {}", path.display()))
}

/// Copy the database into a temporary file with SQLite's online backup.
///
/// Works while Photos holds the library open; the copy is deleted when the
/// returned handle is dropped.
pub fn backup_database(db_path: &Path) -> Result<NamedTempFile> {
    let src = open_db(db_path)?;

    let tmp = NamedTempFile::new().wrap_err("Failed to create temporary file")?;
    let mut dst =
        Connection::open(tmp.path()).wrap_err("Failed to open snapshot database connection")?;

    {
        let backup = Backup::new(&src, &mut dst).wrap_err("Failed to initialize backup")?;
        backup
            .run_to_completion(1000, Duration::from_millis(5), None)
            .wrap_err("Backup did not complete successfully")?;
    }

    Ok(tmp)
}
