use crate::apple_time::{apple_time_to_iso, datetime_to_apple_time};
use crate::selector::{self, AssetFilter};
use crate::utils::{DatabaseNotFound, ExportConfig, backup_database, open_db};
use crate::writer::write_csv;
use eyre::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub out_path: PathBuf,
}

/// Run one export: validate, open read-only, stream dates into the CSV.
///
/// The connection (and the snapshot, if any) is dropped on every return path.
pub fn execute(config: &ExportConfig) -> Result<ExportSummary> {
    if config.check_db_exists && !config.db_path.is_file() {
        return Err(DatabaseNotFound(config.db_path.clone()).into());
    }

    let filter = AssetFilter {
        include_videos: config.include_videos,
        min_seconds: config.min_date.map(datetime_to_apple_time),
    };

    let snapshot = if config.snapshot {
        if config.verbose {
            eprintln!("Snapshotting {}...", config.db_path.display());
        }
        Some(backup_database(&config.db_path)?)
    } else {
        None
    };
    let read_path = snapshot
        .as_ref()
        .map_or(config.db_path.as_path(), |tmp| tmp.path());

    let conn = open_db(read_path)?;
    let mut stmt = filter.prepare(&conn)?;

    if config.verbose {
        let total = selector::count_matching(&conn, &filter)?;
        let kinds = if filter.include_videos {
            "favorites"
        } else {
            "favorite images"
        };
        match config.min_date {
            Some(floor) => eprintln!("Found {} {} since {}.", total, kinds, floor.to_rfc3339()),
            None => eprintln!("Found {} {}.", total, kinds),
        }
    }

    let iso_dates =
        selector::fetch_dates(&mut stmt, &filter)?.map(|seconds| apple_time_to_iso(seconds?));
    let written = write_csv(&config.out_path, iso_dates)?;

    if !config.quiet {
        eprintln!(
            "Done. {} date(s) written to {}.",
            written,
            config.out_path.display()
        );
    }

    Ok(ExportSummary {
        written,
        out_path: config.out_path.clone(),
    })
}
