//! Queries over the Photos `ZASSET` table.
//!
//! Relevant columns (Photos.sqlite, macOS 10.15+):
//! ```sql
//! ZASSET (
//!     ZFAVORITE    INTEGER,  -- 1 when the user hearted the item
//!     ZKIND        INTEGER,  -- 0 = image, 1 = video
//!     ZDATECREATED TIMESTAMP -- REAL seconds since 2001-01-01T00:00:00Z
//! )
//! ```

use eyre::{Context, Result};
use rusqlite::{Connection, Statement};

// The floor is bound as a nullable `?1`; NULL disables it.
const SQL_IMAGES: &str = "
    SELECT ZDATECREATED
    FROM ZASSET
    WHERE ZFAVORITE = 1 AND ZDATECREATED IS NOT NULL AND ZKIND = 0
      AND (?1 IS NULL OR ZDATECREATED >= ?1)
    ORDER BY ZDATECREATED
";

const SQL_ALL_KINDS: &str = "
    SELECT ZDATECREATED
    FROM ZASSET
    WHERE ZFAVORITE = 1 AND ZDATECREATED IS NOT NULL
      AND (?1 IS NULL OR ZDATECREATED >= ?1)
    ORDER BY ZDATECREATED
";

/// Which favorites to select.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssetFilter {
    pub include_videos: bool,
    /// Lower bound on `ZDATECREATED`, in Apple-epoch seconds.
    pub min_seconds: Option<f64>,
}

impl AssetFilter {
    pub fn sql(&self) -> &'static str {
        if self.include_videos {
            SQL_ALL_KINDS
        } else {
            SQL_IMAGES
        }
    }

    pub fn prepare<'c>(&self, conn: &'c Connection) -> Result<Statement<'c>> {
        conn.prepare(self.sql())
            .wrap_err("Failed to prepare favorites query (is this a Photos.sqlite database?)")
    }
}

/// Stream favorite creation timestamps in ascending order.
///
/// Rows are pulled from SQLite one at a time as the iterator advances.
pub fn fetch_dates<'s, 'c: 's>(
    stmt: &'s mut Statement<'c>,
    filter: &AssetFilter,
) -> Result<impl Iterator<Item = Result<f64>> + use<'s, 'c>> {
    let rows = stmt
        .query_map([filter.min_seconds], |row| row.get::<_, Option<f64>>(0))
        .wrap_err("Failed to execute favorites query")?;

    Ok(rows.filter_map(|row| match row {
        Ok(Some(value)) => Some(Ok(value)),
        Ok(None) => None,
        Err(e) => Some(Err(eyre::Report::new(e).wrap_err("Failed to read row"))),
    }))
}

/// Number of rows `fetch_dates` would yield for the same filter.
pub fn count_matching(conn: &Connection, filter: &AssetFilter) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM ({})", filter.sql());
    let total: i64 = conn
        .query_row(&sql, [filter.min_seconds], |row| row.get(0))
        .wrap_err("Failed to count favorites")?;
    Ok(total as u64)
}
