//! # fav-dates-export
//!
//! A CLI tool that exports the creation dates of your favorite Photos.app items to CSV.
//!
//! ## What it does
//!
//! Photos keeps its library index in a SQLite database (`Photos.sqlite`). Every asset
//! row carries a favorite flag, a kind (image or video), and a creation date stored as
//! seconds since 2001-01-01 UTC. This tool selects the favorites, converts each date
//! to an ISO-8601 UTC timestamp (`2023-06-15T12:34:56Z`), and writes them oldest first
//! into a one-column CSV with no header.
//!
//! The database is opened **read-only**. With `--snapshot` it is first copied to a
//! temporary file, which is the safe way to read a library Photos currently has open.
//!
//! ## Usage
//!
//! ```sh
//! # Favorite images from a copied library, into ./fav_dates.csv
//! fav-dates-export --db db_copy/Photos.sqlite
//!
//! # Include videos, only from 2001 onward, straight from the live library
//! fav-dates-export --db ~/Pictures/Photos\ Library.photoslibrary/database/Photos.sqlite \
//!     --snapshot --include-videos --min-date 2001-01-01 --out favorites.csv
//! ```
//!
//! Defaults can be persisted in `~/.config/fav-dates-export/config.toml`.
//!
//! ## Failure behavior
//!
//! Any database or file-system error aborts the run. A failure part-way through the
//! write leaves the truncated CSV on disk.

pub mod apple_time;
pub mod export;
pub mod selector;
pub mod utils;
pub mod writer;

pub use apple_time::apple_time_to_iso;
pub use export::{ExportSummary, execute};
pub use utils::{DatabaseNotFound, ExportConfig};
