use eyre::{Context, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// RFC 4180 record terminator. Written as raw bytes so no platform adds its own.
const RECORD_END: &str = "\r\n";

/// Write a single-column CSV, one record per item, no header.
///
/// The file is created or truncated up front. If an item is an `Err` the write
/// stops there and the error is returned; whatever was already written stays
/// on disk.
pub fn write_csv<I, S>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Result<S>>,
    S: AsRef<str>,
{
    let file = File::create(path)
        .wrap_err_with(|| format!("Failed to create: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut written = 0usize;
    for row in rows {
        let field = row?;
        write!(writer, "{}{}", escape_field(field.as_ref()), RECORD_END)
            .wrap_err_with(|| format!("Failed to write: {}", path.display()))?;
        written += 1;
    }

    writer
        .flush()
        .wrap_err_with(|| format!("Failed to flush: {}", path.display()))?;
    Ok(written)
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn one_record_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = ["2001-01-01T00:00:00Z", "2002-02-02T02:02:02Z"]
            .into_iter()
            .map(Ok);

        assert_eq!(write_csv(&path, rows).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2001-01-01T00:00:00Z\r\n2002-02-02T02:02:02Z\r\n"
        );
    }

    #[test]
    fn truncates_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale\r\nstale\r\nstale\r\n").unwrap();

        write_csv(&path, std::iter::once(Ok("fresh"))).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\r\n");
    }

    #[test]
    fn empty_input_gives_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let written = write_csv(&path, std::iter::empty::<Result<String>>()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(fs::read(&path).unwrap(), b"");
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn failing_row_stops_the_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows: Vec<Result<&str>> = vec![Ok("first"), Err(eyre!("boom")), Ok("never")];

        let err = write_csv(&path, rows).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");
        assert!(write_csv(&path, std::iter::once(Ok("x"))).is_err());
    }
}
