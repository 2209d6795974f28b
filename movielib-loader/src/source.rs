//! Raw source reading
//!
//! The source is a CSV file with a header row. Only the five columns below are
//! used; any other columns are ignored. Fields are kept as raw text here and
//! coerced later by [`crate::cleaning`].

use movielib_common::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const TITLE_COLUMN: &str = "Series_Title";
pub const YEAR_COLUMN: &str = "Released_Year";
pub const RATING_COLUMN: &str = "IMDB_Rating";
pub const DIRECTOR_COLUMN: &str = "Director";
pub const GENRE_COLUMN: &str = "Genre";

/// One source record, fields untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovie {
    /// Line number in the source file (header is line 1)
    pub line: u64,
    pub title: Option<String>,
    pub year: Option<String>,
    pub rating: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
}

/// Everything read from the source file
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub rows: Vec<RawMovie>,
    /// Records the CSV reader could not decode (e.g. invalid UTF-8)
    pub unreadable_rows: usize,
}

impl SourceTable {
    /// Number of data records in the source, readable or not
    pub fn total_rows(&self) -> usize {
        self.rows.len() + self.unreadable_rows
    }
}

struct ColumnIndex {
    title: usize,
    year: usize,
    rating: usize,
    director: usize,
    genre: usize,
}

/// Read the source CSV file
pub fn read_source(path: &Path) -> Result<SourceTable> {
    if !path.is_file() {
        return Err(Error::NotFound(format!(
            "Source file not found: {}",
            path.display()
        )));
    }

    let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    read_records(reader)
}

/// Read source records from any CSV reader
pub fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<SourceTable> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let locate = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            Error::InvalidInput(format!("Source is missing required column '{}'", name))
        })
    };

    let columns = ColumnIndex {
        title: locate(TITLE_COLUMN)?,
        year: locate(YEAR_COLUMN)?,
        rating: locate(RATING_COLUMN)?,
        director: locate(DIRECTOR_COLUMN)?,
        genre: locate(GENRE_COLUMN)?,
    };

    let mut table = SourceTable::default();

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!("Skipping unreadable record {}: {}", row_no + 1, e);
                table.unreadable_rows += 1;
                continue;
            }
        };

        let field = |idx: usize| record.get(idx).map(str::to_string);

        table.rows.push(RawMovie {
            line: record
                .position()
                .map(|p| p.line())
                .unwrap_or(row_no as u64 + 2),
            title: field(columns.title),
            year: field(columns.year),
            rating: field(columns.rating),
            director: field(columns.director),
            genre: field(columns.genre),
        });
    }

    Ok(table)
}
