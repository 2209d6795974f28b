//! Field coercion and row filtering
//!
//! Numeric fields that cannot be parsed become missing rather than raising.
//! A row missing its rating, year, director or first genre is dropped before
//! any entity derivation, so dropped rows never contribute lookup rows.

use tracing::debug;

use crate::source::RawMovie;

/// Separator between genres in the raw genre field
pub const GENRE_DELIMITER: char = ',';

/// A source row that passed all coercion checks
#[derive(Debug, Clone, PartialEq)]
pub struct CleanMovie {
    pub line: u64,
    pub title: String,
    pub release_year: i64,
    pub rating: f64,
    pub director: String,
    /// First listed genre only
    pub genre: String,
}

/// Why a row was dropped
///
/// When a row has several problems, the first in declaration order is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingRating,
    MissingYear,
    MissingDirector,
    MissingGenre,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::MissingRating => "rating missing or not numeric",
            DropReason::MissingYear => "release year missing or not numeric",
            DropReason::MissingDirector => "director missing",
            DropReason::MissingGenre => "genre missing",
        }
    }
}

/// Aggregate drop counts per reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub missing_rating: usize,
    pub missing_year: usize,
    pub missing_director: usize,
    pub missing_genre: usize,
}

impl DropCounts {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingRating => self.missing_rating += 1,
            DropReason::MissingYear => self.missing_year += 1,
            DropReason::MissingDirector => self.missing_director += 1,
            DropReason::MissingGenre => self.missing_genre += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_rating + self.missing_year + self.missing_director + self.missing_genre
    }
}

/// Coerce a raw rating to a finite number
pub fn coerce_rating(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Coerce a raw release year to a whole number
///
/// Integer text is taken as is. Float text ("2010.0", "1994.5") is truncated
/// toward zero.
pub fn coerce_year(raw: Option<&str>) -> Option<i64> {
    let text = raw.map(str::trim).filter(|s| !s.is_empty())?;

    if let Ok(year) = text.parse::<i64>() {
        return Some(year);
    }

    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(f64::trunc)
        .filter(|v| *v >= i64::MIN as f64 && *v < i64::MAX as f64)
        .map(|v| v as i64)
}

/// Trim a name field; blank is missing
pub fn clean_name(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First listed genre of a comma-separated genre field
///
/// Only the first genre is kept; the rest of the list is discarded.
pub fn first_genre(raw: Option<&str>) -> Option<String> {
    raw.and_then(|s| s.split(GENRE_DELIMITER).next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Coerce one raw row
pub fn clean_row(raw: &RawMovie) -> Result<CleanMovie, DropReason> {
    let rating = coerce_rating(raw.rating.as_deref()).ok_or(DropReason::MissingRating)?;
    let release_year = coerce_year(raw.year.as_deref()).ok_or(DropReason::MissingYear)?;
    let director = clean_name(raw.director.as_deref()).ok_or(DropReason::MissingDirector)?;
    let genre = first_genre(raw.genre.as_deref()).ok_or(DropReason::MissingGenre)?;

    Ok(CleanMovie {
        line: raw.line,
        title: raw.title.as_deref().map(str::trim).unwrap_or_default().to_string(),
        release_year,
        rating,
        director,
        genre,
    })
}

/// Coerce all rows, keeping the survivors in source order
pub fn clean_rows(rows: &[RawMovie]) -> (Vec<CleanMovie>, DropCounts) {
    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = DropCounts::default();

    for raw in rows {
        match clean_row(raw) {
            Ok(movie) => kept.push(movie),
            Err(reason) => {
                debug!("Dropping line {}: {}", raw.line, reason.as_str());
                dropped.record(reason);
            }
        }
    }

    (kept, dropped)
}
