//! Store models

use serde::Serialize;

/// Director lookup row; `name` is the natural key
#[derive(Debug, Clone, PartialEq)]
pub struct Director {
    pub id: i64,
    pub name: String,
}

/// Genre lookup row; `name` is the natural key
#[derive(Debug, Clone, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Movie row ready for insertion, with resolved foreign keys
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub release_year: i64,
    pub rating: f64,
    pub director_id: i64,
    pub genre_id: i64,
}

/// Movie joined to its director and genre names, as shown by the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRow {
    pub title: String,
    pub year: i64,
    pub rating: f64,
    pub director: String,
    pub genre: String,
}

/// Row counts of the three entity tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub directors: i64,
    pub genres: i64,
    pub movies: i64,
}
