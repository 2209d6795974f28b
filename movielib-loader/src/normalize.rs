//! Entity derivation and foreign-key resolution
//!
//! Normalization runs in two phases:
//! 1. Derive the distinct director and genre names from the cleaned rows.
//!    These are inserted once each.
//! 2. Resolve every cleaned row's names to the ids assigned by the store.
//!    Only rows whose director and genre both resolve become movies.

use std::collections::{HashMap, HashSet};

use movielib_common::db::{Director, Genre, NewMovie};
use tracing::debug;

use crate::cleaning::CleanMovie;

/// Distinct lookup names, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySets {
    pub directors: Vec<String>,
    pub genres: Vec<String>,
}

/// Derive director and genre sets from the cleaned rows
pub fn derive_entities(movies: &[CleanMovie]) -> EntitySets {
    let mut sets = EntitySets::default();
    let mut seen_directors = HashSet::new();
    let mut seen_genres = HashSet::new();

    for movie in movies {
        if seen_directors.insert(movie.director.as_str()) {
            sets.directors.push(movie.director.clone());
        }
        if seen_genres.insert(movie.genre.as_str()) {
            sets.genres.push(movie.genre.clone());
        }
    }

    sets
}

/// Name → id lookups built from persisted lookup rows
#[derive(Debug, Clone, Default)]
pub struct KeyMaps {
    directors: HashMap<String, i64>,
    genres: HashMap<String, i64>,
}

impl KeyMaps {
    pub fn new(directors: Vec<Director>, genres: Vec<Genre>) -> Self {
        Self {
            directors: directors.into_iter().map(|d| (d.name, d.id)).collect(),
            genres: genres.into_iter().map(|g| (g.name, g.id)).collect(),
        }
    }

    pub fn director_id(&self, name: &str) -> Option<i64> {
        self.directors.get(name).copied()
    }

    pub fn genre_id(&self, name: &str) -> Option<i64> {
        self.genres.get(name).copied()
    }

    /// Resolve a cleaned row to an insertable movie
    pub fn resolve(&self, movie: &CleanMovie) -> Option<NewMovie> {
        let director_id = self.director_id(&movie.director)?;
        let genre_id = self.genre_id(&movie.genre)?;

        Some(NewMovie {
            title: movie.title.clone(),
            release_year: movie.release_year,
            rating: movie.rating,
            director_id,
            genre_id,
        })
    }
}

/// Resolve all cleaned rows
///
/// Returns the insertable movies in source order and the number of rows whose
/// director or genre had no id.
pub fn resolve_movies(movies: &[CleanMovie], keys: &KeyMaps) -> (Vec<NewMovie>, usize) {
    let mut resolved = Vec::with_capacity(movies.len());
    let mut unresolved = 0;

    for movie in movies {
        match keys.resolve(movie) {
            Some(new_movie) => resolved.push(new_movie),
            None => {
                debug!(
                    "Dropping line {}: unresolved director '{}' or genre '{}'",
                    movie.line, movie.director, movie.genre
                );
                unresolved += 1;
            }
        }
    }

    (resolved, unresolved)
}
