//! Parsers for the raw data files.
//!
//! Two line-oriented, `::`-separated files feed the system:
//! - ratings.dat: userId::movieId::rating
//! - movies.dat:  movieId::title::description (description optional)
//!
//! The mapping is strict and positional: a line with the wrong field count
//! or an unparseable field fails with file/line context instead of being
//! silently skipped. The recommendation core never sees raw lines, only the
//! typed rows produced here.

use crate::error::{DataLoadError, Result};
use crate::types::{Movie, Rating};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Helper function to read a file with ISO-8859-1 encoding (Latin-1)
///
/// Older catalog dumps use ISO-8859-1, not UTF-8. This reads the file as
/// bytes and maps each byte directly to its Unicode code point, which is
/// exactly the Latin-1 decoding.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the ratings file.
///
/// Format: userId::movieId::rating
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = file_name(path);
    let lines = read_lines_latin1(path)?;
    let mut ratings = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let fields: Vec<&str> = trimmed.split("::").collect();
        if fields.len() != 3 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: 3,
                found: fields.len(),
                line: line_no,
            });
        }

        let user_id = fields[0]
            .parse()
            .map_err(|e| DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Invalid userId: {}", e),
            })?;
        let movie_id = fields[1]
            .parse()
            .map_err(|e| DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Invalid movieId: {}", e),
            })?;
        let value: f32 = fields[2]
            .parse()
            .map_err(|e| DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Invalid rating: {}", e),
            })?;

        // The value range is inferred downstream from the data; the only
        // thing rejected here is a value arithmetic can't work with.
        if !value.is_finite() {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: fields[2].to_string(),
            });
        }

        ratings.push(Rating {
            user_id,
            movie_id,
            value,
        });
    }

    Ok(ratings)
}

/// Parse the movies file.
///
/// Format: movieId::title::description
///
/// The description field is optional; a line with only two fields, or with
/// an empty third field, yields a movie without description text.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = file_name(path);
    let lines = read_lines_latin1(path)?;
    let mut movies = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue; // Skip empty lines
        }

        // splitn keeps any "::" inside the description text intact
        let fields: Vec<&str> = trimmed.splitn(3, "::").collect();
        if fields.len() < 2 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: 3,
                found: fields.len(),
                line: line_no,
            });
        }

        let id = fields[0]
            .parse()
            .map_err(|e| DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Invalid movieId: {}", e),
            })?;

        let title = fields[1].trim();
        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: "Empty title".to_string(),
            });
        }

        let description = fields
            .get(2)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(|d| d.to_string());

        movies.push(Movie {
            id,
            title: title.to_string(),
            description,
        });
    }

    Ok(movies)
}
