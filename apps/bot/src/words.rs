//! The word book: grouped candidate keywords.
//!
//! The source file is CSV, one group of related words per line. A session
//! draws one group, then two distinct words from it: the first becomes the
//! spy word, the second the civilian word.

use std::path::Path;

use rand::seq::{index, IndexedRandom};
use rand::Rng;

use crate::error::AppError;
use crate::errors::domain::DomainError;

/// Grouped keyword candidates, loaded once per process.
#[derive(Debug, Clone)]
pub struct WordBook {
    groups: Vec<Vec<String>>,
}

impl WordBook {
    /// Load and validate a word file. Every non-empty line must carry at
    /// least two words; a sparser line would make the draw fail mid-game,
    /// so it is rejected here instead.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|err| {
                AppError::words(format!("cannot read {}: {err}", path.display()))
            })?;

        let mut groups = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|err| {
                AppError::words(format!("{} line {}: {err}", path.display(), line + 1))
            })?;
            let group: Vec<String> = record
                .iter()
                .map(str::trim)
                .filter(|word| !word.is_empty())
                .map(String::from)
                .collect();
            if group.is_empty() {
                continue;
            }
            if group.len() < 2 {
                return Err(AppError::words(format!(
                    "{} line {} has fewer than two words",
                    path.display(),
                    line + 1
                )));
            }
            groups.push(group);
        }

        if groups.is_empty() {
            return Err(AppError::words(format!(
                "{} contains no word groups",
                path.display()
            )));
        }
        Ok(Self { groups })
    }

    /// Build a book from in-memory groups. Draw-time validation still
    /// applies, so unchecked input only fails when actually drawn from.
    pub fn from_groups(groups: Vec<Vec<String>>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Uniformly pick one word group.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<&[String]> {
        self.groups.choose(rng).map(Vec::as_slice)
    }
}

/// Draw two distinct words from a group without replacement.
pub fn draw_two_distinct(
    group: &[String],
    rng: &mut impl Rng,
) -> Result<(String, String), DomainError> {
    if group.len() < 2 {
        return Err(DomainError::configuration(
            "The chosen word group has fewer than two entries.",
        ));
    }
    let picks = index::sample(rng, group.len(), 2).into_vec();
    Ok((group[picks[0]].clone(), group[picks[1]].clone()))
}
