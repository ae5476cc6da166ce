//! Thematic category table: maps entry ids to categories and deterministically
//! picks a heading variant for an entry from its category's candidate list.
//! The heading choice is seeded by the entry's numeric id alone, so the same
//! entry renders the same heading across requests and across regeneration
//! runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// The category table file: named categories plus a mapping from entry id to
/// category key. Ids are stored as strings in the JSON format.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    pub categories: HashMap<String, Category>,
    pub prayer_mappings: HashMap<String, String>,
}

/// A single thematic category.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,

    /// Candidate heading strings for entries in this category. May be empty.
    #[serde(default, rename = "h1Variations")]
    pub heading_variants: Vec<String>,
}

impl Categories {
    /// Loads the category table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Categories> {
        let file = std::fs::File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        Ok(serde_json::from_reader(file)?)
    }

    /// The category assigned to the given entry id, if any.
    pub fn category_of(&self, id: u64) -> Option<&Category> {
        let key = self.prayer_mappings.get(&id.to_string())?;
        self.categories.get(key)
    }

    /// Deterministically selects a heading for the entry:
    /// `variants[id mod variants.len()]` from the entry's category. Returns
    /// `None` when the entry has no category or the category has no heading
    /// variants; callers fall back to a default heading.
    pub fn heading(&self, id: u64) -> Option<&str> {
        let category = self.category_of(id)?;
        heading_variant(id, &category.heading_variants)
    }
}

/// The raw modular selection underneath [`Categories::heading`], usable with
/// any candidate list.
pub fn heading_variant(id: u64, variants: &[String]) -> Option<&str> {
    if variants.is_empty() {
        return None;
    }
    Some(&variants[id as usize % variants.len()])
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the category table.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the category file cannot be opened.
    #[error("opening category file `{path}`: {err}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the category file fails to parse.
    #[error("parsing category file: {0}")]
    Parse(#[from] serde_json::Error),
}
