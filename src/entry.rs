//! The data model for the content store: full prayer entries
//! ([`PrayerEntry`]), the lightweight per-collection index ([`PrayerIndex`]
//! and [`IndexEntry`]), and the filtering helpers the catalog uses. Field
//! names serialize in the camelCase on-disk format the site's data files use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single prayer record as stored on disk, one JSON file per entry keyed by
/// its slug.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrayerEntry {
    /// Stable numeric identifier. Unique, immutable once assigned, and used
    /// as the seed for deterministic selection.
    pub id: u64,

    /// Human-readable display name. Not guaranteed unique across entries.
    pub title: String,

    /// Primary body text. Embedded line breaks are preserved verbatim.
    pub content: String,

    /// Optional modern-language rendering of the same text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_modern: Option<String>,

    /// The current slug. Doubles as the storage key (filename stem) and the
    /// public path segment. Unique across the entire store.
    pub url: String,

    /// The previous slug, retained for audit. Never used in lookups.
    pub original_url: String,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,

    /// Optional descriptive metadata with free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<EntrySummary>,
}

/// Free-form descriptive metadata attached to some entries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub text: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// The aggregate index file: one lightweight [`IndexEntry`] per prayer, used
/// for listing and search without loading full bodies.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrayerIndex {
    pub total_count: usize,

    /// Refreshed whenever a maintenance rewrite changes at least one record;
    /// serves as the index's cache-invalidation signal.
    pub last_updated: DateTime<Utc>,

    pub prayers: Vec<IndexEntry>,
}

/// A projection of a [`PrayerEntry`] carried in the index. The `id`, `title`,
/// and `url` fields mirror the full record exactly and must stay in sync
/// after any slug regeneration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: u64,
    pub title: String,
    pub url: String,

    /// A single classification label.
    #[serde(default)]
    pub category: String,

    /// Search/filter keywords.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IndexEntry {
    /// Builds the canonical public URL for the entry by joining its slug onto
    /// the site root under the given path prefix.
    pub fn permalink(&self, site_root: &Url, prefix: &str) -> Result<Url, url::ParseError> {
        site_root.join(&format!("{}/{}", prefix.trim_end_matches('/'), self.url))
    }
}

impl PrayerIndex {
    /// Case-insensitive substring search over titles and tags, as the catalog
    /// search box behaves.
    pub fn search(&self, query: &str) -> Vec<&IndexEntry> {
        let query = query.to_lowercase();
        self.prayers
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&query)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// All entries with the given classification label (exact match).
    pub fn in_category(&self, category: &str) -> Vec<&IndexEntry> {
        self.prayers
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// All entries carrying the given tag (exact match).
    pub fn with_tag(&self, tag: &str) -> Vec<&IndexEntry> {
        self.prayers
            .iter()
            .filter(|p| p.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Looks up an index entry by slug.
    pub fn by_slug(&self, slug: &str) -> Option<&IndexEntry> {
        self.prayers.iter().find(|p| p.url == slug)
    }
}
