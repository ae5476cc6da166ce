//! The offline maintenance batch: regenerates every slug from its title and
//! rewrites the index and the per-entry records to match. Entries are
//! processed in index order and each freshly assigned slug joins the taken
//! set before the next entry is processed, so duplicate titles within one
//! run resolve to distinct slugs. Re-running on unchanged input assigns the
//! same slugs and touches nothing, which makes interrupted runs safe to
//! repeat.

use crate::entry::PrayerEntry;
use crate::slug::{ensure_unique, shorten, slugify, MAX_SLUG_LENGTH};
use crate::store::Store;
use chrono::Utc;
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;

/// One slug reassignment performed by [`rewrite_slugs`].
#[derive(Clone, Debug, PartialEq)]
pub struct SlugChange {
    pub id: u64,
    pub old: String,
    pub new: String,
}

/// Regenerates slugs across the whole store. Returns the list of changes, in
/// index order; an empty list means the store was already up to date and no
/// file was touched.
pub fn rewrite_slugs(store: &Store) -> Result<Vec<SlugChange>> {
    let mut index = store.load_index()?;

    // Load every record up front so a later write can safely land on a file
    // that still holds an earlier entry's old record.
    let mut entries: Vec<PrayerEntry> = index
        .prayers
        .iter()
        .map(|p| store.load_entry(&p.url))
        .collect::<std::result::Result<_, _>>()?;

    let mut taken: HashSet<String> = HashSet::new();
    let mut changes: Vec<SlugChange> = Vec::new();
    let now = Utc::now();

    for (projection, entry) in index.prayers.iter_mut().zip(entries.iter_mut()) {
        let raw = slugify(&entry.title);
        let raw = if raw.is_empty() {
            // Untransliterable title; the numeric id is the fallback slug.
            entry.id.to_string()
        } else {
            shorten(&raw, MAX_SLUG_LENGTH)
        };
        let slug = ensure_unique(&raw, &taken);
        taken.insert(slug.clone());

        if slug != entry.url {
            info!(id = entry.id, old = %entry.url, new = %slug, "reassigning slug");
            changes.push(SlugChange {
                id: entry.id,
                old: entry.url.clone(),
                new: slug.clone(),
            });
            entry.original_url = entry.url.clone();
            entry.url = slug.clone();
            entry.updated_at = now;
            projection.url = slug;
        }
    }

    if changes.is_empty() {
        return Ok(changes);
    }

    // Write phase: new record files first, then the index, then remove the
    // stale files. A stale path that another entry now occupies is kept.
    for change in &changes {
        let entry = entries
            .iter()
            .find(|e| e.id == change.id)
            .expect("change refers to a loaded entry");
        store.save_entry(entry)?;
    }

    index.total_count = index.prayers.len();
    index.last_updated = now;
    store.save_index(&index)?;

    for change in &changes {
        if !taken.contains(&change.old) {
            store.remove_entry_file(&change.old)?;
        }
    }

    info!(changed = changes.len(), total = index.prayers.len(), "slug rewrite complete");
    Ok(changes)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a failed maintenance rewrite.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when reading or writing the store fails.
    #[error(transparent)]
    Store(#[from] crate::store::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entry::{IndexEntry, PrayerIndex};
    use chrono::{DateTime, TimeZone, Utc};
    use std::path::Path;

    fn entry(id: u64, title: &str, slug: &str) -> PrayerEntry {
        PrayerEntry {
            id,
            title: title.to_owned(),
            content: format!("Текст молитвы {}", id),
            content_modern: None,
            url: slug.to_owned(),
            original_url: String::new(),
            created_at: created(),
            updated_at: created(),
            summary: None,
        }
    }

    fn created() -> DateTime<Utc> {
        Utc.ymd(2024, 1, 1).and_hms(0, 0, 0)
    }

    fn seed_store(dir: &Path, entries: &[PrayerEntry]) -> anyhow::Result<Store> {
        let store = Store::open(dir);
        for e in entries {
            store.save_entry(e)?;
        }
        store.save_index(&PrayerIndex {
            total_count: entries.len(),
            last_updated: created(),
            prayers: entries
                .iter()
                .map(|e| IndexEntry {
                    id: e.id,
                    title: e.title.clone(),
                    url: e.url.clone(),
                    category: String::new(),
                    tags: Vec::new(),
                })
                .collect(),
        })?;
        Ok(store)
    }

    #[test]
    fn test_duplicate_titles_get_distinct_slugs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seed_store(
            dir.path(),
            &[
                entry(1, "Отче наш", "prayer-1"),
                entry(2, "Отче наш", "prayer-2"),
            ],
        )?;

        rewrite_slugs(&store)?;

        let index = store.load_index()?;
        assert_eq!(
            vec!["otche-nash", "otche-nash-1"],
            index.prayers.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
        );
        store.verify()?;
        Ok(())
    }

    #[test]
    fn test_rewrite_is_idempotent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seed_store(
            dir.path(),
            &[
                entry(1, "Отче наш", "prayer-1"),
                entry(2, "Символ веры", "prayer-2"),
            ],
        )?;

        let first = rewrite_slugs(&store)?;
        assert_eq!(2, first.len());
        let index_after_first = store.load_index()?;
        let entries_after_first = store.load_all()?;

        let second = rewrite_slugs(&store)?;
        assert!(second.is_empty());
        assert_eq!(index_after_first, store.load_index()?);
        assert_eq!(entries_after_first, store.load_all()?);
        Ok(())
    }

    #[test]
    fn test_changed_entry_is_renamed_and_audited() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seed_store(dir.path(), &[entry(1, "Отче наш", "prayer-1")])?;

        let changes = rewrite_slugs(&store)?;
        assert_eq!(
            vec![SlugChange {
                id: 1,
                old: "prayer-1".to_owned(),
                new: "otche-nash".to_owned(),
            }],
            changes,
        );

        let updated = store.load_entry("otche-nash")?;
        assert_eq!("prayer-1", updated.original_url);
        assert!(updated.updated_at > created());
        assert!(matches!(
            store.load_entry("prayer-1"),
            Err(crate::store::Error::NotFound { .. }),
        ));
        Ok(())
    }

    #[test]
    fn test_unchanged_entry_keeps_timestamps() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seed_store(
            dir.path(),
            &[
                entry(1, "Отче наш", "otche-nash"),
                entry(2, "Символ веры", "prayer-2"),
            ],
        )?;

        rewrite_slugs(&store)?;

        // Only the second entry changed; the first was already correct.
        assert_eq!(created(), store.load_entry("otche-nash")?.updated_at);
        assert!(store.load_entry("simvol-very")?.updated_at > created());
        Ok(())
    }

    #[test]
    fn test_untransliterable_title_falls_back_to_id() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seed_store(dir.path(), &[entry(7, "!!!", "prayer-7")])?;

        rewrite_slugs(&store)?;
        assert_eq!(7, store.load_entry("7")?.id);
        store.verify()?;
        Ok(())
    }

    #[test]
    fn test_long_title_is_shortened() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let title = "Молитва о здравии болящего человека читаемая ежедневно утром";
        let store = seed_store(dir.path(), &[entry(1, title, "prayer-1")])?;

        rewrite_slugs(&store)?;

        let index = store.load_index()?;
        assert!(index.prayers[0].url.len() <= MAX_SLUG_LENGTH);
        assert!(!index.prayers[0].url.ends_with('-'));
        Ok(())
    }

    #[test]
    fn test_swapped_slug_does_not_lose_records() -> anyhow::Result<()> {
        // Entry 2's new slug is entry 1's old file name.
        let dir = tempfile::tempdir()?;
        let store = seed_store(
            dir.path(),
            &[
                entry(1, "Символ веры", "otche-nash"),
                entry(2, "Отче наш", "prayer-2"),
            ],
        )?;

        rewrite_slugs(&store)?;

        assert_eq!(1, store.load_entry("simvol-very")?.id);
        assert_eq!(2, store.load_entry("otche-nash")?.id);
        store.verify()?;
        Ok(())
    }
}
