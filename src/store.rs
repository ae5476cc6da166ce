//! Read access to the on-disk content store. The store is a data directory
//! holding one JSON file per entry under `prayers/`, keyed by slug, plus the
//! aggregate `prayers-index.json`. Entries are read-only at request time;
//! only the offline maintenance batch in [`crate::rewrite`] mutates them, so
//! concurrent reads need no coordination.

use crate::entry::{PrayerEntry, PrayerIndex};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const INDEX_FILE: &str = "prayers-index.json";
const ENTRIES_DIR: &str = "prayers";
const JSON_EXTENSION: &str = ".json";

/// Handle on a content store data directory.
pub struct Store {
    data_directory: PathBuf,
}

impl Store {
    /// Opens a store rooted at the given data directory. The directory is not
    /// touched until the first read.
    pub fn open(data_directory: &Path) -> Store {
        Store {
            data_directory: data_directory.to_owned(),
        }
    }

    /// The path of the aggregate index file.
    pub fn index_path(&self) -> PathBuf {
        self.data_directory.join(INDEX_FILE)
    }

    /// The path of the entry record with the given slug.
    pub fn entry_path(&self, slug: &str) -> PathBuf {
        self.data_directory
            .join(ENTRIES_DIR)
            .join(format!("{}{}", slug, JSON_EXTENSION))
    }

    /// Loads the full index.
    pub fn load_index(&self) -> Result<PrayerIndex> {
        let path = self.index_path();
        let file = File::open(&path).map_err(|err| Error::Open { path, err })?;
        serde_json::from_reader(file).map_err(|err| Error::Parse {
            path: self.index_path(),
            err,
        })
    }

    /// Loads the entry with the given slug, or [`Error::NotFound`] when no
    /// record exists under that slug.
    pub fn load_entry(&self, slug: &str) -> Result<PrayerEntry> {
        let path = self.entry_path(slug);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    slug: slug.to_owned(),
                })
            }
            Err(err) => return Err(Error::Open { path, err }),
        };
        serde_json::from_reader(file).map_err(|err| Error::Parse { path, err })
    }

    /// Loads every entry in index order. Index order is the canonical
    /// ordering for the deterministic selections, so callers get a stable
    /// list across runs.
    pub fn load_all(&self) -> Result<Vec<PrayerEntry>> {
        let index = self.load_index()?;
        index
            .prayers
            .iter()
            .map(|p| self.load_entry(&p.url))
            .collect()
    }

    /// Writes an entry record to its slug-keyed file.
    pub fn save_entry(&self, entry: &PrayerEntry) -> Result<()> {
        let path = self.entry_path(&entry.url);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(&path).map_err(|err| Error::Open { path, err })?;
        serde_json::to_writer_pretty(file, entry)?;
        Ok(())
    }

    /// Writes the aggregate index file.
    pub fn save_index(&self, index: &PrayerIndex) -> Result<()> {
        let path = self.index_path();
        let file = File::create(&path).map_err(|err| Error::Open { path, err })?;
        serde_json::to_writer_pretty(file, index)?;
        Ok(())
    }

    /// Deletes the entry file with the given slug. Used by the maintenance
    /// batch after a slug change moves a record to a new file.
    pub fn remove_entry_file(&self, slug: &str) -> Result<()> {
        std::fs::remove_file(self.entry_path(slug))?;
        Ok(())
    }

    /// The slugs of every entry file present on disk, regardless of whether
    /// the index knows about them.
    pub fn scan_entry_files(&self) -> Result<Vec<String>> {
        let dir = self.data_directory.join(ENTRIES_DIR);
        let mut slugs = Vec::new();
        for result in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let dir_entry = result?;
            let file_name = dir_entry.file_name().to_string_lossy();
            if file_name.ends_with(JSON_EXTENSION) {
                slugs.push(file_name.trim_end_matches(JSON_EXTENSION).to_owned());
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Checks the store invariants: slugs are unique across the index, every
    /// index entry has a matching record file whose `id`, `title`, and `url`
    /// mirror the index, and no record file exists that the index doesn't
    /// list.
    pub fn verify(&self) -> Result<()> {
        let index = self.load_index()?;

        let mut seen: HashSet<&str> = HashSet::new();
        for p in &index.prayers {
            if !seen.insert(&p.url) {
                return Err(Error::DuplicateSlug {
                    slug: p.url.clone(),
                });
            }

            let entry = self.load_entry(&p.url)?;
            if entry.id != p.id || entry.title != p.title || entry.url != p.url {
                return Err(Error::IndexDiverged {
                    id: p.id,
                    slug: p.url.clone(),
                });
            }
        }

        for slug in self.scan_entry_files()? {
            if !seen.contains(slug.as_str()) {
                return Err(Error::OrphanEntry { slug });
            }
        }

        Ok(())
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a content store failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a slug has no matching entry record.
    #[error("no entry found for slug `{slug}`")]
    NotFound { slug: String },

    /// Returned when a store file cannot be opened or created.
    #[error("opening store file `{path}`: {err}")]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a store file fails to parse as JSON.
    #[error("parsing store file `{path}`: {err}")]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_json::Error,
    },

    /// Returned when the index lists the same slug twice.
    #[error("duplicate slug `{slug}` in index")]
    DuplicateSlug { slug: String },

    /// Returned when an entry record and its index projection disagree.
    #[error("index entry {id} (`{slug}`) diverged from its record")]
    IndexDiverged { id: u64, slug: String },

    /// Returned when an entry file exists on disk that the index doesn't
    /// list.
    #[error("entry file `{slug}` not listed in index")]
    OrphanEntry { slug: String },

    /// Returned when serializing a record fails.
    #[error("serializing store file: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Returned when walking the entries directory fails.
    #[error("scanning entries directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
