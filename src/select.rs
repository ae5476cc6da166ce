//! Chooses which entry to display: the deterministic "prayer of the day"
//! (seeded by day-of-year), the "show me another" random draw that avoids
//! repeats within a session, and the session-scoped [`ShownSet`] the draw
//! tracks its history in. The RNG is passed in by the caller so tests can
//! drive a fixed sequence.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;

/// Selects the entry of the day: day-of-year (1-based) modulo the list
/// length. The same calendar date always yields the same entry for a fixed
/// list; when the list grows or shrinks between requests on the same day the
/// result may change, which is accepted.
pub fn entry_of_the_day<T>(entries: &[T], date: NaiveDate) -> Result<&T> {
    if entries.is_empty() {
        return Err(Error::EmptyPool);
    }
    Ok(&entries[date.ordinal() as usize % entries.len()])
}

/// Session-scoped record of which entry ids have already been displayed,
/// used by [`pick_unshown`] to avoid immediate repeats. Seed it with the
/// initially displayed entry's id.
#[derive(Clone, Debug, Default)]
pub struct ShownSet {
    ids: HashSet<u64>,
}

impl ShownSet {
    pub fn new() -> ShownSet {
        ShownSet::default()
    }

    /// A shown set already containing the given id (the entry displayed on
    /// first load).
    pub fn seeded(id: u64) -> ShownSet {
        let mut shown = ShownSet::new();
        shown.record(id);
        shown
    }

    pub fn record(&mut self, id: u64) {
        self.ids.insert(id);
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Draws a uniformly random entry whose id is not in the shown set and
/// records the pick. When every entry has already been shown the set is reset
/// first and the draw is uniform over the full pool, so the pick immediately
/// preceding the reset may repeat. An empty list is a precondition violation
/// and reported as [`Error::EmptyPool`], never papered over with a
/// placeholder.
pub fn pick_unshown<'a, T, R>(entries: &'a [T], shown: &mut ShownSet, rng: &mut R) -> Result<&'a T>
where
    T: HasId,
    R: Rng,
{
    if entries.is_empty() {
        return Err(Error::EmptyPool);
    }

    let available: Vec<&T> = entries.iter().filter(|e| !shown.contains(e.id())).collect();
    let pick = if available.is_empty() {
        shown.reset();
        &entries[rng.gen_range(0..entries.len())]
    } else {
        available[rng.gen_range(0..available.len())]
    };
    shown.record(pick.id());
    Ok(pick)
}

/// Anything with a stable numeric id, implemented by the entry types so the
/// selection functions work over full records and index projections alike.
pub trait HasId {
    fn id(&self) -> u64;
}

impl HasId for crate::entry::PrayerEntry {
    fn id(&self) -> u64 {
        self.id
    }
}

impl HasId for crate::entry::IndexEntry {
    fn id(&self) -> u64 {
        self.id
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a selection failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a selection is requested against zero entries.
    #[error("selection requested against an empty entry list")]
    EmptyPool,
}
