//! The library code behind the `molitvenik` prayer-site tooling. The
//! architecture breaks down into a read-only content store and three small
//! utilities layered on top of it:
//!
//! 1. Reading entries and the aggregate index from disk ([`crate::store`])
//! 2. Choosing which entry to display ([`crate::select`]): the deterministic
//!    entry of the day, the session-scoped random draw that avoids repeats,
//!    and the id-seeded heading variant ([`crate::category`])
//! 3. Regenerating URL slugs offline ([`crate::slug`], [`crate::rewrite`])
//!
//! Of these, the slug rewrite is the only one that mutates the store: it
//! re-derives every slug from its title, resolves collisions with numeric
//! suffixes, and rewrites the per-entry records and the index together so
//! the two never diverge. Everything at request time is a plain read.
//!
//! The user-curated favorites list ([`crate::favorites`]) sits apart from
//! the store: it lives in client-local durable storage, references entries
//! weakly by id, and degrades to in-memory-only when that storage is
//! unavailable.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod category;
pub mod config;
pub mod entry;
pub mod favorites;
pub mod rewrite;
pub mod select;
pub mod slug;
pub mod store;
