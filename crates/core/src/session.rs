//! Keyed edit sessions.
//!
//! Each chart section that can be edited independently gets its own slot in
//! an [`EditSessionStore`], keyed by a stable identifier (a tooth number for
//! per-tooth sections). Slots are fully independent: editing tooth 14's plan
//! never touches tooth 9's draft. Per key the lifecycle is
//! Idle → `start_edit` → Editing → (`cancel_edit` | save success) → Idle,
//! and a failed save leaves the slot in Editing with the draft intact.

use std::collections::HashMap;
use std::hash::Hash;

use crate::draft::{Draft, Patchable};

/// Zero or more independent drafts, one per key.
#[derive(Debug, Clone)]
pub struct EditSessionStore<K, T>
where
    K: Eq + Hash + Copy,
    T: Patchable,
{
    drafts: HashMap<K, Draft<T>>,
}

impl<K, T> Default for EditSessionStore<K, T>
where
    K: Eq + Hash + Copy,
    T: Patchable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> EditSessionStore<K, T>
where
    K: Eq + Hash + Copy,
    T: Patchable,
{
    pub fn new() -> Self {
        Self {
            drafts: HashMap::new(),
        }
    }

    /// Opens (or restarts) an edit session at `key`, seeded from `seed`.
    ///
    /// `seed` must be the current server-truth sub-entity, or the documented
    /// empty default when none exists yet. An existing draft at the same key
    /// is discarded.
    pub fn start_edit(&mut self, key: K, seed: T) -> &mut Draft<T> {
        self.drafts.insert(key, Draft::new(seed));
        self.drafts
            .get_mut(&key)
            .expect("draft was just inserted at this key")
    }

    pub fn draft(&self, key: K) -> Option<&Draft<T>> {
        self.drafts.get(&key)
    }

    pub fn draft_mut(&mut self, key: K) -> Option<&mut Draft<T>> {
        self.drafts.get_mut(&key)
    }

    /// Discards the draft at `key`, reverting the section to server truth.
    ///
    /// Purely local; performs no I/O. Returns whether a draft existed.
    pub fn cancel_edit(&mut self, key: K) -> bool {
        self.drafts.remove(&key).is_some()
    }

    /// Removes and returns the draft at `key` (used once a save succeeded).
    pub fn take(&mut self, key: K) -> Option<Draft<T>> {
        self.drafts.remove(&key)
    }

    pub fn is_editing(&self, key: K) -> bool {
        self.drafts.contains_key(&key)
    }

    /// Drops every draft. Called on view close so no edit state leaks into
    /// the next aggregate instance.
    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    pub fn active_keys(&self) -> impl Iterator<Item = K> + '_ {
        self.drafts.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
