//! Ordered clip collection
//!
//! Clips are immutable once added and concatenate in list order at export
//! time. Overlapping or out-of-order clips are permitted; the user owns the
//! ordering and no merge or sort is ever applied.

use crate::domain::errors::EditError;
use crate::domain::model::{Clip, TimelineLimits, TrimRange};

/// Stable identity of a clip within a [`ClipSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(u64);

/// Ordered set of clips selected for export
#[derive(Debug, Default)]
pub struct ClipSet {
    entries: Vec<(ClipId, Clip)>,
    next_id: u64,
}

impl ClipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Ordered clip values, as consumed by the export compiler
    pub fn clips(&self) -> Vec<Clip> {
        self.entries.iter().map(|(_, clip)| *clip).collect()
    }

    pub fn ids(&self) -> Vec<ClipId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, clip)| clip)
    }

    /// Append a clip. `Clip` construction already guarantees `start < end`.
    pub fn add(&mut self, clip: Clip) -> ClipId {
        let id = ClipId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, clip));
        id
    }

    /// Append the clip selected by the current trim window; a zero-width
    /// window is refused with `InvalidRange`
    pub fn add_from_trim(
        &mut self,
        trim: &TrimRange,
        limits: &TimelineLimits,
    ) -> Result<ClipId, EditError> {
        let clip = Clip::from_trim(trim, limits)?;
        Ok(self.add(clip))
    }

    /// Pure removal; no cascading effects
    pub fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let index = self
            .entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Replace the sequence order without altering clip identity or content.
    ///
    /// Ids listed in `order` come first, in that order; clips not mentioned
    /// keep their relative order at the tail, so a reorder can never drop a
    /// clip. Unknown ids are skipped.
    pub fn reorder(&mut self, order: &[ClipId]) {
        let mut reordered = Vec::with_capacity(self.entries.len());
        for &id in order {
            if let Some(index) = self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
                reordered.push(self.entries.remove(index));
            }
        }
        reordered.append(&mut self.entries);
        self.entries = reordered;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
