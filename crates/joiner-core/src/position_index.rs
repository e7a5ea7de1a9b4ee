//! Slot table mapping composite slots to their owning section.
//!
//! Rebuilt from scratch whenever any section reports a change; the rebuild is
//! O(total items). Reverse lookups use per-section spans: a section's items
//! always occupy one contiguous run of composite slots, so real index `i` of a
//! section with span `s` lives at `s.start + i`.

use std::ops::Range;

use crate::collections::map::HashMap;
use crate::section::{LocalType, SectionKey, SectionRef};
use crate::type_registry::{CompositeType, TypeRegistry};

/// One composite slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlotEntry {
    /// Position of the owning section in registration order.
    pub(crate) section: usize,
    pub(crate) real_index: usize,
    pub(crate) composite_type: CompositeType,
    pub(crate) local_type: LocalType,
}

#[derive(Default)]
pub(crate) struct PositionIndex {
    entries: Vec<SlotEntry>,
    spans: HashMap<SectionKey, Range<usize>>,
    generation: u64,
}

impl PositionIndex {
    /// An empty index whose next [`rebuild`](PositionIndex::rebuild) starts
    /// the generation after this one.
    pub(crate) fn successor(&self) -> Self {
        Self {
            generation: self.generation,
            ..Self::default()
        }
    }

    /// Re-reads every section's items.
    ///
    /// # Panics
    ///
    /// Panics if a section reports a type it did not declare; the type
    /// registry must have been rebuilt for the same sections first.
    pub(crate) fn rebuild<'a, C: 'a>(
        &mut self,
        sections: impl IntoIterator<Item = &'a SectionRef<C>>,
        types: &TypeRegistry,
    ) {
        self.entries.clear();
        self.spans.clear();
        for (ordinal, section) in sections.into_iter().enumerate() {
            let key = SectionKey::of(section);
            let start = self.entries.len();
            let count = section.item_count();
            self.entries.reserve(count);
            for real_index in 0..count {
                let local_type = section.type_of(real_index);
                let Some(composite_type) = types.composite_type(key, local_type) else {
                    panic!(
                        "section #{ordinal} reported undeclared type {local_type} for item {real_index}"
                    );
                };
                self.entries.push(SlotEntry {
                    section: ordinal,
                    real_index,
                    composite_type,
                    local_type,
                });
            }
            self.spans.insert(key, start..self.entries.len());
        }
        self.generation += 1;
        log::trace!(
            "position index generation {}: {} slots",
            self.generation,
            self.entries.len()
        );
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, slot: usize) -> Option<&SlotEntry> {
        self.entries.get(slot)
    }

    /// Composite slots currently owned by `section`.
    pub(crate) fn span(&self, section: SectionKey) -> Option<Range<usize>> {
        self.spans.get(&section).cloned()
    }

    pub(crate) fn composite_position(&self, section: SectionKey, real_index: usize) -> Option<usize> {
        let span = self.spans.get(&section)?;
        let slot = span.start.checked_add(real_index)?;
        (slot < span.end).then_some(slot)
    }

    /// Bumped by every rebuild.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
