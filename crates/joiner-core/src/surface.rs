//! The list-shaped view handed to a rendering surface.

use std::rc::Rc;

use crate::change::JoinedChange;
use crate::error::JoinError;
use crate::joiner::{Shared, TypeInfo};
use crate::notifier::Subscription;
use crate::section::StableId;
use crate::type_registry::CompositeType;

/// Read side of a [`Joiner`](crate::Joiner): counts, types, ids and content
/// for composite slots, plus the composite change stream.
///
/// Every per-slot query fails with [`JoinError::OutOfRange`] outside
/// `[0, item_count())`. Such a read means the caller's bookkeeping is behind
/// the joiner's, so the error is never clamped away.
pub struct JoinedSurface<C: 'static> {
    shared: Rc<Shared<C>>,
}

impl<C: 'static> Clone for JoinedSurface<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<C: 'static> JoinedSurface<C> {
    pub(crate) fn new(shared: Rc<Shared<C>>) -> Self {
        Self { shared }
    }

    pub fn item_count(&self) -> usize {
        self.shared.item_count()
    }

    pub fn type_at(&self, slot: usize) -> Result<CompositeType, JoinError> {
        self.shared
            .locate(slot)
            .map(|(_, entry)| entry.composite_type)
    }

    /// Asks the owning section to materialize the item behind `slot`.
    pub fn content_at(&self, slot: usize) -> Result<C, JoinError> {
        // The joiner state is released before calling into the section.
        let (section, entry) = self.shared.locate(slot)?;
        Ok(section.materialize(entry.real_index))
    }

    /// Stable id of the item behind `slot`; always `None` when the joiner was
    /// configured without stable ids.
    pub fn id_at(&self, slot: usize) -> Result<StableId, JoinError> {
        let (section, entry) = self.shared.locate(slot)?;
        if !self.shared.config().stable_ids {
            return Ok(None);
        }
        Ok(section.stable_id(entry.real_index))
    }

    pub fn has_stable_ids(&self) -> bool {
        self.shared.config().stable_ids
    }

    /// Section and local type behind `composite_type`, e.g. to pick a content
    /// pool per type.
    pub fn type_info(&self, composite_type: CompositeType) -> Option<TypeInfo<C>> {
        self.shared.type_info(composite_type)
    }

    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe(&self, observer: impl Fn(&JoinedChange) + 'static) -> Subscription {
        self.shared.changes().subscribe(observer)
    }
}

impl<C: 'static> std::fmt::Debug for JoinedSurface<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinedSurface")
            .field("item_count", &self.item_count())
            .field("stable_ids", &self.has_stable_ids())
            .finish()
    }
}
