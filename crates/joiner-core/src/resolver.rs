//! Composite slot → real index translation for item callbacks.
//!
//! Item views only know the composite slot they were bound to, while their
//! owning section wants its own index back (for example in a click handler).
//! Sections that are sometimes shown through a joiner and sometimes on their
//! own hold a resolver and stay agnostic of which case they are in.
//!
//! A resolver does not keep its joiner alive, so a registered section may
//! own one.

use std::rc::Weak;

use crate::joiner::{Joiner, Shared};

pub struct RealPositionResolver<C: 'static> {
    joiner: Option<Weak<Shared<C>>>,
}

impl<C: 'static> RealPositionResolver<C> {
    pub fn new(joiner: &Joiner<C>) -> Self {
        Self {
            joiner: Some(joiner.downgrade()),
        }
    }

    /// A resolver for a section displayed on its own: slots are real indices.
    pub fn identity() -> Self {
        Self { joiner: None }
    }

    /// Real index behind `slot`; `None` if a joined slot is out of bounds or
    /// the joiner has been dropped.
    pub fn real_position(&self, slot: usize) -> Option<usize> {
        let Some(joiner) = &self.joiner else {
            return Some(slot);
        };
        let (_, entry) = joiner.upgrade()?.locate(slot).ok()?;
        Some(entry.real_index)
    }
}

impl<C: 'static> Clone for RealPositionResolver<C> {
    fn clone(&self) -> Self {
        Self {
            joiner: self.joiner.clone(),
        }
    }
}

impl<C: 'static> Default for RealPositionResolver<C> {
    fn default() -> Self {
        Self::identity()
    }
}
