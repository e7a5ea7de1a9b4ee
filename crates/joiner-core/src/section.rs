//! The contract a joinable list section implements.

use std::rc::Rc;

use crate::change::ListChange;
use crate::notifier::Notifier;

/// A type tag declared by a section, meaningful only inside that section.
pub type LocalType = u32;

/// Stable item identifier; `None` is the "unset" id.
pub type StableId = Option<u64>;

/// Declared types of a section that only ever reports tag `0`.
pub const DEFAULT_TYPES: &[LocalType] = &[0];

/// One independently owned and updated run of items.
///
/// The joiner never inspects item content. It reads counts, types and ids,
/// and asks the section to [`materialize`](Section::materialize) an item when
/// the rendering surface needs it.
///
/// Changes must be reported through [`changes`](Section::changes) after the
/// section's own data has been updated, and without holding any borrow the
/// other methods need.
///
/// The joiner calls these methods while it rebuilds. They may read the joiner
/// (for example through a [`RealPositionResolver`](crate::RealPositionResolver))
/// but must not add or remove sections.
pub trait Section {
    /// What the rendering surface receives for an item.
    type Content;

    fn item_count(&self) -> usize;

    /// Every tag [`type_of`](Section::type_of) may return, in a fixed order.
    ///
    /// Must be non-empty and must not change while the section is registered.
    fn declared_types(&self) -> &[LocalType] {
        DEFAULT_TYPES
    }

    fn type_of(&self, real_index: usize) -> LocalType {
        let _ = real_index;
        self.declared_types()[0]
    }

    fn stable_id(&self, real_index: usize) -> StableId {
        let _ = real_index;
        None
    }

    fn materialize(&self, real_index: usize) -> Self::Content;

    /// Stream of changes in this section's own coordinates.
    fn changes(&self) -> &Notifier<ListChange>;
}

/// Shared handle to a registered section.
pub type SectionRef<C> = Rc<dyn Section<Content = C>>;

/// Identity of a section instance, derived from its allocation address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey(usize);

impl SectionKey {
    /// Works for both a concrete `Rc<S>` and the `SectionRef` it was coerced
    /// into, since both point at the same allocation.
    pub fn of<S: ?Sized>(section: &Rc<S>) -> Self {
        SectionKey(Rc::as_ptr(section) as *const () as usize)
    }
}
