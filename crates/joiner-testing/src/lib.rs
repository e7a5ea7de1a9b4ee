//! Testing utilities for joined lists.
//!
//! - [`ChangeRecorder`] collects the composite change stream.
//! - [`SurfaceMirror`] plays the rendering surface: it applies every composite
//!   change to its own copy of the list, so a test can check that the changes
//!   alone reproduce what the surface reports.
//! - [`assert_consistent`] checks the joiner's indexing laws.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use joiner_core::{JoinedChange, JoinedSurface, Joiner, SectionKey, Subscription};

/// Records every [`JoinedChange`] emitted by a surface.
pub struct ChangeRecorder {
    log: Rc<RefCell<Vec<JoinedChange>>>,
    _subscription: Subscription,
}

impl ChangeRecorder {
    pub fn attach<C: 'static>(surface: &JoinedSurface<C>) -> Self {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subscription = {
            let log = Rc::clone(&log);
            surface.subscribe(move |change| log.borrow_mut().push(*change))
        };
        Self {
            log,
            _subscription: subscription,
        }
    }

    /// Changes recorded so far, oldest first.
    pub fn changes(&self) -> Vec<JoinedChange> {
        self.log.borrow().clone()
    }

    /// Returns and forgets the recorded changes.
    pub fn take(&self) -> Vec<JoinedChange> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

/// A list kept up to date only through composite changes.
///
/// Inserted and changed slots are materialized from the surface when the
/// change arrives; removed and moved slots are shuffled locally. A reset
/// re-reads everything.
pub struct SurfaceMirror<C: 'static> {
    surface: JoinedSurface<C>,
    items: Rc<RefCell<Vec<C>>>,
    resets: Rc<RefCell<usize>>,
    _subscription: Subscription,
}

impl<C: Clone + PartialEq + Debug + 'static> SurfaceMirror<C> {
    pub fn attach(surface: &JoinedSurface<C>) -> Self {
        let items = Rc::new(RefCell::new(read_all(surface)));
        let resets = Rc::new(RefCell::new(0));
        let subscription = {
            let items = Rc::clone(&items);
            let resets = Rc::clone(&resets);
            let reader = surface.clone();
            surface.subscribe(move |change| {
                if matches!(change, JoinedChange::Reset) {
                    *resets.borrow_mut() += 1;
                }
                apply(&reader, &mut items.borrow_mut(), *change);
            })
        };
        Self {
            surface: surface.clone(),
            items,
            resets,
            _subscription: subscription,
        }
    }

    pub fn items(&self) -> Vec<C> {
        self.items.borrow().clone()
    }

    /// Number of resets received, i.e. how often incremental updates were
    /// given up.
    pub fn reset_count(&self) -> usize {
        *self.resets.borrow()
    }

    /// Panics unless the mirrored list equals what the surface reports now.
    pub fn assert_in_sync(&self) {
        let expected = read_all(&self.surface);
        assert_eq!(
            *self.items.borrow(),
            expected,
            "mirror diverged from surface"
        );
    }
}

fn read_all<C>(surface: &JoinedSurface<C>) -> Vec<C> {
    (0..surface.item_count())
        .map(|slot| match surface.content_at(slot) {
            Ok(content) => content,
            Err(error) => panic!("surface failed to read slot {slot}: {error}"),
        })
        .collect()
}

fn read<C>(surface: &JoinedSurface<C>, slot: usize) -> C {
    match surface.content_at(slot) {
        Ok(content) => content,
        Err(error) => panic!("change referenced unreadable slot {slot}: {error}"),
    }
}

fn apply<C>(surface: &JoinedSurface<C>, items: &mut Vec<C>, change: JoinedChange) {
    log::trace!("mirror applying {change:?}");
    match change {
        JoinedChange::Reset => *items = read_all(surface),
        JoinedChange::Changed { start, count } => {
            for slot in start..start + count {
                items[slot] = read(surface, slot);
            }
        }
        JoinedChange::Inserted { start, count } => {
            let inserted: Vec<C> = (start..start + count)
                .map(|slot| read(surface, slot))
                .collect();
            items.splice(start..start, inserted);
        }
        JoinedChange::Removed { start, count } => {
            items.drain(start..start + count);
        }
        JoinedChange::Moved { from, to } => {
            let item = items.remove(from);
            items.insert(to, item);
        }
    }
}

/// Checks the joiner's indexing laws:
///
/// - the item count is the sum of the sections' item counts;
/// - every slot round-trips through `slot_info` and `composite_position`;
/// - every slot's composite type belongs to its section and local type;
/// - composite types form the dense range `0..type_count()`.
pub fn assert_consistent<C: 'static>(joiner: &Joiner<C>) {
    let sections = joiner.sections();
    let total: usize = sections.iter().map(|section| section.item_count()).sum();
    assert_eq!(joiner.item_count(), total, "item count is not the sum of sections");
    assert_eq!(joiner.surface().item_count(), total);

    for slot in 0..joiner.item_count() {
        let info = joiner
            .slot_info(slot)
            .unwrap_or_else(|| panic!("slot {slot} has no info"));
        assert_eq!(info.slot, slot);
        assert_eq!(
            joiner.composite_position(&info.section, info.real_index),
            Some(slot),
            "slot {slot} does not round-trip"
        );
        assert_eq!(info.local_type, info.section.type_of(info.real_index));
        let owner = joiner
            .type_info(info.composite_type)
            .unwrap_or_else(|| panic!("composite type {} has no owner", info.composite_type));
        assert_eq!(SectionKey::of(&owner.section), SectionKey::of(&info.section));
        assert_eq!(owner.local_type, info.local_type);
    }
    assert!(joiner.slot_info(joiner.item_count()).is_none());

    let declared: usize = sections
        .iter()
        .map(|section| section.declared_types().len())
        .sum();
    assert_eq!(joiner.type_count(), declared);
    for composite_type in 0..declared {
        assert!(joiner.type_info(composite_type).is_some());
    }
    assert!(joiner.type_info(declared).is_none());
}
