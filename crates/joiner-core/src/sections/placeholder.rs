use std::cell::Cell;

use crate::change::ListChange;
use crate::notifier::Notifier;
use crate::section::{LocalType, Section, StableId};

/// A section made of one static slot, such as a header or a divider.
///
/// The slot can be hidden and shown again; the section then reports a
/// one-item removal or insertion.
pub struct PlaceholderSection<C> {
    local_type: [LocalType; 1],
    stable_id: StableId,
    visible: Cell<bool>,
    content: Box<dyn Fn() -> C>,
    changes: Notifier<ListChange>,
}

impl<C: 'static> PlaceholderSection<C> {
    /// A visible slot of type `0` without a stable id.
    pub fn new(content: impl Fn() -> C + 'static) -> Self {
        Self {
            local_type: [0],
            stable_id: None,
            visible: Cell::new(true),
            content: Box::new(content),
            changes: Notifier::new(),
        }
    }

    pub fn with_type(mut self, local_type: LocalType) -> Self {
        self.local_type = [local_type];
        self
    }

    pub fn with_stable_id(mut self, id: u64) -> Self {
        self.stable_id = Some(id);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) == visible {
            return;
        }
        let change = if visible {
            ListChange::Inserted { start: 0, count: 1 }
        } else {
            ListChange::Removed { start: 0, count: 1 }
        };
        self.changes.notify(&change);
    }
}

impl<C: 'static> Section for PlaceholderSection<C> {
    type Content = C;

    fn item_count(&self) -> usize {
        usize::from(self.visible.get())
    }

    fn declared_types(&self) -> &[LocalType] {
        &self.local_type
    }

    fn type_of(&self, _real_index: usize) -> LocalType {
        self.local_type[0]
    }

    fn stable_id(&self, _real_index: usize) -> StableId {
        self.stable_id
    }

    fn materialize(&self, _real_index: usize) -> C {
        (self.content)()
    }

    fn changes(&self) -> &Notifier<ListChange> {
        &self.changes
    }
}

impl<C> std::fmt::Debug for PlaceholderSection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderSection")
            .field("local_type", &self.local_type[0])
            .field("stable_id", &self.stable_id)
            .field("visible", &self.visible.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn toggling_visibility_reports_single_slot_changes() {
        let header = PlaceholderSection::new(|| "header").with_type(5);
        let log = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let log = Rc::clone(&log);
            header
                .changes()
                .subscribe(move |change| log.borrow_mut().push(*change))
        };

        header.set_visible(false);
        header.set_visible(false);
        assert_eq!(header.item_count(), 0);
        header.set_visible(true);

        assert_eq!(
            *log.borrow(),
            vec![
                ListChange::Removed { start: 0, count: 1 },
                ListChange::Inserted { start: 0, count: 1 },
            ]
        );
        assert_eq!(header.item_count(), 1);
        assert_eq!(header.type_of(0), 5);
        assert_eq!(header.materialize(0), "header");
    }
}
