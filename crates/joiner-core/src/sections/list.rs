use std::cell::RefCell;

use smallvec::SmallVec;

use crate::change::ListChange;
use crate::notifier::Notifier;
use crate::section::{LocalType, Section, StableId, DEFAULT_TYPES};

type TypeFn<T> = Box<dyn Fn(&T) -> LocalType>;
type IdFn<T> = Box<dyn Fn(&T) -> u64>;
type ContentFn<T, C> = Box<dyn Fn(usize, &T) -> C>;

/// A section backed by its own `Vec<T>`.
///
/// Every mutation method updates the items first and then reports the
/// matching [`ListChange`], so a joiner relaying this section stays in sync
/// without further calls.
///
/// ```rust,ignore
/// let notes = Rc::new(
///     ListSection::new(vec![note], |_, note: &Note| note.title.clone())
///         .with_ids(|note| note.id),
/// );
/// joiner.add(notes.clone())?;
/// notes.push(another_note); // relayed as an insert
/// ```
pub struct ListSection<T, C> {
    items: RefCell<Vec<T>>,
    types: SmallVec<[LocalType; 4]>,
    type_of: Option<TypeFn<T>>,
    id_of: Option<IdFn<T>>,
    content: ContentFn<T, C>,
    changes: Notifier<ListChange>,
}

impl<T: 'static, C: 'static> ListSection<T, C> {
    /// Creates a single-type section; `content` turns an item (and its index)
    /// into what the rendering surface receives.
    pub fn new(items: Vec<T>, content: impl Fn(usize, &T) -> C + 'static) -> Self {
        Self {
            items: RefCell::new(items),
            types: DEFAULT_TYPES.iter().copied().collect(),
            type_of: None,
            id_of: None,
            content: Box::new(content),
            changes: Notifier::new(),
        }
    }

    /// Declares the section's item types. `type_of` must only return tags
    /// from `types`.
    ///
    /// # Panics
    ///
    /// Panics if `types` is empty.
    pub fn with_types(
        mut self,
        types: &[LocalType],
        type_of: impl Fn(&T) -> LocalType + 'static,
    ) -> Self {
        assert!(!types.is_empty(), "a section needs at least one item type");
        self.types = types.iter().copied().collect();
        self.type_of = Some(Box::new(type_of));
        self
    }

    pub fn with_ids(mut self, id_of: impl Fn(&T) -> u64 + 'static) -> Self {
        self.id_of = Some(Box::new(id_of));
        self
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }

    pub fn with_item<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.items.borrow().get(index).map(f)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.borrow().clone()
    }

    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(item);
            items.len() - 1
        };
        self.changes.notify(&ListChange::Inserted {
            start: index,
            count: 1,
        });
    }

    pub fn extend(&self, new_items: impl IntoIterator<Item = T>) {
        let (start, count) = {
            let mut items = self.items.borrow_mut();
            let start = items.len();
            items.extend(new_items);
            (start, items.len() - start)
        };
        if count > 0 {
            self.changes.notify(&ListChange::Inserted { start, count });
        }
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, item: T) {
        self.items.borrow_mut().insert(index, item);
        self.changes.notify(&ListChange::Inserted {
            start: index,
            count: 1,
        });
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.changes.notify(&ListChange::Removed {
                start: index,
                count: 1,
            });
        }
        removed
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        let previous = {
            let mut items = self.items.borrow_mut();
            items
                .get_mut(index)
                .map(|slot| std::mem::replace(slot, item))
        };
        if previous.is_some() {
            self.changes.notify(&ListChange::Changed {
                start: index,
                count: 1,
            });
        }
        previous
    }

    /// Edits the item at `index` in place. Returns `false` if there is none.
    pub fn update(&self, index: usize, f: impl FnOnce(&mut T)) -> bool {
        let updated = {
            let mut items = self.items.borrow_mut();
            items.get_mut(index).map(f).is_some()
        };
        if updated {
            self.changes.notify(&ListChange::Changed {
                start: index,
                count: 1,
            });
        }
        updated
    }

    /// Moves one item so that it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        {
            let mut items = self.items.borrow_mut();
            if from >= items.len() || to >= items.len() {
                return false;
            }
            let item = items.remove(from);
            items.insert(to, item);
        }
        if from != to {
            self.changes.notify(&ListChange::Moved { from, to, count: 1 });
        }
        true
    }

    /// Swaps in a whole new item list and reports a reset.
    pub fn replace_all(&self, items: Vec<T>) {
        *self.items.borrow_mut() = items;
        self.changes.notify(&ListChange::Reset);
    }

    pub fn clear(&self) {
        let count = std::mem::take(&mut *self.items.borrow_mut()).len();
        if count > 0 {
            self.changes
                .notify(&ListChange::Removed { start: 0, count });
        }
    }
}

impl<T: 'static, C: 'static> Section for ListSection<T, C> {
    type Content = C;

    fn item_count(&self) -> usize {
        self.items.borrow().len()
    }

    fn declared_types(&self) -> &[LocalType] {
        &self.types
    }

    fn type_of(&self, real_index: usize) -> LocalType {
        match (&self.type_of, self.items.borrow().get(real_index)) {
            (Some(type_of), Some(item)) => type_of(item),
            _ => self.types[0],
        }
    }

    fn stable_id(&self, real_index: usize) -> StableId {
        let id_of = self.id_of.as_ref()?;
        self.items.borrow().get(real_index).map(|item| id_of(item))
    }

    /// # Panics
    ///
    /// Panics if `real_index` is out of bounds.
    fn materialize(&self, real_index: usize) -> C {
        let items = self.items.borrow();
        (self.content)(real_index, &items[real_index])
    }

    fn changes(&self) -> &Notifier<ListChange> {
        &self.changes
    }
}

impl<T, C> std::fmt::Debug for ListSection<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListSection")
            .field("len", &self.items.borrow().len())
            .field("types", &self.types)
            .field("stable_ids", &self.id_of.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorded(section: &ListSection<u32, u32>) -> (Rc<RefCell<Vec<ListChange>>>, crate::Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subscription = {
            let log = Rc::clone(&log);
            section
                .changes()
                .subscribe(move |change| log.borrow_mut().push(*change))
        };
        (log, subscription)
    }

    #[test]
    fn mutations_report_matching_changes() {
        let section = ListSection::new(vec![1, 2, 3], |_, item: &u32| *item);
        let (log, _subscription) = recorded(&section);

        section.push(4);
        section.insert(0, 0);
        section.set(2, 20);
        section.remove(1);
        section.move_item(0, 3);
        section.clear();

        assert_eq!(
            *log.borrow(),
            vec![
                ListChange::Inserted { start: 3, count: 1 },
                ListChange::Inserted { start: 0, count: 1 },
                ListChange::Changed { start: 2, count: 1 },
                ListChange::Removed { start: 1, count: 1 },
                ListChange::Moved { from: 0, to: 3, count: 1 },
                ListChange::Removed { start: 0, count: 4 },
            ]
        );
    }

    #[test]
    fn invalid_edits_are_silent() {
        let section = ListSection::new(vec![1], |_, item: &u32| *item);
        let (log, _subscription) = recorded(&section);

        assert_eq!(section.remove(5), None);
        assert_eq!(section.set(1, 9), None);
        assert!(!section.move_item(0, 1));
        assert!(section.move_item(0, 0));
        section.extend(Vec::new());

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn types_and_ids_come_from_items() {
        let section = ListSection::new(vec![1u32, 2, 3], |_, item: &u32| *item)
            .with_types(&[10, 11], |item| if item % 2 == 0 { 11 } else { 10 })
            .with_ids(|item| u64::from(*item) * 100);

        assert_eq!(section.declared_types(), &[10, 11]);
        assert_eq!(section.type_of(1), 11);
        assert_eq!(section.type_of(2), 10);
        assert_eq!(section.stable_id(2), Some(300));
        assert_eq!(section.materialize(0), 1);
    }

    #[test]
    fn observer_can_read_items_during_notification() {
        let section = Rc::new(ListSection::new(vec![1u32], |_, item: &u32| *item));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let reader = Rc::clone(&section);
            let seen = Rc::clone(&seen);
            section
                .changes()
                .subscribe(move |_| seen.borrow_mut().push(reader.item_count()))
        };

        section.push(2);
        section.replace_all(vec![7, 8, 9]);

        assert_eq!(*seen.borrow(), vec![2, 3]);
    }
}
