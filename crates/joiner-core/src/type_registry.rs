//! Composite type ids for (section, local type) pairs.

use smallvec::SmallVec;

use crate::collections::map::HashMap;
use crate::section::{LocalType, SectionKey, SectionRef};

/// Globally unique item type within one structural generation.
pub type CompositeType = usize;

struct DeclaredTypes {
    first: CompositeType,
    tags: SmallVec<[LocalType; 4]>,
}

/// Assigns composite type ids by concatenating every section's declared
/// types in section order.
///
/// Ids are dense (`0..type_count()`) and only valid until the next
/// [`rebuild`](TypeRegistry::rebuild).
#[derive(Default)]
pub(crate) struct TypeRegistry {
    owners: Vec<(SectionKey, LocalType)>,
    sections: HashMap<SectionKey, DeclaredTypes>,
}

impl TypeRegistry {
    pub(crate) fn rebuild<'a, C: 'a>(&mut self, sections: impl IntoIterator<Item = &'a SectionRef<C>>) {
        self.owners.clear();
        self.sections.clear();
        for section in sections {
            let key = SectionKey::of(section);
            let first = self.owners.len();
            let tags: SmallVec<[LocalType; 4]> = section.declared_types().iter().copied().collect();
            debug_assert!(!tags.is_empty(), "section declared no item types");
            self.owners.extend(tags.iter().map(|tag| (key, *tag)));
            self.sections.insert(key, DeclaredTypes { first, tags });
        }
        log::debug!(
            "type registry rebuilt: {} sections, {} types",
            self.sections.len(),
            self.owners.len()
        );
    }

    /// Composite id for `local_type` of `section`, if the section declared it.
    pub(crate) fn composite_type(&self, section: SectionKey, local_type: LocalType) -> Option<CompositeType> {
        let declared = self.sections.get(&section)?;
        declared
            .tags
            .iter()
            .position(|tag| *tag == local_type)
            .map(|offset| declared.first + offset)
    }

    pub(crate) fn owner(&self, composite_type: CompositeType) -> Option<(SectionKey, LocalType)> {
        self.owners.get(composite_type).copied()
    }

    pub(crate) fn type_count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ListChange;
    use crate::notifier::Notifier;
    use crate::section::Section;
    use std::rc::Rc;

    struct Declared {
        tags: Vec<LocalType>,
        changes: Notifier<ListChange>,
    }

    impl Section for Declared {
        type Content = ();

        fn item_count(&self) -> usize {
            0
        }

        fn declared_types(&self) -> &[LocalType] {
            &self.tags
        }

        fn materialize(&self, _real_index: usize) {}

        fn changes(&self) -> &Notifier<ListChange> {
            &self.changes
        }
    }

    fn declared(tags: &[LocalType]) -> SectionRef<()> {
        Rc::new(Declared {
            tags: tags.to_vec(),
            changes: Notifier::new(),
        })
    }

    #[test]
    fn ids_follow_section_then_declaration_order() {
        let a = declared(&[10, 11]);
        let b = declared(&[0]);
        let mut registry = TypeRegistry::default();
        registry.rebuild([&a, &b]);

        assert_eq!(registry.composite_type(SectionKey::of(&a), 10), Some(0));
        assert_eq!(registry.composite_type(SectionKey::of(&a), 11), Some(1));
        assert_eq!(registry.composite_type(SectionKey::of(&b), 0), Some(2));
        assert_eq!(registry.owner(1), Some((SectionKey::of(&a), 11)));
        assert_eq!(registry.type_count(), 3);
    }

    #[test]
    fn undeclared_tag_has_no_id() {
        let a = declared(&[3]);
        let mut registry = TypeRegistry::default();
        registry.rebuild([&a]);

        assert_eq!(registry.composite_type(SectionKey::of(&a), 4), None);
        assert_eq!(registry.owner(1), None);
    }

    #[test]
    fn rebuild_renumbers_after_reorder() {
        let a = declared(&[1, 2]);
        let b = declared(&[7]);
        let mut registry = TypeRegistry::default();
        registry.rebuild([&a, &b]);
        registry.rebuild([&b, &a]);

        assert_eq!(registry.composite_type(SectionKey::of(&b), 7), Some(0));
        assert_eq!(registry.composite_type(SectionKey::of(&a), 1), Some(1));
        assert_eq!(registry.composite_type(SectionKey::of(&a), 2), Some(2));
    }
}
