//! Translation of section-local changes into composite changes.
//!
//! A section's items occupy one contiguous run of composite slots starting at
//! the section's span start. The span start only depends on the sections
//! *before* it, so a change reported by the section itself never moves it:
//! translating against the index built before the change is exact, including
//! removals (old positions) and appends (one past the old end). The index is
//! rebuilt right after translation so that later reads see the new shape.

use std::ops::Range;
use std::rc::Rc;

use crate::change::{JoinedChange, ListChange};
use crate::joiner::Shared;
use crate::notifier::Subscription;
use crate::section::{SectionKey, SectionRef};

/// Maps `change` from a section whose slots were `span` before the change.
///
/// Returns `None` for empty changes. Changes that do not fit the section's
/// previous size, and moves of more than one item, become a full reset.
pub(crate) fn translate(span: Range<usize>, change: ListChange) -> Option<JoinedChange> {
    let len = span.len();
    let base = span.start;
    let translated = match change {
        ListChange::Reset => JoinedChange::Reset,
        ListChange::Changed { count: 0, .. }
        | ListChange::Inserted { count: 0, .. }
        | ListChange::Removed { count: 0, .. }
        | ListChange::Moved { count: 0, .. } => return None,
        ListChange::Changed { start, count } if fits(start, count, len) => JoinedChange::Changed {
            start: base + start,
            count,
        },
        ListChange::Inserted { start, count } if start <= len => JoinedChange::Inserted {
            start: base + start,
            count,
        },
        ListChange::Removed { start, count } if fits(start, count, len) => JoinedChange::Removed {
            start: base + start,
            count,
        },
        ListChange::Moved { from, to, count: 1 } if from < len && to < len => JoinedChange::Moved {
            from: base + from,
            to: base + to,
        },
        ListChange::Moved { .. } => JoinedChange::Reset,
        other => {
            log::warn!(
                "change {other:?} does not fit a section of {len} items; relaying a reset"
            );
            JoinedChange::Reset
        }
    };
    Some(translated)
}

fn fits(start: usize, count: usize, len: usize) -> bool {
    start.checked_add(count).is_some_and(|end| end <= len)
}

/// Subscribes the joiner to `section`'s changes for as long as the returned
/// subscription lives.
///
/// The relay only holds a weak reference to the joiner, so a dropped joiner
/// simply stops receiving changes.
pub(crate) fn attach<C: 'static>(shared: &Rc<Shared<C>>, section: &SectionRef<C>) -> Subscription {
    let joiner = Rc::downgrade(shared);
    let key = SectionKey::of(section);
    section.changes().subscribe(move |change| {
        if let Some(shared) = joiner.upgrade() {
            shared.relay(key, *change);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_range_is_offset_by_span_start() {
        assert_eq!(
            translate(3..5, ListChange::Changed { start: 1, count: 1 }),
            Some(JoinedChange::Changed { start: 4, count: 1 })
        );
    }

    #[test]
    fn insert_at_end_of_section_is_translated() {
        assert_eq!(
            translate(3..5, ListChange::Inserted { start: 2, count: 3 }),
            Some(JoinedChange::Inserted { start: 5, count: 3 })
        );
    }

    #[test]
    fn insert_into_empty_section_uses_span_start() {
        assert_eq!(
            translate(4..4, ListChange::Inserted { start: 0, count: 1 }),
            Some(JoinedChange::Inserted { start: 4, count: 1 })
        );
    }

    #[test]
    fn removal_uses_previous_positions() {
        assert_eq!(
            translate(2..6, ListChange::Removed { start: 1, count: 3 }),
            Some(JoinedChange::Removed { start: 3, count: 3 })
        );
    }

    #[test]
    fn single_move_is_kept_and_wider_moves_reset() {
        assert_eq!(
            translate(0..3, ListChange::Moved { from: 0, to: 2, count: 1 }),
            Some(JoinedChange::Moved { from: 0, to: 2 })
        );
        assert_eq!(
            translate(0..3, ListChange::Moved { from: 0, to: 1, count: 2 }),
            Some(JoinedChange::Reset)
        );
    }

    #[test]
    fn empty_changes_are_dropped() {
        assert_eq!(translate(0..3, ListChange::Changed { start: 0, count: 0 }), None);
        assert_eq!(translate(0..3, ListChange::Moved { from: 0, to: 1, count: 0 }), None);
    }

    #[test]
    fn out_of_bounds_changes_degrade_to_reset() {
        assert_eq!(
            translate(0..3, ListChange::Removed { start: 2, count: 2 }),
            Some(JoinedChange::Reset)
        );
        assert_eq!(
            translate(0..3, ListChange::Inserted { start: 4, count: 1 }),
            Some(JoinedChange::Reset)
        );
        assert_eq!(
            translate(0..3, ListChange::Changed { start: usize::MAX, count: 2 }),
            Some(JoinedChange::Reset)
        );
    }
}
