//! Change notifications in section-local and composite coordinates.

/// A change reported by a [`Section`](crate::Section), in the section's own
/// (real) coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListChange {
    /// Anything may have changed; no finer description is available.
    Reset,
    /// `count` items starting at `start` changed content (and maybe type or id).
    Changed { start: usize, count: usize },
    /// `count` items were inserted so that the first one is now at `start`.
    Inserted { start: usize, count: usize },
    /// `count` items that started at `start` were removed.
    Removed { start: usize, count: usize },
    /// `count` items were moved from `from` to `to`.
    Moved { from: usize, to: usize, count: usize },
}

impl ListChange {
    /// Whether applying this change can alter the number of items.
    pub fn changes_shape(&self) -> bool {
        matches!(
            self,
            ListChange::Reset | ListChange::Inserted { .. } | ListChange::Removed { .. }
        )
    }
}

/// A change emitted by the [`JoinedSurface`](crate::JoinedSurface), in
/// composite slot coordinates.
///
/// This is the usual diffable-list contract: there is no multi-item move, a
/// section moving more than one item is reported as [`JoinedChange::Reset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinedChange {
    Reset,
    Changed { start: usize, count: usize },
    Inserted { start: usize, count: usize },
    Removed { start: usize, count: usize },
    Moved { from: usize, to: usize },
}
