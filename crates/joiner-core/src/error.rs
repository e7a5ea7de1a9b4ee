use crate::section::LocalType;

/// Errors reported by [`Joiner`](crate::Joiner) mutations and
/// [`JoinedSurface`](crate::JoinedSurface) queries.
///
/// Lookups that may legitimately miss (`slot_info`, `composite_position`,
/// `type_info`) return `Option` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// The same section instance is already registered.
    DuplicateSection,
    /// `add_at` was given a location past the end of the section list.
    LocationOutOfBounds {
        location: usize,
        section_count: usize,
    },
    /// A section declared no item types at all.
    NoDeclaredTypes,
    /// A section reported an item type it did not declare.
    UndeclaredType {
        local_type: LocalType,
        real_index: usize,
    },
    /// A composite slot outside `[0, item_count)` was queried.
    OutOfRange { slot: usize, item_count: usize },
}

impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinError::DuplicateSection => write!(f, "section is already registered"),
            JoinError::LocationOutOfBounds {
                location,
                section_count,
            } => write!(
                f,
                "location {location} out of bounds for {section_count} sections"
            ),
            JoinError::NoDeclaredTypes => write!(f, "section declares no item types"),
            JoinError::UndeclaredType {
                local_type,
                real_index,
            } => write!(
                f,
                "item {real_index} reports type {local_type} which its section did not declare"
            ),
            JoinError::OutOfRange { slot, item_count } => {
                write!(f, "slot {slot} out of range for {item_count} items")
            }
        }
    }
}

impl std::error::Error for JoinError {}
