//! Ready-made [`Section`](crate::Section) implementations.

mod list;
mod placeholder;

pub use list::ListSection;
pub use placeholder::PlaceholderSection;
