//! Joins independently owned list sections into one virtualized list.
//!
//! A rendering surface sees a single list of `item_count()` slots. Behind it,
//! a [`Joiner`] keeps an ordered collection of [`Section`]s, each with its own
//! item count, item types and stable ids, and translates in both directions:
//!
//! - slot queries (type, id, content) are routed to the owning section;
//! - each section's local item types get a composite type id that is unique
//!   across the joined list;
//! - changes reported by a section in its own coordinates are re-emitted in
//!   composite coordinates ([`JoinedChange`]).
//!
//! # Architecture
//!
//! - [`Joiner`] - ordered section registry, add/remove, slot lookups
//! - [`JoinedSurface`] - what the rendering surface reads and subscribes to
//! - `TypeRegistry` - composite type ids, rebuilt on add/remove
//! - `PositionIndex` - slot table, rebuilt on every change
//! - `relay` - per-section subscription translating [`ListChange`]s
//!
//! Everything is single-threaded: the joiner, its sections and the rendering
//! surface must live on one thread, and changes are applied synchronously.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use joiner_core::{Joiner, ListSection, PlaceholderSection};
//!
//! let joiner = Joiner::new();
//! let header = Rc::new(PlaceholderSection::new(|| "Notes".to_string()));
//! let notes = Rc::new(ListSection::new(vec!["a", "b"], |_, note: &&str| note.to_string()));
//! joiner.add(header.clone())?;
//! joiner.add(notes.clone())?;
//!
//! let surface = joiner.surface();
//! let _subscription = surface.subscribe(|change| println!("{change:?}"));
//! notes.push("c"); // prints Inserted { start: 3, count: 1 }
//! ```

mod change;
mod collections;
mod error;
mod joiner;
mod notifier;
mod position_index;
mod relay;
mod resolver;
mod section;
pub mod sections;
mod surface;
mod type_registry;

pub use change::{JoinedChange, ListChange};
pub use error::JoinError;
pub use joiner::{Joiner, JoinerConfig, SlotInfo, TypeInfo};
pub use notifier::{Notifier, Subscription};
pub use resolver::RealPositionResolver;
pub use section::{LocalType, Section, SectionKey, SectionRef, StableId, DEFAULT_TYPES};
pub use sections::{ListSection, PlaceholderSection};
pub use surface::JoinedSurface;
pub use type_registry::CompositeType;
