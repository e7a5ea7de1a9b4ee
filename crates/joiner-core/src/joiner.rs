//! The registry of joined sections and its public API.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::change::{JoinedChange, ListChange};
use crate::error::JoinError;
use crate::notifier::{Notifier, Subscription};
use crate::position_index::{PositionIndex, SlotEntry};
use crate::relay;
use crate::section::{LocalType, Section, SectionKey, SectionRef};
use crate::surface::JoinedSurface;
use crate::type_registry::{CompositeType, TypeRegistry};

/// Joiner behaviour switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoinerConfig {
    /// Subscribe to every added section and relay its changes automatically.
    /// When off, forward changes with [`Joiner::dispatch`] or [`Joiner::refresh`].
    pub auto_relay: bool,
    /// Report sections' stable ids from [`JoinedSurface::id_at`].
    pub stable_ids: bool,
}

impl Default for JoinerConfig {
    fn default() -> Self {
        Self {
            auto_relay: true,
            stable_ids: true,
        }
    }
}

impl JoinerConfig {
    pub fn auto_relay(mut self, enabled: bool) -> Self {
        self.auto_relay = enabled;
        self
    }

    pub fn stable_ids(mut self, enabled: bool) -> Self {
        self.stable_ids = enabled;
        self
    }
}

/// What backs one composite slot.
///
/// Taken in one generation of the slot table; check
/// [`is_current`](SlotInfo::is_current) before trusting it after the joiner
/// may have changed.
#[derive(Clone)]
pub struct SlotInfo<C> {
    pub slot: usize,
    pub real_index: usize,
    pub section: SectionRef<C>,
    pub composite_type: CompositeType,
    pub local_type: LocalType,
    generation: u64,
}

impl<C: 'static> SlotInfo<C> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, joiner: &Joiner<C>) -> bool {
        joiner.generation() == self.generation
    }
}

impl<C> std::fmt::Debug for SlotInfo<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotInfo")
            .field("slot", &self.slot)
            .field("real_index", &self.real_index)
            .field("section", &SectionKey::of(&self.section))
            .field("composite_type", &self.composite_type)
            .field("local_type", &self.local_type)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Owner of a composite type id.
#[derive(Clone)]
pub struct TypeInfo<C> {
    pub composite_type: CompositeType,
    pub section: SectionRef<C>,
    pub local_type: LocalType,
}

impl<C> std::fmt::Debug for TypeInfo<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("composite_type", &self.composite_type)
            .field("section", &SectionKey::of(&self.section))
            .field("local_type", &self.local_type)
            .finish()
    }
}

struct Registration<C> {
    section: SectionRef<C>,
    _relay: Option<Subscription>,
}

struct JoinerState<C> {
    registrations: Vec<Registration<C>>,
    types: TypeRegistry,
    index: PositionIndex,
}

impl<C> JoinerState<C> {
    fn position_of(&self, key: SectionKey) -> Option<usize> {
        self.registrations
            .iter()
            .position(|registration| SectionKey::of(&registration.section) == key)
    }

    fn locate(&self, slot: usize) -> Result<(SectionRef<C>, SlotEntry), JoinError> {
        let entry = self.index.entry(slot).ok_or(JoinError::OutOfRange {
            slot,
            item_count: self.index.len(),
        })?;
        let section = Rc::clone(&self.registrations[entry.section].section);
        Ok((section, *entry))
    }
}

/// State shared by the [`Joiner`], its [`JoinedSurface`] handles and the
/// per-section relays.
pub(crate) struct Shared<C> {
    config: JoinerConfig,
    state: RefCell<JoinerState<C>>,
    changes: Notifier<JoinedChange>,
}

impl<C: 'static> Shared<C> {
    pub(crate) fn config(&self) -> JoinerConfig {
        self.config
    }

    pub(crate) fn changes(&self) -> &Notifier<JoinedChange> {
        &self.changes
    }

    pub(crate) fn item_count(&self) -> usize {
        self.state.borrow().index.len()
    }

    pub(crate) fn locate(&self, slot: usize) -> Result<(SectionRef<C>, SlotEntry), JoinError> {
        self.state.borrow().locate(slot)
    }

    pub(crate) fn slot_info(&self, slot: usize) -> Option<SlotInfo<C>> {
        let state = self.state.borrow();
        let (section, entry) = state.locate(slot).ok()?;
        Some(SlotInfo {
            slot,
            real_index: entry.real_index,
            section,
            composite_type: entry.composite_type,
            local_type: entry.local_type,
            generation: state.index.generation(),
        })
    }

    pub(crate) fn type_info(&self, composite_type: CompositeType) -> Option<TypeInfo<C>> {
        let state = self.state.borrow();
        let (key, local_type) = state.types.owner(composite_type)?;
        let position = state.position_of(key)?;
        Some(TypeInfo {
            composite_type,
            section: Rc::clone(&state.registrations[position].section),
            local_type,
        })
    }

    /// Re-reads every section and installs the new tables. With `structure`
    /// set, composite types are renumbered first.
    ///
    /// Sections are only called under a shared borrow, so they may read the
    /// joiner while it rebuilds; they see the previous generation.
    fn rebuild(&self, structure: bool) {
        let (types, index) = {
            let state = self.state.borrow();
            let sections = || state.registrations.iter().map(|registration| &registration.section);
            let types = structure.then(|| {
                let mut types = TypeRegistry::default();
                types.rebuild(sections());
                types
            });
            let mut index = state.index.successor();
            index.rebuild(sections(), types.as_ref().unwrap_or(&state.types));
            (types, index)
        };
        let mut state = self.state.borrow_mut();
        if let Some(types) = types {
            state.types = types;
        }
        state.index = index;
    }

    /// Translates one section change, rebuilds the slot table and re-emits
    /// the change in composite coordinates.
    pub(crate) fn relay(&self, key: SectionKey, change: ListChange) {
        let Some(span) = self.state.borrow().index.span(key) else {
            log::trace!("ignoring {change:?} from unregistered section {key:?}");
            return;
        };
        let Some(joined) = relay::translate(span, change) else {
            return;
        };
        self.rebuild(false);
        log::trace!("relaying {change:?} from {key:?} as {joined:?}");
        self.changes.notify(&joined);
    }
}

/// Presents an ordered collection of sections as one list.
///
/// Add sections with [`add`](Joiner::add), hand [`surface`](Joiner::surface)
/// to the rendering side, and keep using the joiner to translate between
/// composite slots and section positions.
///
/// ```rust,ignore
/// let joiner = Joiner::new();
/// joiner.add(header)?;
/// joiner.add(notes)?;
/// let surface = joiner.surface();
/// let _subscription = surface.subscribe(|change| list_view.apply(change));
/// ```
///
/// All work happens on the calling thread; relayed changes are applied
/// synchronously inside the section's notification.
pub struct Joiner<C: 'static> {
    shared: Rc<Shared<C>>,
}

impl<C: 'static> Joiner<C> {
    pub fn new() -> Self {
        Self::with_config(JoinerConfig::default())
    }

    pub fn with_config(config: JoinerConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                config,
                state: RefCell::new(JoinerState {
                    registrations: Vec::new(),
                    types: TypeRegistry::default(),
                    index: PositionIndex::default(),
                }),
                changes: Notifier::new(),
            }),
        }
    }

    pub fn config(&self) -> JoinerConfig {
        self.shared.config
    }

    pub fn section_count(&self) -> usize {
        self.shared.state.borrow().registrations.len()
    }

    pub fn item_count(&self) -> usize {
        self.shared.item_count()
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared<C>> {
        Rc::downgrade(&self.shared)
    }

    /// Incremented by every rebuild of the slot table.
    pub fn generation(&self) -> u64 {
        self.shared.state.borrow().index.generation()
    }

    /// Registered sections in order.
    pub fn sections(&self) -> Vec<SectionRef<C>> {
        self.shared
            .state
            .borrow()
            .registrations
            .iter()
            .map(|registration| Rc::clone(&registration.section))
            .collect()
    }

    pub fn contains<S>(&self, section: &Rc<S>) -> bool
    where
        S: Section<Content = C> + ?Sized,
    {
        self.shared
            .state
            .borrow()
            .position_of(SectionKey::of(section))
            .is_some()
    }

    /// Appends `section`. See [`add_at`](Joiner::add_at).
    pub fn add(&self, section: SectionRef<C>) -> Result<(), JoinError> {
        let location = self.section_count();
        self.add_at(location, section)
    }

    /// Inserts `section` so that it becomes the `location`-th section.
    ///
    /// Renumbers every composite type and emits
    /// [`JoinedChange::Inserted`] for the section's items.
    pub fn add_at(&self, location: usize, section: SectionRef<C>) -> Result<(), JoinError> {
        let key = SectionKey::of(&section);
        {
            let state = self.shared.state.borrow();
            if state.position_of(key).is_some() {
                return Err(JoinError::DuplicateSection);
            }
            let section_count = state.registrations.len();
            if location > section_count {
                return Err(JoinError::LocationOutOfBounds {
                    location,
                    section_count,
                });
            }
        }
        check_declared_types(&section)?;

        let subscription = self
            .shared
            .config
            .auto_relay
            .then(|| relay::attach(&self.shared, &section));
        self.shared.state.borrow_mut().registrations.insert(
            location,
            Registration {
                section,
                _relay: subscription,
            },
        );
        self.shared.rebuild(true);
        let span = self.shared.state.borrow().index.span(key).unwrap_or_default();
        log::debug!(
            "added section {key:?} at {location}: slots {}..{}",
            span.start,
            span.end
        );
        if !span.is_empty() {
            self.shared.changes.notify(&JoinedChange::Inserted {
                start: span.start,
                count: span.len(),
            });
        }
        Ok(())
    }

    /// Unregisters `section` and emits [`JoinedChange::Removed`] for the
    /// slots it occupied. Returns `false` if it was not registered.
    pub fn remove<S>(&self, section: &Rc<S>) -> bool
    where
        S: Section<Content = C> + ?Sized,
    {
        let key = SectionKey::of(section);
        let (registration, span) = {
            let mut state = self.shared.state.borrow_mut();
            let Some(position) = state.position_of(key) else {
                return false;
            };
            let span = state.index.span(key).unwrap_or_default();
            (state.registrations.remove(position), span)
        };
        self.shared.rebuild(true);
        drop(registration);
        log::debug!("removed section {key:?}: slots {}..{}", span.start, span.end);
        if !span.is_empty() {
            self.shared.changes.notify(&JoinedChange::Removed {
                start: span.start,
                count: span.len(),
            });
        }
        true
    }

    /// What backs `slot`, or `None` outside `[0, item_count)`.
    pub fn slot_info(&self, slot: usize) -> Option<SlotInfo<C>> {
        self.shared.slot_info(slot)
    }

    /// Composite slot of `section`'s item `real_index`, or `None` if the
    /// section is not registered or has no such item.
    pub fn composite_position<S>(&self, section: &Rc<S>, real_index: usize) -> Option<usize>
    where
        S: Section<Content = C> + ?Sized,
    {
        self.shared
            .state
            .borrow()
            .index
            .composite_position(SectionKey::of(section), real_index)
    }

    pub fn type_info(&self, composite_type: CompositeType) -> Option<TypeInfo<C>> {
        self.shared.type_info(composite_type)
    }

    pub fn type_count(&self) -> usize {
        self.shared.state.borrow().types.type_count()
    }

    /// Forwards a change of `section` as if its relay had received it.
    ///
    /// Meant for joiners built without `auto_relay`. Returns `false` if the
    /// section is not registered.
    pub fn dispatch<S>(&self, section: &Rc<S>, change: ListChange) -> bool
    where
        S: Section<Content = C> + ?Sized,
    {
        if !self.contains(section) {
            return false;
        }
        self.shared.relay(SectionKey::of(section), change);
        true
    }

    /// Re-reads every section and emits [`JoinedChange::Reset`].
    pub fn refresh(&self) {
        self.shared.rebuild(true);
        self.shared.changes.notify(&JoinedChange::Reset);
    }

    /// The list-shaped view handed to the rendering surface.
    pub fn surface(&self) -> JoinedSurface<C> {
        JoinedSurface::new(Rc::clone(&self.shared))
    }

    /// Shorthand for `self.surface().subscribe(observer)`.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe(&self, observer: impl Fn(&JoinedChange) + 'static) -> Subscription {
        self.shared.changes.subscribe(observer)
    }
}

impl<C: 'static> Default for Joiner<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> std::fmt::Debug for Joiner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Joiner")
            .field("config", &self.shared.config)
            .field("sections", &state.registrations.len())
            .field("items", &state.index.len())
            .field("types", &state.types.type_count())
            .field("generation", &state.index.generation())
            .finish()
    }
}

fn check_declared_types<C>(section: &SectionRef<C>) -> Result<(), JoinError> {
    let declared = section.declared_types();
    if declared.is_empty() {
        return Err(JoinError::NoDeclaredTypes);
    }
    for real_index in 0..section.item_count() {
        let local_type = section.type_of(real_index);
        if !declared.contains(&local_type) {
            return Err(JoinError::UndeclaredType {
                local_type,
                real_index,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/joiner_tests.rs"]
mod tests;
