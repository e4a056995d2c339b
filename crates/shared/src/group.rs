use std::collections::HashMap;

use crate::models::{Bounds, Station};
use crate::state::MarkerState;

/// A live marker: the station it shows, its visual state and whatever handle
/// the map surface returned when it drew it.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker<H> {
    pub station: Station,
    pub state: MarkerState,
    pub handle: H,
}

impl<H> Marker<H> {
    pub fn new(station: Station, handle: H) -> Self {
        Self {
            station,
            state: MarkerState::Default,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.station.name
    }
}

/// Markers keyed by station name, iterated in insertion order.
///
/// The group never holds two markers for the same name: inserting an existing
/// name hands the previous marker back so the caller can take it off the map.
/// Lookups go through a name index; removals leave a hole that is compacted
/// once holes outnumber live markers.
#[derive(Debug, Clone)]
pub struct MarkerGroup<H> {
    slots: Vec<Option<Marker<H>>>,
    index: HashMap<String, usize>,
}

impl<H> Default for MarkerGroup<H> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<H> MarkerGroup<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Marker<H>> {
        let idx = *self.index.get(name)?;
        self.slots[idx].as_ref()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Marker<H>> {
        let idx = *self.index.get(name)?;
        self.slots[idx].as_mut()
    }

    /// Insert a marker, returning the one it replaces. A replacement keeps
    /// the old marker's place in the order.
    pub fn insert(&mut self, marker: Marker<H>) -> Option<Marker<H>> {
        match self.index.get(marker.name()) {
            Some(&idx) => self.slots[idx].replace(marker),
            None => {
                self.index.insert(marker.name().to_string(), self.slots.len());
                self.slots.push(Some(marker));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Marker<H>> {
        let idx = self.index.remove(name)?;
        let marker = self.slots[idx].take();
        if self.slots.len() > 2 * self.index.len() + 16 {
            self.compact();
        }
        marker
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        for (idx, marker) in self.slots.iter().flatten().enumerate() {
            if let Some(slot) = self.index.get_mut(marker.name()) {
                *slot = idx;
            }
        }
    }

    /// Take every marker out, leaving the group empty.
    pub fn drain(&mut self) -> impl Iterator<Item = Marker<H>> + '_ {
        self.index.clear();
        self.slots.drain(..).flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker<H>> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Marker<H>> {
        self.slots.iter_mut().flatten()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(Marker::name)
    }

    /// Bounding box of every live marker.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.iter().map(|m| m.station.position))
    }
}
