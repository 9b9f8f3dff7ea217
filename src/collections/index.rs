//! Lazily built key to position index
//!
//! Small collections resolve keys by scanning. Once a collection reaches its
//! threshold the index is built in one pass and then kept in step with every
//! mutation. It is never dropped afterwards, even if the collection shrinks.

use super::element::{Element, Slot};
use hashbrown::HashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct LazyIndex {
    map: Option<HashMap<String, usize>>,
}

impl LazyIndex {
    #[inline]
    pub(crate) fn is_built(&self) -> bool {
        self.map.is_some()
    }

    /// Number of registered keys; zero while unbuilt.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.as_ref().map_or(0, HashMap::len)
    }

    /// Build (or rebuild) from scratch over `slots`.
    pub(crate) fn build<T: Element>(&mut self, slots: &[Slot<T>]) {
        let mut map = HashMap::with_capacity(slots.len());
        for (pos, slot) in slots.iter().enumerate() {
            if let Slot::Present(value) = slot {
                map.insert(value.key().to_owned(), pos);
            }
        }
        self.map = Some(map);
    }

    /// Build only if `len` has reached `threshold` and no index exists yet.
    /// Returns whether a build happened.
    pub(crate) fn build_if_due<T: Element>(
        &mut self,
        slots: &[Slot<T>],
        threshold: usize,
    ) -> bool {
        if self.is_built() || slots.len() < threshold {
            return false;
        }
        self.build(slots);
        true
    }

    /// Start with an empty index, used when a capacity hint is already at the
    /// threshold.
    pub(crate) fn build_empty(&mut self, capacity: usize) {
        if self.map.is_none() {
            self.map = Some(HashMap::with_capacity(capacity));
        }
    }

    /// Position of `key`, through the map when built, by scanning otherwise.
    pub(crate) fn position<T: Element>(&self, key: &str, slots: &[Slot<T>]) -> Option<usize> {
        match &self.map {
            Some(map) => map.get(key).copied(),
            None => slots.iter().position(|slot| slot.key() == Some(key)),
        }
    }

    #[inline]
    pub(crate) fn register(&mut self, key: &str, pos: usize) {
        if let Some(map) = &mut self.map {
            map.insert(key.to_owned(), pos);
        }
    }

    #[inline]
    pub(crate) fn unregister(&mut self, key: &str) {
        if let Some(map) = &mut self.map {
            map.remove(key);
        }
    }

    /// Account for the slot at `removed` having been taken out of the
    /// sequence: every later position moves down by one.
    pub(crate) fn shift_down_after(&mut self, removed: usize) {
        if let Some(map) = &mut self.map {
            for pos in map.values_mut() {
                if *pos > removed {
                    *pos -= 1;
                }
            }
        }
    }

    /// Drop every entry but keep the index itself.
    pub(crate) fn clear(&mut self) {
        if let Some(map) = &mut self.map {
            map.clear();
        }
    }

    /// Check the index agrees with `slots`.
    #[cfg(test)]
    pub(crate) fn is_consistent<T: Element>(&self, slots: &[Slot<T>]) -> bool {
        let Some(map) = &self.map else {
            return true;
        };
        let present = slots.iter().filter(|slot| slot.is_present()).count();
        present == map.len()
            && slots.iter().enumerate().all(|(pos, slot)| match slot.key() {
                Some(key) => map.get(key) == Some(&pos),
                None => true,
            })
    }
}
