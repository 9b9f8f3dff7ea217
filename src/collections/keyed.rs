// -----------------------------------------------------------------------------
// src/collections/keyed.rs
// -----------------------------------------------------------------------------

use super::element::{Element, Slot, TypeTag};
use super::index::LazyIndex;
use crate::config::{self, CollectionConfig, Mode};
use crate::error::{CollectionError, Result};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::cmp::Ordering;
use std::fmt;

/// An ordered sequence of elements that can also be looked up by key.
///
/// `KeyedCollection` keeps insertion order like a `Vec` and resolves keys like
/// a map. Lookups scan the sequence until the collection reaches its index
/// threshold (32 by default, see [`config`](crate::config)); from then on a hash
/// index maps keys to positions and is maintained on every mutation.
///
/// ### Homogeneity
/// Every present element must share one concrete type. For a concrete `T`
/// that holds trivially. For type-erased elements such as `Box<dyn Element>`
/// the type of the first inserted element is recorded and later inserts of a
/// different concrete type fail with [`CollectionError::TypeMismatch`].
///
/// ### Placeholders
/// [`Slot::Empty`] reserves a position without a key. Placeholders are never
/// indexed and never rendered.
///
/// ### Locking
/// One `RwLock` per instance covers both the sequence and the index. Every
/// mutation holds the write lock for its whole duration, so readers never see
/// a half-applied change. All methods take `&self`.
///
/// ### Examples
/// ```rust
/// # use std::any::Any;
/// # use std::fmt;
/// use sugars_keyed::collections::{Element, KeyedCollection};
///
/// #[derive(Clone)]
/// struct Pair(String, i64);
/// # impl fmt::Display for Pair {
/// #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.1) }
/// # }
/// impl Element for Pair {
///     fn key(&self) -> &str { &self.0 }
///     fn value(&self) -> &dyn Any { &self.1 }
/// }
///
/// let list = KeyedCollection::with_capacity(4);
/// list.add(Pair("a".into(), 1))?;
/// list.add(Pair("b".into(), 2))?;
/// list.remove("a");
/// assert!(list.get("a").is_none());
/// assert_eq!(list.keys(), vec!["b".to_string()]);
/// # Ok::<(), sugars_keyed::CollectionError>(())
/// ```
pub struct KeyedCollection<T> {
    inner: RwLock<Inner<T>>,
}

#[derive(Clone)]
pub(super) struct Inner<T> {
    pub(super) elements: Vec<Slot<T>>,
    pub(super) index: LazyIndex,
    pub(super) type_tag: Option<TypeTag>,
    pub(super) mode: Mode,
    pub(super) name: Option<String>,
    pub(super) threshold: usize,
}

impl<T: Element> Inner<T> {
    fn from_config(config: CollectionConfig) -> Self {
        // `with_capacity` skips validation, so the up-front reservation is capped
        let reserve = config.capacity.min(config::MAX_CAPACITY);
        let mut index = LazyIndex::default();
        if config.capacity >= config.index_threshold {
            index.build_empty(reserve);
        }
        Inner {
            elements: Vec::with_capacity(reserve),
            index,
            type_tag: T::declared_tag(),
            mode: config.mode,
            name: config.name,
            threshold: config.index_threshold,
        }
    }

    fn check(&self, value: &T) -> Result<()> {
        match self.type_tag {
            Some(expected) => {
                let found = value.type_tag();
                if found == expected {
                    Ok(())
                } else {
                    Err(CollectionError::TypeMismatch {
                        expected: expected.name(),
                        found: found.name(),
                    })
                }
            }
            None => Ok(()),
        }
    }

    #[inline]
    fn position(&self, key: &str) -> Option<usize> {
        self.index.position(key, &self.elements)
    }

    fn adopt_tag(&mut self, value: &T) {
        if self.type_tag.is_none() {
            self.type_tag = Some(value.type_tag());
        }
    }

    fn append(&mut self, slot: Slot<T>) -> usize {
        let pos = self.elements.len();
        if let Slot::Present(value) = &slot {
            self.index.register(value.key(), pos);
        }
        self.elements.push(slot);
        if self.index.build_if_due(&self.elements, self.threshold) {
            log::debug!(
                "built key index over {} elements (threshold {})",
                self.elements.len(),
                self.threshold
            );
        }
        pos
    }

    /// Overwrite in place when the key exists, append otherwise.
    fn upsert(&mut self, value: T) -> Result<usize> {
        self.check(&value)?;
        self.adopt_tag(&value);
        match self.position(value.key()) {
            Some(pos) => {
                self.elements[pos] = Slot::Present(value);
                Ok(pos)
            }
            None => Ok(self.append(Slot::Present(value))),
        }
    }

    fn out_of_range(&self, index: usize) -> CollectionError {
        CollectionError::IndexOutOfRange {
            index,
            len: self.elements.len(),
        }
    }
}

impl<T: Element> Default for KeyedCollection<T> {
    fn default() -> Self {
        Self::from_inner(Inner::from_config(CollectionConfig::new().capacity(0)))
    }
}

// Construction
impl<T: Element> KeyedCollection<T> {
    fn from_inner(inner: Inner<T>) -> Self {
        KeyedCollection {
            inner: RwLock::new(inner),
        }
    }

    /// Creates an empty collection.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection with room for `capacity` elements.
    ///
    /// A capacity at or above the index threshold builds the (empty) index
    /// right away.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_inner(Inner::from_config(CollectionConfig::new().capacity(capacity)))
    }

    /// Creates an empty collection from explicit settings.
    pub fn with_config(config: CollectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_inner(Inner::from_config(config)))
    }

    /// Builds a collection from a non-empty list of elements.
    ///
    /// Elements go through [`add`](Self::add) one at a time, so a repeated key
    /// overwrites its earlier occurrence in place. Capacity is the larger of
    /// the default capacity and the element count.
    pub fn of<I>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let elements: Vec<T> = elements.into_iter().collect();
        if elements.is_empty() {
            return Err(CollectionError::invalid_state(
                "cannot build a collection from an empty element list",
            ));
        }
        let capacity = config::default_capacity().max(elements.len());
        let collection = Self::with_capacity(capacity);
        for element in elements {
            collection.add(element)?;
        }
        Ok(collection)
    }
}

// Core API
impl<T: Element> KeyedCollection<T> {
    /// Number of slots, placeholders included.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.read().elements.len()
    }

    /// Whether the collection holds no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with `TypeMismatch` if `value` is not of the collection's type.
    /// Always succeeds before a type has been established.
    pub fn validate(&self, value: &T) -> Result<()> {
        self.inner.read().check(value)
    }

    /// Like [`validate`](Self::validate); placeholders always pass.
    pub fn validate_slot(&self, slot: &Slot<T>) -> Result<()> {
        match slot {
            Slot::Present(value) => self.validate(value),
            Slot::Empty => Ok(()),
        }
    }

    /// Position of `key`, or `None`.
    ///
    /// Constant time once the index is built, a linear scan before.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.inner.read().position(key)
    }

    /// Whether an element with `key` is present.
    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Runs `f` against the element stored under `key`.
    ///
    /// `f` runs under the collection's read lock: calling a mutating method on
    /// the same collection from inside it deadlocks.
    pub fn get_with<R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let inner = self.inner.read();
        let pos = inner.position(key)?;
        inner.elements[pos].as_ref().map(f)
    }

    /// Adds `value`, overwriting in place if its key is already present.
    /// Returns the element's position.
    pub fn add(&self, value: T) -> Result<usize> {
        self.inner.write().upsert(value)
    }

    /// Adds a slot. Placeholders are appended without any key handling.
    pub fn add_slot(&self, slot: Slot<T>) -> Result<usize> {
        match slot {
            Slot::Present(value) => self.add(value),
            Slot::Empty => Ok(self.push_empty()),
        }
    }

    /// Appends a placeholder and returns its position.
    pub fn push_empty(&self) -> usize {
        self.inner.write().append(Slot::Empty)
    }

    /// Stores `value` under `key`, which must be the value's own key.
    pub fn set(&self, key: &str, value: T) -> Result<usize> {
        let mut inner = self.inner.write();
        inner.check(&value)?;
        if value.key() != key {
            return Err(CollectionError::KeyMismatch {
                expected: key.to_owned(),
                found: value.key().to_owned(),
            });
        }
        inner.upsert(value)
    }

    /// Overwrites the slot at `index`, keeping its position.
    ///
    /// When the key changes the old mapping is dropped and the new key is
    /// registered at the same position. A key already held elsewhere fails
    /// with `DuplicateKey`.
    pub fn set_index(&self, index: usize, value: T) -> Result<()> {
        let mut inner = self.inner.write();
        inner.check(&value)?;
        if index >= inner.elements.len() {
            return Err(inner.out_of_range(index));
        }
        if let Some(other) = inner.position(value.key()) {
            if other != index {
                return Err(CollectionError::DuplicateKey {
                    key: value.key().to_owned(),
                    position: other,
                });
            }
        }
        inner.adopt_tag(&value);

        let old_key = inner.elements[index].key().map(str::to_owned);
        if old_key.as_deref() != Some(value.key()) {
            if let Some(old_key) = &old_key {
                inner.index.unregister(old_key);
            }
            inner.index.register(value.key(), index);
        }
        inner.elements[index] = Slot::Present(value);
        Ok(())
    }

    /// Removes the element stored under `key`, shifting later elements down
    /// by one. Returns `None` and changes nothing if the key is absent.
    pub fn remove(&self, key: &str) -> Option<T> {
        let mut inner = self.inner.write();
        let pos = inner.position(key)?;
        let removed = inner.elements.remove(pos);
        inner.index.unregister(key);
        inner.index.shift_down_after(pos);
        removed.into_option()
    }

    /// Removes every slot. A built index stays built, empty.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.elements.clear();
        inner.index.clear();
    }

    /// Adds every element, or none of them.
    ///
    /// All values are type-checked before the first one is stored.
    pub fn extend<I>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        let mut inner = self.inner.write();
        let expected = inner
            .type_tag
            .or_else(|| values.first().map(Element::type_tag));
        if let Some(expected) = expected {
            if let Some(bad) = values.iter().find(|v| v.type_tag() != expected) {
                return Err(CollectionError::TypeMismatch {
                    expected: expected.name(),
                    found: bad.type_tag().name(),
                });
            }
        }
        for value in values {
            inner.upsert(value)?;
        }
        Ok(())
    }

    /// The live backing sequence.
    ///
    /// The returned guard holds the collection's read lock: mutating the same
    /// collection from this thread before dropping it deadlocks.
    pub fn list(&self) -> MappedRwLockReadGuard<'_, [Slot<T>]> {
        RwLockReadGuard::map(self.inner.read(), |inner| inner.elements.as_slice())
    }

    /// Keys of all present elements, in order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .read()
            .elements
            .iter()
            .filter_map(|slot| slot.key().map(str::to_owned))
            .collect()
    }

    /// Sorts by ascending key. Placeholders move to the end; ties keep their
    /// relative order. A built index is rebuilt.
    pub fn sort_by_keys(&self) {
        let mut inner = self.inner.write();
        inner.elements.sort_by(|a, b| match (a.key(), b.key()) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        if inner.index.is_built() {
            let inner = &mut *inner;
            inner.index.build(&inner.elements);
            log::debug!("rebuilt key index after sort ({} elements)", inner.elements.len());
        }
    }

    /// Whether the hash index has been built.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.inner.read().index.is_built()
    }

    /// Length at which this collection builds its index.
    #[inline]
    pub fn threshold(&self) -> usize {
        self.inner.read().threshold
    }

    /// Concrete element type, once known.
    #[inline]
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.inner.read().type_tag
    }

    /// Serialization mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.inner.read().mode
    }

    /// Change the serialization mode.
    pub fn set_mode(&self, mode: Mode) {
        self.inner.write().mode = mode;
    }

    /// Name used when embedded in an outer JSON object.
    pub fn name(&self) -> Option<String> {
        self.inner.read().name.clone()
    }

    /// Set or clear the name.
    pub fn set_name<S: Into<String>>(&self, name: Option<S>) {
        self.inner.write().name = name.map(Into::into);
    }

    pub(super) fn read(&self) -> RwLockReadGuard<'_, Inner<T>> {
        self.inner.read()
    }
}

// Cloning accessors
impl<T: Element + Clone> KeyedCollection<T> {
    /// The slot at `index`.
    pub fn index(&self, index: usize) -> Result<Slot<T>> {
        let inner = self.inner.read();
        inner
            .elements
            .get(index)
            .cloned()
            .ok_or_else(|| inner.out_of_range(index))
    }

    /// A copy of the element stored under `key`.
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_with(key, T::clone)
    }

    /// An independent copy of the sequence.
    pub fn values(&self) -> Vec<Slot<T>> {
        self.inner.read().elements.clone()
    }
}

impl<T: Element + Clone> Clone for KeyedCollection<T> {
    fn clone(&self) -> Self {
        Self::from_inner(self.inner.read().clone())
    }
}

impl<T: Element> fmt::Debug for KeyedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("KeyedCollection")
            .field("len", &inner.elements.len())
            .field("mode", &inner.mode)
            .field("name", &inner.name)
            .field("type_tag", &inner.type_tag)
            .field("indexed_keys", &inner.index.is_built().then(|| inner.index.len()))
            .finish()
    }
}
