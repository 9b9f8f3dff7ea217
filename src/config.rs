//! Collection configuration
//!
//! Module-wide defaults live in atomics so they can be tuned once at start-up.
//! Individual collections take a [`CollectionConfig`] snapshot at construction
//! and are unaffected by later changes to the defaults.

use crate::error::{CollectionError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

/// Size at which a collection builds its hash index.
pub const DEFAULT_INDEX_THRESHOLD: usize = 32;

/// Capacity reserved by `of` when given fewer elements than this.
pub const DEFAULT_CAPACITY: usize = 8;

/// Largest capacity a configuration may request up front.
pub const MAX_CAPACITY: usize = 1 << 20;

static INDEX_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_INDEX_THRESHOLD);
static CAPACITY: AtomicUsize = AtomicUsize::new(DEFAULT_CAPACITY);

/// Current module-wide index threshold.
pub fn default_index_threshold() -> usize {
    INDEX_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the module-wide index threshold used by newly created collections.
///
/// Fails with `InvalidState` for zero.
pub fn set_default_index_threshold(threshold: usize) -> Result<()> {
    if threshold == 0 {
        return Err(CollectionError::invalid_state(
            "index threshold must be non-zero",
        ));
    }
    INDEX_THRESHOLD.store(threshold, Ordering::Relaxed);
    Ok(())
}

/// Current module-wide default capacity.
pub fn default_capacity() -> usize {
    CAPACITY.load(Ordering::Relaxed)
}

/// Change the module-wide default capacity.
///
/// Fails with `InvalidState` above [`MAX_CAPACITY`].
pub fn set_default_capacity(capacity: usize) -> Result<()> {
    check_capacity(capacity)?;
    CAPACITY.store(capacity, Ordering::Relaxed);
    Ok(())
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity > MAX_CAPACITY {
        return Err(CollectionError::invalid_state(format!(
            "capacity {capacity} exceeds the maximum of {MAX_CAPACITY}"
        )));
    }
    Ok(())
}

/// External representation selected for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Rendered as a JSON array of string values
    #[default]
    Sequence,
    /// Rendered as a JSON object of `key: string-value` pairs
    Keyed,
}

/// Per-instance settings.
///
/// ```rust
/// use sugars_keyed::config::{CollectionConfig, Mode};
///
/// let config = CollectionConfig::new()
///     .capacity(64)
///     .mode(Mode::Keyed)
///     .name("headers");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct CollectionConfig {
    /// Initial capacity of the backing sequence
    pub capacity: usize,
    /// Length at which the hash index is built
    pub index_threshold: usize,
    /// Serialization mode
    pub mode: Mode,
    /// Label used when the collection is embedded in an outer object
    pub name: Option<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            index_threshold: default_index_threshold(),
            mode: Mode::default(),
            name: None,
        }
    }
}

impl CollectionConfig {
    /// Configuration seeded from the module-wide defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the index threshold.
    pub fn index_threshold(mut self, threshold: usize) -> Self {
        self.index_threshold = threshold;
        self
    }

    /// Set the serialization mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the collection name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the configuration before it is used.
    ///
    /// The threshold must be non-zero and the capacity at most
    /// [`MAX_CAPACITY`].
    pub fn validate(&self) -> Result<()> {
        if self.index_threshold == 0 {
            return Err(CollectionError::invalid_state(
                "index threshold must be non-zero",
            ));
        }
        check_capacity(self.capacity)
    }

    /// Parse and validate a configuration from JSON. Missing fields take the
    /// module-wide defaults.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_chain() {
        let config = CollectionConfig::new()
            .capacity(3)
            .index_threshold(4)
            .mode(Mode::Keyed)
            .name("tags");
        assert_eq!(config.capacity, 3);
        assert_eq!(config.index_threshold, 4);
        assert_eq!(config.mode, Mode::Keyed);
        assert_eq!(config.name.as_deref(), Some("tags"));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = CollectionConfig::new().index_threshold(0);
        assert!(matches!(
            config.validate(),
            Err(CollectionError::InvalidState(_))
        ));
        assert!(set_default_index_threshold(0).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json() {
        let config =
            CollectionConfig::from_json(r#"{"index_threshold": 16, "mode": "keyed"}"#)
                .expect("test config");
        assert_eq!(config.index_threshold, 16);
        assert_eq!(config.mode, Mode::Keyed);
        assert_eq!(config.name, None);

        assert!(CollectionConfig::from_json(r#"{"index_threshold": 0}"#).is_err());
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        let config = CollectionConfig::new().capacity(usize::MAX);
        assert!(matches!(
            config.validate(),
            Err(CollectionError::InvalidState(_))
        ));
        assert!(CollectionConfig::new().capacity(MAX_CAPACITY).validate().is_ok());
        assert!(set_default_capacity(MAX_CAPACITY + 1).is_err());
        assert_eq!(default_capacity(), DEFAULT_CAPACITY);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_rejects_oversized_capacity() {
        let err = CollectionConfig::from_json(r#"{"capacity": 18446744073709551615}"#)
            .unwrap_err();
        assert!(matches!(err, CollectionError::InvalidState(_)));
    }
}
