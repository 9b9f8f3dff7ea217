//! Error types for keyed collections
//!
//! Every fallible operation in this crate returns [`Result`]. Mutations either
//! apply completely or fail with one of these variants and leave the collection
//! untouched.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors raised by [`KeyedCollection`](crate::KeyedCollection) operations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The value's concrete type differs from the type the collection holds.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type name established by the collection
        expected: &'static str,
        /// Type name of the rejected value
        found: &'static str,
    },

    /// Positional access outside `0..len`.
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Length at the time of the call
        len: usize,
    },

    /// The collection cannot perform the operation in its current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// `set` was called with a key that is not the value's own key.
    #[error("Key mismatch: set under '{expected}' but value reports '{found}'")]
    KeyMismatch {
        /// Key passed by the caller
        expected: String,
        /// Key reported by the value
        found: String,
    },

    /// The key is already held by another position.
    #[error("Duplicate key '{key}' already stored at position {position}")]
    DuplicateKey {
        /// Conflicting key
        key: String,
        /// Position currently holding the key
        position: usize,
    },

    /// JSON encoding failure.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure writing into a buffer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectionError {
    /// Shorthand for [`CollectionError::InvalidState`].
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        CollectionError::InvalidState(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_messages() {
        let err = CollectionError::TypeMismatch {
            expected: "Foo",
            found: "Bar",
        };
        assert_eq!(err.to_string(), "Type mismatch: expected Foo, found Bar");

        let err = CollectionError::IndexOutOfRange { index: 5, len: 2 };
        assert_eq!(
            err.to_string(),
            "Index 5 out of range for collection of length 2"
        );

        let err = CollectionError::invalid_state("no name");
        assert_eq!(err.to_string(), "Invalid state: no name");
    }
}
