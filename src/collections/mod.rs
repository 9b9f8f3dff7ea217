//! Collection utilities and data structures

/// The element capability and the slot type stored in collections.
pub mod element;
mod index;
/// The ordered, lazily indexed keyed collection.
pub mod keyed;

#[cfg(feature = "json")]
/// JSON rendering and serde support for keyed collections
pub mod json;

// Re-export main types
pub use element::{Element, Slot, TypeTag};
pub use keyed::KeyedCollection;
