//! # Sugars Keyed
//!
//! Order-preserving keyed collections for Rust.
//!
//! A [`KeyedCollection`] is an appendable ordered sequence that also resolves
//! elements by a string key. Small collections look keys up by scanning; once
//! a collection reaches its index threshold a hash index is built and kept in
//! step with every mutation, so large collections answer key lookups in
//! constant time without small ones ever paying for the index.
//!
//! ## Features
//!
//! - `collections` - [`KeyedCollection`], the [`Element`] capability and [`Slot`] placeholders
//! - `json` - Array/object JSON rendering through pooled buffers, plus `serde::Serialize`
//! - `macros` - `keyed_list!` / `keyed_record!` literal constructors
//!
//! ## Example
//!
//! ```rust
//! use std::any::Any;
//! use std::fmt;
//! use sugars_keyed::{Element, KeyedCollection};
//!
//! #[derive(Clone)]
//! struct Header {
//!     name: String,
//!     value: String,
//! }
//!
//! impl fmt::Display for Header {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         f.write_str(&self.value)
//!     }
//! }
//!
//! impl Element for Header {
//!     fn key(&self) -> &str {
//!         &self.name
//!     }
//!
//!     fn value(&self) -> &dyn Any {
//!         &self.value
//!     }
//! }
//!
//! let headers = KeyedCollection::with_capacity(4);
//! headers.add(Header { name: "accept".into(), value: "*/*".into() })?;
//! headers.add(Header { name: "host".into(), value: "example.com".into() })?;
//!
//! assert_eq!(headers.index_of("host"), Some(1));
//! assert_eq!(
//!     headers.to_json_string()?.as_deref(),
//!     Some(r#"["*/*","example.com"]"#)
//! );
//! # Ok::<(), sugars_keyed::CollectionError>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pool;

// Conditionally compile modules based on features
#[cfg(feature = "collections")]
pub mod collections;

#[cfg(feature = "macros")]
pub mod macros;

pub use error::{CollectionError, Result};

// Re-export commonly used types from collections
#[cfg(feature = "collections")]
pub use collections::{Element, KeyedCollection, Slot, TypeTag};

pub use config::{CollectionConfig, Mode};
pub use pool::{BufferPool, PooledBuffer};
