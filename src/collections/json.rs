//! JSON rendering for keyed collections
//!
//! A collection in [`Mode::Sequence`] renders as an array of its elements'
//! string forms, one in [`Mode::Keyed`] as an object of `key: string` pairs.
//! Placeholders and elements whose string form is empty are skipped. When
//! nothing is left there is no payload at all, not an empty `[]` or `{}`.

use super::element::{Element, Slot};
use super::keyed::{Inner, KeyedCollection};
use crate::config::Mode;
use crate::error::{CollectionError, Result};
use crate::pool::BufferPool;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use std::io::{self, Write};

/// Present elements with a non-empty string form, paired with their keys.
fn rendered<T: Element>(inner: &Inner<T>) -> impl Iterator<Item = (&str, String)> + '_ {
    inner.elements.iter().filter_map(|slot| match slot {
        Slot::Present(value) => {
            let text = value.to_string();
            (!text.is_empty()).then(|| (value.key(), text))
        }
        Slot::Empty => None,
    })
}

/// Writes the payload into `out`. Returns `false`, having written nothing,
/// when there is nothing to render.
fn write_payload<T: Element, W: Write>(inner: &Inner<T>, out: &mut W) -> Result<bool> {
    let (open, close) = match inner.mode {
        Mode::Sequence => (b"[", b"]"),
        Mode::Keyed => (b"{", b"}"),
    };
    let mut written = 0usize;
    for (key, text) in rendered(inner) {
        out.write_all(if written == 0 { open } else { b"," })?;
        if inner.mode == Mode::Keyed {
            serde_json::to_writer(&mut *out, key)?;
            out.write_all(b":")?;
        }
        serde_json::to_writer(&mut *out, text.as_str())?;
        written += 1;
    }
    if written > 0 {
        out.write_all(close)?;
    }
    Ok(written > 0)
}

impl<T: Element> KeyedCollection<T> {
    /// Renders the collection using a buffer from the global pool.
    ///
    /// `Ok(None)` when the collection is empty or every element renders as the
    /// empty string.
    ///
    /// ```rust
    /// # use std::any::Any;
    /// # use std::fmt;
    /// # use sugars_keyed::collections::{Element, KeyedCollection};
    /// # struct Word(&'static str);
    /// # impl fmt::Display for Word {
    /// #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.0) }
    /// # }
    /// # impl Element for Word {
    /// #     fn key(&self) -> &str { self.0 }
    /// #     fn value(&self) -> &dyn Any { &self.0 }
    /// # }
    /// let words = KeyedCollection::of([Word("hello"), Word(""), Word("world")])?;
    /// assert_eq!(words.to_json_string()?.as_deref(), Some(r#"["hello","world"]"#));
    /// # Ok::<(), sugars_keyed::CollectionError>(())
    /// ```
    pub fn to_json(&self) -> Result<Option<Vec<u8>>> {
        self.to_json_in(BufferPool::global())
    }

    /// Renders the collection using a buffer from `pool`.
    ///
    /// The buffer goes back to the pool on every return path.
    pub fn to_json_in(&self, pool: &BufferPool) -> Result<Option<Vec<u8>>> {
        let mut buf = pool.acquire();
        let inner = self.read();
        if write_payload(&*inner, &mut *buf)? {
            Ok(Some(buf.to_vec()))
        } else {
            Ok(None)
        }
    }

    /// [`to_json`](Self::to_json) as a `String`.
    pub fn to_json_string(&self) -> Result<Option<String>> {
        match self.to_json()? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| CollectionError::invalid_state(e.to_string())),
            None => Ok(None),
        }
    }

    /// Writes `"name":<payload>` into `out`, for embedding the collection as a
    /// member of an enclosing object. Returns whether anything was written.
    ///
    /// Fails with `InvalidState` if the collection has no name.
    pub fn write_json_field<W: io::Write>(&self, out: &mut W) -> Result<bool> {
        let inner = self.read();
        let Some(name) = inner.name.as_deref() else {
            return Err(CollectionError::invalid_state(
                "a collection needs a name to be written as a field",
            ));
        };
        let mut buf = BufferPool::global().acquire();
        if !write_payload(&*inner, &mut *buf)? {
            return Ok(false);
        }
        serde_json::to_writer(&mut *out, name)?;
        out.write_all(b":")?;
        out.write_all(&buf)?;
        Ok(true)
    }
}

// Serde Support
impl<T: Element> Serialize for KeyedCollection<T> {
    fn serialize<S: Serializer>(&self, ser: S) -> std::result::Result<S::Ok, S::Error> {
        let inner = self.read();
        let items: Vec<(&str, String)> = rendered(&*inner).collect();
        match inner.mode {
            Mode::Sequence => {
                let mut seq = ser.serialize_seq(Some(items.len()))?;
                for (_, text) in &items {
                    seq.serialize_element(text)?;
                }
                seq.end()
            }
            Mode::Keyed => {
                let mut map = ser.serialize_map(Some(items.len()))?;
                for (key, text) in &items {
                    map.serialize_entry(key, text)?;
                }
                map.end()
            }
        }
    }
}
