// -----------------------------------------------------------------------------
// src/collections/element.rs
// -----------------------------------------------------------------------------

use std::any::{self, Any, TypeId};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Runtime identity of a concrete element type.
///
/// Compared through [`TypeId`]; the name is carried for error messages only.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeTag {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// Human readable type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value that can live in a [`KeyedCollection`](super::KeyedCollection).
///
/// The `Display` implementation is the element's string form used by the JSON
/// renderer; an element that displays as the empty string is omitted from
/// payloads.
///
/// Implementors must return the same key for the same logical identity for
/// the life of the value, and render the same string between calls. The
/// collection indexes by key and cannot detect a key that changes behind its
/// back.
///
/// ```rust
/// use std::any::Any;
/// use std::fmt;
/// use sugars_keyed::collections::Element;
///
/// struct Header { name: String, value: String }
///
/// impl fmt::Display for Header {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(&self.value)
///     }
/// }
///
/// impl Element for Header {
///     fn key(&self) -> &str { &self.name }
///     fn value(&self) -> &dyn Any { &self.value }
/// }
/// ```
pub trait Element: fmt::Display + 'static {
    /// Identity of this element within a collection.
    fn key(&self) -> &str;

    /// The wrapped value.
    fn value(&self) -> &dyn Any;

    /// Concrete runtime type of this element.
    ///
    /// Wrappers around trait objects forward to the wrapped element so that
    /// homogeneity is checked against the real type.
    #[inline]
    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<Self>()
    }

    /// Tag a collection of `Self` adopts before any insert.
    ///
    /// `None` defers to the first present element inserted, which is what
    /// type-erased element types want.
    #[inline]
    fn declared_tag() -> Option<TypeTag>
    where
        Self: Sized,
    {
        Some(TypeTag::of::<Self>())
    }
}

macro_rules! forward_element {
    ($($ptr:ident),*) => {
        $(
            impl<E: Element + ?Sized> Element for $ptr<E> {
                #[inline]
                fn key(&self) -> &str {
                    (**self).key()
                }

                #[inline]
                fn value(&self) -> &dyn Any {
                    (**self).value()
                }

                #[inline]
                fn type_tag(&self) -> TypeTag {
                    (**self).type_tag()
                }

                #[inline]
                fn declared_tag() -> Option<TypeTag> {
                    None
                }
            }
        )*
    };
}

forward_element!(Box, Arc, Rc);

/// One position in a collection: an element or a reserved empty slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    /// Occupied position
    Present(T),
    /// Reserved, keyless position
    Empty,
}

impl<T> Default for Slot<T> {
    #[inline]
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> Slot<T> {
    /// Whether this slot holds an element.
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }

    /// Whether this slot is a placeholder.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Borrow the element, if any.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Slot::Present(value) => Some(value),
            Slot::Empty => None,
        }
    }

    /// Take the element out, if any.
    #[inline]
    pub fn into_option(self) -> Option<T> {
        match self {
            Slot::Present(value) => Some(value),
            Slot::Empty => None,
        }
    }
}

impl<T: Element> Slot<T> {
    /// Key of the held element; `None` for a placeholder.
    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.as_ref().map(|value| value.key())
    }
}

impl<T> From<Option<T>> for Slot<T> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Slot::Present(value),
            None => Slot::Empty,
        }
    }
}
