//! Macros for initializing [`KeyedCollection`](crate::collections::KeyedCollection)s.
//!
//! Every macro evaluates to a [`Result`](crate::Result): elements go through
//! `add`, which type-checks them. The `_fn` variants wrap the construction in
//! a closure for APIs that take deferred initializers.

pub mod keyed {
    //! Literal constructors for sequence and keyed collections.

    /// Build a sequence-mode collection from a list of elements.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use std::any::Any;
    /// # use std::fmt;
    /// use sugars_keyed::collections::Element;
    /// use sugars_keyed::macros::collections::keyed::keyed_list;
    ///
    /// struct Word(&'static str);
    /// # impl fmt::Display for Word {
    /// #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.0) }
    /// # }
    /// # impl Element for Word {
    /// #     fn key(&self) -> &str { self.0 }
    /// #     fn value(&self) -> &dyn Any { &self.0 }
    /// # }
    ///
    /// let words = keyed_list![Word("a"), Word("b")]?;
    /// assert_eq!(words.len(), 2);
    /// # Ok::<(), sugars_keyed::CollectionError>(())
    /// ```
    #[doc(hidden)]
    #[macro_export]
    macro_rules! __kc_keyed_list {
        () => {
            ::core::result::Result::<_, $crate::CollectionError>::Ok(
                $crate::collections::KeyedCollection::new(),
            )
        };
        [$($e: expr),+ $(,)?] => {
            $crate::collections::KeyedCollection::of([$($e,)+])
        };
    }

    /// Build a keyed-mode collection, optionally named.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use std::any::Any;
    /// # use std::fmt;
    /// use sugars_keyed::collections::Element;
    /// use sugars_keyed::macros::collections::keyed::keyed_record;
    ///
    /// struct Header(&'static str, &'static str);
    /// # impl fmt::Display for Header {
    /// #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.1) }
    /// # }
    /// # impl Element for Header {
    /// #     fn key(&self) -> &str { self.0 }
    /// #     fn value(&self) -> &dyn Any { &self.1 }
    /// # }
    ///
    /// let headers = keyed_record!("headers" => Header("accept", "*/*"))?;
    /// assert_eq!(headers.name().as_deref(), Some("headers"));
    /// assert_eq!(headers.to_json_string()?.as_deref(), Some(r#"{"accept":"*/*"}"#));
    /// # Ok::<(), sugars_keyed::CollectionError>(())
    /// ```
    #[doc(hidden)]
    #[macro_export]
    macro_rules! __kc_keyed_record {
        ($($e: expr),* $(,)?) => {
            (|| -> $crate::Result<_> {
                let collection = $crate::collections::KeyedCollection::with_config(
                    $crate::config::CollectionConfig::new().mode($crate::config::Mode::Keyed),
                )?;
                $( collection.add($e)?; )*
                ::core::result::Result::Ok(collection)
            })()
        };
        ($name: expr => $($e: expr),* $(,)?) => {
            (|| -> $crate::Result<_> {
                let collection = $crate::collections::KeyedCollection::with_config(
                    $crate::config::CollectionConfig::new()
                        .mode($crate::config::Mode::Keyed)
                        .name($name),
                )?;
                $( collection.add($e)?; )*
                ::core::result::Result::Ok(collection)
            })()
        };
    }

    /// Closure equivalent of [`keyed_list!`](self::keyed_list).
    ///
    /// Returns `impl FnOnce() -> Result<KeyedCollection<_>>`.
    #[doc(hidden)]
    #[macro_export]
    macro_rules! __kc_keyed_list_fn {
        [$($e: expr),* $(,)?] => {
            move || $crate::__kc_keyed_list![$($e),*]
        };
    }

    #[doc(inline)]
    pub use __kc_keyed_list as keyed_list;

    #[doc(inline)]
    pub use __kc_keyed_record as keyed_record;

    #[doc(inline)]
    pub use __kc_keyed_list_fn as keyed_list_fn;
}
