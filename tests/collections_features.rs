//! Tests for collections feature and related functionality

#[cfg(feature = "collections")]
mod collections_tests {
    use pretty_assertions::assert_eq;
    use std::any::Any;
    use std::fmt;
    use std::sync::Arc;
    use sugars_keyed::{CollectionError, Element, KeyedCollection, Slot};

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        key: String,
        val: i64,
    }

    fn entry(key: &str, val: i64) -> Entry {
        Entry {
            key: key.to_string(),
            val,
        }
    }

    impl fmt::Display for Entry {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.val)
        }
    }

    impl Element for Entry {
        fn key(&self) -> &str {
            &self.key
        }

        fn value(&self) -> &dyn Any {
            &self.val
        }
    }

    struct Label(&'static str);

    impl fmt::Display for Label {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl Element for Label {
        fn key(&self) -> &str {
            self.0
        }

        fn value(&self) -> &dyn Any {
            &self.0
        }
    }

    fn numbered(n: usize) -> Vec<Entry> {
        (1..=n).map(|i| entry(&format!("e{i}"), i as i64)).collect()
    }

    #[test]
    fn test_collections_add_get_remove_scenario() {
        let list = KeyedCollection::with_capacity(4);
        list.add(entry("a", 1)).expect("test add");
        list.add(entry("b", 2)).expect("test add");
        list.remove("a");

        assert_eq!(list.get("a"), None);
        assert_eq!(list.keys(), vec!["b".to_string()]);
        assert_eq!(list.get("b"), Some(entry("b", 2)));
    }

    #[test]
    fn test_collections_of_forty_is_indexed() {
        let list = KeyedCollection::of(numbered(40)).expect("test build");
        assert!(list.is_indexed());
        assert_eq!(list.index_of("e40"), Some(39));
        assert_eq!(list.len(), 40);
    }

    #[test]
    fn test_collections_threshold_boundary() {
        let below = KeyedCollection::<Entry>::with_capacity(31);
        assert!(!below.is_indexed());
        assert_eq!(below.index_of("missing"), None);

        let at = KeyedCollection::<Entry>::with_capacity(32);
        assert!(at.is_indexed());
    }

    #[test]
    fn test_collections_lookup_same_below_and_above_threshold() {
        for n in [5, 31, 32, 33, 80] {
            let list = KeyedCollection::with_capacity(0);
            for e in numbered(n) {
                list.add(e).expect("test add");
            }
            assert_eq!(list.is_indexed(), n >= 32, "n = {n}");
            for (pos, e) in numbered(n).into_iter().enumerate() {
                assert_eq!(list.index_of(&e.key), Some(pos));
                assert_eq!(list.get(&e.key), Some(e));
            }
            assert!(!list.has("nope"));
        }
    }

    #[test]
    fn test_collections_order_preserved() {
        let list = KeyedCollection::with_capacity(0);
        for e in numbered(50) {
            list.add(e).expect("test add");
        }
        for i in (1..=50).step_by(3) {
            list.remove(&format!("e{i}"));
        }
        list.set("e2", entry("e2", 200)).expect("test set");
        list.add(entry("late", 0)).expect("test add");

        let expected: Vec<String> = (1..=50)
            .filter(|i| (i - 1) % 3 != 0)
            .map(|i| format!("e{i}"))
            .chain(std::iter::once("late".to_string()))
            .collect();
        assert_eq!(list.keys(), expected);
        assert_eq!(list.get("e2").map(|e| e.val), Some(200));
    }

    #[test]
    fn test_collections_idempotent_set() {
        let list = KeyedCollection::with_capacity(4);
        list.add(entry("x", 0)).expect("test add");
        let first = list.set("k", entry("k", 7)).expect("test set");
        let second = list.set("k", entry("k", 7)).expect("test set");
        assert_eq!(first, second);
        assert_eq!(list.len(), 2);
        assert_eq!(list.index_of("k"), Some(1));
    }

    #[test]
    fn test_collections_type_mismatch_leaves_collection_unchanged() {
        let list: KeyedCollection<Arc<dyn Element>> = KeyedCollection::with_capacity(4);
        assert_eq!(list.type_tag(), None);
        list.add(Arc::new(entry("a", 1))).expect("test add");
        assert!(list.type_tag().is_some());

        let err = list.add(Arc::new(Label("b"))).unwrap_err();
        assert!(matches!(err, CollectionError::TypeMismatch { .. }));
        assert_eq!(list.len(), 1);

        let err = list.set("b", Arc::new(Label("b"))).unwrap_err();
        assert!(matches!(err, CollectionError::TypeMismatch { .. }));
        let err = list.set_index(0, Arc::new(Label("a"))).unwrap_err();
        assert!(matches!(err, CollectionError::TypeMismatch { .. }));
        let err = list
            .extend(vec![
                Arc::new(entry("c", 3)) as Arc<dyn Element>,
                Arc::new(Label("d")) as Arc<dyn Element>,
            ])
            .unwrap_err();
        assert!(matches!(err, CollectionError::TypeMismatch { .. }));

        assert_eq!(list.len(), 1);
        assert_eq!(list.keys(), vec!["a".to_string()]);
        assert!(list.validate(&(Arc::new(Label("z")) as Arc<dyn Element>)).is_err());
        assert!(list.validate_slot(&Slot::Empty).is_ok());
    }

    #[test]
    fn test_collections_boxed_elements() {
        let list: KeyedCollection<Box<dyn Element>> = KeyedCollection::new();
        list.add(Box::new(Label("x"))).expect("test add");
        list.add(Box::new(Label("y"))).expect("test add");
        assert_eq!(list.get_with("y", |e| e.to_string()), Some("y".to_string()));
        assert!(list.add(Box::new(entry("z", 0))).is_err());
    }

    #[test]
    fn test_collections_index_out_of_range() {
        let list = KeyedCollection::of([entry("a", 1)]).expect("test build");
        assert_eq!(list.index(0).expect("test index"), Slot::Present(entry("a", 1)));
        let err = list.index(1).unwrap_err();
        assert!(matches!(
            err,
            CollectionError::IndexOutOfRange { index: 1, len: 1 }
        ));
    }

    #[test]
    fn test_collections_placeholders() {
        let list = KeyedCollection::with_capacity(4);
        list.add(entry("a", 1)).expect("test add");
        assert_eq!(list.add_slot(Slot::Empty).expect("test add"), 1);
        list.add_slot(Slot::Present(entry("b", 2))).expect("test add");

        assert_eq!(list.len(), 3);
        assert_eq!(list.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.index_of("b"), Some(2));
        assert!(list.values()[1].is_empty());
    }

    #[test]
    fn test_collections_sort_then_lookup() {
        let list = KeyedCollection::of(numbered(40)).expect("test build");
        list.sort_by_keys();
        let keys = list.keys();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        for (pos, key) in keys.iter().enumerate() {
            assert_eq!(list.index_of(key), Some(pos));
        }
    }

    #[test]
    fn test_collections_concurrent_writers() {
        let list = KeyedCollection::<Entry>::with_capacity(0);
        std::thread::scope(|scope| {
            for t in 0..8 {
                let list = &list;
                scope.spawn(move || {
                    for i in 0..50 {
                        list.add(entry(&format!("t{t}-{i}"), i)).expect("test add");
                    }
                });
            }
        });

        assert_eq!(list.len(), 400);
        assert!(list.is_indexed());
        let keys: Vec<String> = list
            .list()
            .iter()
            .map(|slot| slot.key().expect("present").to_string())
            .collect();
        for (pos, key) in keys.iter().enumerate() {
            assert_eq!(list.index_of(key), Some(pos));
        }
    }

    #[test]
    fn test_collections_clone_is_independent() {
        let list = KeyedCollection::of(numbered(3)).expect("test build");
        let copy = list.clone();
        list.remove("e1");
        assert_eq!(copy.len(), 3);
        assert_eq!(list.len(), 2);
    }
}
