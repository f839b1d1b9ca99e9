//! Synchronous key/value storage contract and in-process adapters.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use serde::de::DeserializeOwned;

use super::error::StorageError;

/// Host service storing raw JSON text per key, with browser `localStorage` semantics.
pub trait KeyValueStore {
    /// Returns the raw string stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `raw_json` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, raw_json: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        (**self).set_item(key, raw_json)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory store keyed by string.
///
/// Clones share the same backing map. The store counts successful writes and can be told to
/// reject writes, which makes it the test double for quota failures.
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryKeyValueStore {
    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        store
    }

    /// Number of successful `set_item` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Makes every subsequent `set_item` fail with [`StorageError::QuotaOrWriteFailure`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Returns whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().contains_key(key)
    }

    /// Returns the raw value for `key` without going through the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::QuotaOrWriteFailure {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads and decodes a typed value through a [`KeyValueStore`].
///
/// # Errors
///
/// Returns [`StorageError::CorruptValue`] when the stored text is not valid JSON for `T`, or the
/// backend's own error.
pub fn load_typed_with<S: KeyValueStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::CorruptValue {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wallpaper {
        url: String,
    }

    #[test]
    fn memory_store_round_trip_and_remove() {
        let store = MemoryKeyValueStore::default();
        let store_obj: &dyn KeyValueStore = &store;

        store_obj.set_item("k", "{\"a\":1}").expect("set");
        assert_eq!(store_obj.get_item("k").expect("get"), Some("{\"a\":1}".to_string()));
        store_obj.remove_item("k").expect("remove");
        assert_eq!(store_obj.get_item("k").expect("get"), None);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn clones_share_backing_map() {
        let store = MemoryKeyValueStore::default();
        let shared = Rc::new(store.clone());
        shared.set_item("k", "1").expect("set through rc");
        assert!(store.contains("k"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn failing_writes_surface_quota_error_and_leave_map_untouched() {
        let store = MemoryKeyValueStore::with_entries([("k", "1")]);
        store.fail_writes(true);
        let err = store.set_item("k", "2").expect_err("write should fail");
        assert!(matches!(err, StorageError::QuotaOrWriteFailure { .. }));
        assert_eq!(store.raw("k").as_deref(), Some("1"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn typed_helpers_report_corrupt_values() {
        let store = MemoryKeyValueStore::with_entries([("bad", "{not json")]);
        let err = load_typed_with::<_, Wallpaper>(&store, "bad").expect_err("corrupt");
        assert!(matches!(err, StorageError::CorruptValue { ref key, .. } if key == "bad"));

        store
            .set_item("good", r#"{"url":"/bg.jpg"}"#)
            .expect("save");
        let loaded: Option<Wallpaper> = load_typed_with(&store, "good").expect("load");
        assert_eq!(
            loaded,
            Some(Wallpaper {
                url: "/bg.jpg".to_string()
            })
        );
        assert_eq!(load_typed_with::<_, Wallpaper>(&store, "missing").expect("load"), None);
    }
}
