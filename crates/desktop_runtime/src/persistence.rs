//! Persisted-value adapter over the host [`KeyValueStore`].
//!
//! A [`PersistedValue`] owns the in-memory copy of one storage key. Reads recover from corrupt
//! entries by purging them; writes are skipped when the serialized form is unchanged and never
//! fail from the caller's point of view.

use std::rc::Rc;

use leptos::logging;
use platform_host::{KeyValueStore, StorageError};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

pub struct PersistedValue<T> {
    key: String,
    store: Rc<dyn KeyValueStore>,
    initial: T,
    value: T,
    // Serialized form of `value`; `None` when it could not be encoded.
    committed: Option<String>,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_listener: u64,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    /// Loads `key`, falling back to `initial` when it is absent, unreadable, or corrupt.
    ///
    /// A corrupt entry is removed from storage so the next boot starts clean.
    pub fn read(store: Rc<dyn KeyValueStore>, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let value = match platform_host::load_typed_with::<_, T>(store.as_ref(), &key) {
            Ok(Some(value)) => value,
            Ok(None) => initial.clone(),
            Err(err @ StorageError::CorruptValue { .. }) => {
                logging::warn!("discarding stored value: {err}");
                if let Err(err) = store.remove_item(&key) {
                    logging::warn!("failed to purge corrupt `{key}`: {err}");
                }
                initial.clone()
            }
            Err(err) => {
                logging::warn!("reading `{key}` failed, using default: {err}");
                initial.clone()
            }
        };
        let committed = serde_json::to_string(&value).ok();
        Self {
            key,
            store,
            initial,
            value,
            committed,
            revision: 0,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Incremented on every change that reached listeners.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the value. Returns `false` when `next` serializes identically to the current
    /// value, in which case storage is not touched and listeners are not called.
    pub fn set(&mut self, next: T) -> bool {
        match serde_json::to_string(&next) {
            Ok(raw) => {
                if self.committed.as_deref() == Some(raw.as_str()) {
                    return false;
                }
                if let Err(err) = self.store.set_item(&self.key, &raw) {
                    logging::warn!("keeping `{}` in memory only: {err}", self.key);
                }
                self.committed = Some(raw);
            }
            Err(err) => {
                logging::warn!("`{}` could not be serialized, not persisted: {err}", self.key);
                self.committed = None;
            }
        }
        self.value = next;
        self.revision = self.revision.wrapping_add(1);
        self.notify();
        true
    }

    /// Computes the next value from the current one, then behaves like [`Self::set`].
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.value);
        self.set(next)
    }

    /// Removes the key from storage unconditionally and resets to the initial value.
    pub fn purge(&mut self) {
        if let Err(err) = self.store.remove_item(&self.key) {
            logging::warn!("failed to remove `{}`: {err}", self.key);
        }
        let changed = serde_json::to_string(&self.initial).ok() != self.committed;
        self.value = self.initial.clone();
        self.committed = serde_json::to_string(&self.value).ok();
        if changed {
            self.revision = self.revision.wrapping_add(1);
            self.notify();
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.value);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PersistedValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedValue")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
