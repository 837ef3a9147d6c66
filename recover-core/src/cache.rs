// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Cache
//!
//! Memo table shared by the backup store and the contact resolver.
//! A value is computed at most once per key per session: a caller that
//! asks for a key whose computation is still running waits for it and
//! receives the same result. Failures are handed to every waiter but are
//! not stored, so a later request computes again.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::error::{RecoverError, RecoverResult};

enum Entry<V> {
    Ready(V),
    Pending(Arc<Flight<V>>),
}

/// A computation in progress that other callers can wait on.
struct Flight<V> {
    result: Mutex<Option<RecoverResult<V>>>,
    done: Condvar,
}

impl<V: Clone> Flight<V> {
    fn new() -> Self {
        Flight {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, result: RecoverResult<V>) {
        let mut slot = self.result.lock();
        if slot.is_none() {
            *slot = Some(result);
        }
        self.done.notify_all();
    }

    fn wait(&self) -> RecoverResult<V> {
        let mut slot = self.result.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut slot);
        }
    }
}

struct Inner<K, V> {
    generation: u64,
    entries: HashMap<K, Entry<V>>,
}

/// Single-flight memo table scoped to one session.
pub struct SessionCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> Default for SessionCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SessionCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        SessionCache {
            inner: Mutex::new(Inner {
                generation: 0,
                entries: HashMap::new(),
            }),
        }
    }

    /// Returns the stored value for `key`, if its computation has finished.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.inner.lock().entries.get(key) {
            Some(Entry::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns true if a value for `key` is stored.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored values (pending computations are not counted).
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|entry| matches!(entry, Entry::Ready(_)))
            .count()
    }

    /// Returns true if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value for `key`, computing it with `init` if needed.
    ///
    /// `init` runs without the cache lock held. Concurrent callers for the
    /// same key block until the first computation finishes.
    pub fn get_or_try_insert_with<F>(&self, key: K, init: F) -> RecoverResult<V>
    where
        F: FnOnce() -> RecoverResult<V>,
    {
        let (flight, generation) = {
            let mut inner = self.inner.lock();
            let pending = match inner.entries.get(&key) {
                Some(Entry::Ready(value)) => {
                    debug!(?key, "session cache hit");
                    return Ok(value.clone());
                }
                Some(Entry::Pending(flight)) => Some(Arc::clone(flight)),
                None => None,
            };
            if let Some(flight) = pending {
                drop(inner);
                debug!(?key, "joining in-flight computation");
                return flight.wait();
            }

            let flight = Arc::new(Flight::new());
            inner
                .entries
                .insert(key.clone(), Entry::Pending(Arc::clone(&flight)));
            (flight, inner.generation)
        };

        let mut guard = FlightGuard {
            cache: self,
            key: Some(key),
            generation,
            flight,
        };
        let result = init();
        guard.finish(result.clone());
        result
    }

    /// Forgets every stored value.
    ///
    /// Computations already running still hand their result to their
    /// waiters, but the result is not stored in the new session.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.entries.clear();
    }

    fn settle(&self, key: K, generation: u64, flight: &Arc<Flight<V>>, result: &RecoverResult<V>) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }
        let owns_entry = matches!(
            inner.entries.get(&key),
            Some(Entry::Pending(current)) if Arc::ptr_eq(current, flight)
        );
        if !owns_entry {
            return;
        }
        match result {
            Ok(value) => {
                inner.entries.insert(key, Entry::Ready(value.clone()));
            }
            Err(_) => {
                inner.entries.remove(&key);
            }
        }
    }
}

/// Publishes the result of a computation, also when `init` unwinds.
struct FlightGuard<'a, K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    cache: &'a SessionCache<K, V>,
    key: Option<K>,
    generation: u64,
    flight: Arc<Flight<V>>,
}

impl<K, V> FlightGuard<'_, K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn finish(&mut self, result: RecoverResult<V>) {
        if let Some(key) = self.key.take() {
            self.cache
                .settle(key, self.generation, &self.flight, &result);
            self.flight.complete(result);
        }
    }
}

impl<K, V> Drop for FlightGuard<'_, K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn drop(&mut self) {
        self.finish(Err(RecoverError::Io("computation aborted".to_string())));
    }
}
