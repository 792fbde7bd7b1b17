//! Append-only named stream storage.
//!
//! A [`StreamStore`] maps stream names to growable `f64` sequences. Nodes
//! resolve names to [`StreamId`] handles once, at attach time, and then read
//! and append through the handles every tick.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::GraphError;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Handle to one stream inside a specific [`StreamStore`].
///
/// Handles are only meaningful for the store that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(usize);

impl StreamId {
    /// Position of the stream in its store's creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Mapping from stream name to an append-only sample sequence.
///
/// Streams are only ever extended at the end; no operation rewrites or
/// removes a sample once it has been appended. Each store carries a unique
/// identity so graphs can detect when they are moved to a different store.
#[derive(Debug)]
pub struct StreamStore {
    identity: u64,
    index: HashMap<String, StreamId>,
    names: Vec<String>,
    streams: Vec<Vec<f64>>,
}

impl Default for StreamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StreamStore {
    /// Copies every stream into a store with a fresh identity.
    fn clone(&self) -> Self {
        Self {
            identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
            index: self.index.clone(),
            names: self.names.clone(),
            streams: self.streams.clone(),
        }
    }
}

impl StreamStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
            index: HashMap::new(),
            names: Vec::new(),
            streams: Vec::new(),
        }
    }

    /// Unique identity of this store instance.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Returns the handle for `name`, creating an empty stream if absent.
    pub fn get_or_create(&mut self, name: &str) -> StreamId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = StreamId(self.streams.len());
        self.index.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.streams.push(Vec::new());
        id
    }

    /// Looks up the handle for `name`.
    pub fn id_of(&self, name: &str) -> Option<StreamId> {
        self.index.get(name).copied()
    }

    /// Whether a stream called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Name of the stream behind `id`.
    pub fn name_of(&self, id: StreamId) -> &str {
        &self.names[id.0]
    }

    /// Appends one sample.
    pub fn append(&mut self, id: StreamId, value: f64) {
        self.streams[id.0].push(value);
    }

    /// Appends every sample from `values`.
    pub fn extend(&mut self, id: StreamId, values: impl IntoIterator<Item = f64>) {
        self.streams[id.0].extend(values);
    }

    /// Creates `name` if needed and appends `values` to it.
    ///
    /// Drivers use this to provide externally supplied streams before the
    /// first tick.
    pub fn seed(&mut self, name: &str, values: impl IntoIterator<Item = f64>) -> StreamId {
        let id = self.get_or_create(name);
        self.extend(id, values);
        id
    }

    /// Number of samples in the stream.
    pub fn len(&self, id: StreamId) -> usize {
        self.streams[id.0].len()
    }

    /// The most recent `k` samples, oldest first.
    ///
    /// Shorter than `k` when the stream is shorter; never padded.
    pub fn tail(&self, id: StreamId, k: usize) -> &[f64] {
        let stream = &self.streams[id.0];
        &stream[stream.len().saturating_sub(k)..]
    }

    /// The newest sample, if any.
    pub fn last(&self, id: StreamId) -> Option<f64> {
        self.streams[id.0].last().copied()
    }

    /// Full history of a stream by handle.
    pub fn history(&self, id: StreamId) -> &[f64] {
        &self.streams[id.0]
    }

    /// Full history of a stream by name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StreamNotFound`] if no stream has that name.
    pub fn samples(&self, name: &str) -> Result<&[f64], GraphError> {
        self.id_of(name)
            .map(|id| self.history(id))
            .ok_or_else(|| GraphError::StreamNotFound(name.to_string()))
    }

    /// Stream names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of streams held.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_idempotent() {
        let mut store = StreamStore::new();
        let a = store.get_or_create("x");
        let b = store.get_or_create("x");
        assert_eq!(a, b);
        assert_eq!(store.stream_count(), 1);
        assert_eq!(store.len(a), 0);
    }

    #[test]
    fn tail_is_not_padded() {
        let mut store = StreamStore::new();
        let id = store.seed("x", [1.0, 2.0, 3.0]);
        assert_eq!(store.tail(id, 2), &[2.0, 3.0]);
        assert_eq!(store.tail(id, 10), &[1.0, 2.0, 3.0]);
        assert!(store.tail(id, 0).is_empty());
    }

    #[test]
    fn append_only_growth() {
        let mut store = StreamStore::new();
        let id = store.get_or_create("x");
        store.append(id, 0.5);
        store.append(id, -0.5);
        assert_eq!(store.history(id), &[0.5, -0.5]);
        assert_eq!(store.last(id), Some(-0.5));
    }

    #[test]
    fn samples_missing_stream() {
        let store = StreamStore::new();
        assert_eq!(
            store.samples("nope"),
            Err(GraphError::StreamNotFound("nope".to_string()))
        );
    }

    #[test]
    fn identities_are_unique() {
        let store = StreamStore::new();
        let other = StreamStore::new();
        let copy = store.clone();
        assert_ne!(store.identity(), other.identity());
        assert_ne!(store.identity(), copy.identity());
    }

    #[test]
    fn names_in_creation_order() {
        let mut store = StreamStore::new();
        store.get_or_create("b");
        store.get_or_create("a");
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(store.name_of(StreamId(1)), "a");
    }
}
