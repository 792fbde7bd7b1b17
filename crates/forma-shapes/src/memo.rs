//! Content-addressed cache for windowed computations.
//!
//! Keys hash the operation name, the window, and the exact bits of every
//! sample. Each entry also records a [`Fingerprint`] of its input, and a
//! lookup whose fingerprint differs is treated as a miss, so a hash
//! collision recomputes instead of returning another signal's result. The
//! cache holds at most `capacity` entries and evicts the oldest insertion
//! first.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::rms::sliding_rms;

/// Cache key for `op` over `signal` with `window`.
pub fn content_key(op: &str, signal: &[f64], window: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    op.hash(&mut hasher);
    window.hash(&mut hasher);
    signal.len().hash(&mut hasher);
    for sample in signal {
        sample.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Samples compared at each end of the input on a hit.
const EDGE: usize = 4;

/// Cheap identity check stored next to each entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    op: &'static str,
    window: usize,
    len: usize,
    edges: Vec<u64>,
}

impl Fingerprint {
    fn of(op: &'static str, signal: &[f64], window: usize) -> Self {
        let head = &signal[..signal.len().min(EDGE)];
        let tail = &signal[signal.len().saturating_sub(EDGE)..];
        Self {
            op,
            window,
            len: signal.len(),
            edges: head.iter().chain(tail).map(|s| s.to_bits()).collect(),
        }
    }
}

/// Bounded memo of windowed results.
#[derive(Debug, Default)]
pub struct WindowMemo {
    capacity: usize,
    entries: HashMap<u64, (Fingerprint, Arc<[f64]>)>,
    insertion: VecDeque<u64>,
    hits: u64,
    misses: u64,
}

impl WindowMemo {
    /// Creates a memo holding up to `capacity` results. `0` disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Cached [`sliding_rms`].
    pub fn sliding_rms(&mut self, signal: &[f64], window: usize) -> Arc<[f64]> {
        self.get_or_compute("sliding_rms", signal, window, || sliding_rms(signal, window))
    }

    fn get_or_compute(
        &mut self,
        op: &'static str,
        signal: &[f64],
        window: usize,
        compute: impl FnOnce() -> Vec<f64>,
    ) -> Arc<[f64]> {
        let key = content_key(op, signal, window);
        self.lookup(key, Fingerprint::of(op, signal, window), compute)
    }

    fn lookup(
        &mut self,
        key: u64,
        fingerprint: Fingerprint,
        compute: impl FnOnce() -> Vec<f64>,
    ) -> Arc<[f64]> {
        match self.entries.get(&key) {
            Some((stored, hit)) if *stored == fingerprint => {
                self.hits += 1;
                tracing::trace!(
                    "memo hit: {} window={} len={}",
                    fingerprint.op,
                    fingerprint.window,
                    fingerprint.len
                );
                return Arc::clone(hit);
            }
            Some(_) => tracing::debug!("memo collision on {key:016x}, recomputing"),
            None => {}
        }
        self.misses += 1;
        let value: Arc<[f64]> = Arc::from(compute());
        if self.capacity == 0 {
            return value;
        }
        if self.entries.remove(&key).is_some() {
            self.insertion.retain(|&k| k != key);
        } else if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.insertion.pop_front() {
                self.entries.remove(&oldest);
                tracing::trace!("memo evict: {oldest:016x}");
            }
        }
        self.entries.insert(key, (fingerprint, Arc::clone(&value)));
        self.insertion.push_back(key);
        value
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry and zeroes the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_lookup_hits() {
        let mut memo = WindowMemo::new(4);
        let signal = [1.0, -2.0, 3.0];
        let a = memo.sliding_rms(&signal, 2);
        let b = memo.sliding_rms(&signal, 2);
        assert_eq!(a, b);
        assert_eq!((memo.hits(), memo.misses()), (1, 1));
    }

    #[test]
    fn key_depends_on_every_part() {
        let base = content_key("rms", &[1.0, 2.0], 4);
        assert_ne!(base, content_key("mean", &[1.0, 2.0], 4));
        assert_ne!(base, content_key("rms", &[1.0, 2.5], 4));
        assert_ne!(base, content_key("rms", &[1.0, 2.0], 5));
        assert_eq!(base, content_key("rms", &[1.0, 2.0], 4));
    }

    #[test]
    fn oldest_entry_evicted() {
        let mut memo = WindowMemo::new(2);
        memo.sliding_rms(&[1.0], 1);
        memo.sliding_rms(&[2.0], 1);
        memo.sliding_rms(&[3.0], 1);
        assert_eq!(memo.len(), 2);
        memo.sliding_rms(&[1.0], 1);
        assert_eq!(memo.hits(), 0);
        memo.sliding_rms(&[3.0], 1);
        assert_eq!(memo.hits(), 1);
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let mut memo = WindowMemo::new(0);
        memo.sliding_rms(&[1.0], 1);
        memo.sliding_rms(&[1.0], 1);
        assert_eq!(memo.hits(), 0);
        assert!(memo.is_empty());
    }

    #[test]
    fn colliding_key_recomputes() {
        let mut memo = WindowMemo::new(4);
        let first = [1.0, 2.0, 3.0];
        let second = [-4.0, 5.0];
        let key = content_key("sliding_rms", &first, 2);
        let a = memo.lookup(key, Fingerprint::of("sliding_rms", &first, 2), || {
            sliding_rms(&first, 2)
        });
        // Force the second signal onto the first one's key.
        let b = memo.lookup(key, Fingerprint::of("sliding_rms", &second, 2), || {
            sliding_rms(&second, 2)
        });
        assert_eq!(&*b, sliding_rms(&second, 2).as_slice());
        assert_ne!(a, b);
        assert_eq!((memo.hits(), memo.misses()), (0, 2));
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.insertion.len(), 1);
    }

    #[test]
    fn fingerprint_sees_length_and_edges() {
        let base = Fingerprint::of("sliding_rms", &[1.0, 2.0, 3.0], 2);
        assert_ne!(base, Fingerprint::of("sliding_rms", &[1.0, 2.0, 3.0, 4.0], 2));
        assert_ne!(base, Fingerprint::of("sliding_rms", &[1.0, 2.0, 3.5], 2));
        assert_ne!(base, Fingerprint::of("sliding_rms", &[1.0, 2.0, 3.0], 3));
        assert_eq!(base, Fingerprint::of("sliding_rms", &[1.0, 2.0, 3.0], 2));
    }
}
