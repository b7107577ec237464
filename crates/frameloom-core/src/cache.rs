// crates/frameloom-core/src/cache.rs
//
// BoundedCache: fixed-capacity key→value store with least-recently-used
// eviction and an optional eviction callback.
//
// One implementation backs both of the frame processor's caches (raw pixel
// frames, capacity 10; renderer textures, capacity 5). Entries are held in a
// Vec ordered front = LRU → back = MRU; at those capacities a linear scan
// beats any pointer structure, and eviction order stays trivially auditable.
//
// The eviction callback exists because evicted values may own out-of-band
// resources (a GPU texture handle is worthless as a Rust value — the
// renderer has to be told it is no longer referenced).

use std::hash::Hash;

pub struct BoundedCache<K, V> {
    capacity: usize,
    /// front = least recently used, back = most recently used.
    entries:  Vec<(K, V)>,
    on_evict: Option<Box<dyn FnMut(&K, &V)>>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// A cache that silently drops evicted entries.
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: Vec::new(), on_evict: None }
    }

    /// A cache that runs `on_evict` for every entry pushed out — by capacity
    /// overflow or by `clear()`.
    pub fn with_eviction(capacity: usize, on_evict: impl FnMut(&K, &V) + 'static) -> Self {
        Self {
            capacity: capacity.max(1),
            entries:  Vec::new(),
            on_evict: Some(Box::new(on_evict)),
        }
    }

    pub fn capacity(&self) -> usize { self.capacity }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Look up `key`, marking the entry most-recently-used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(idx);
        self.entries.push(entry);
        self.entries.last().map(|(_, v)| v)
    }

    /// Insert `key → value`. Replaces an existing entry for the same key
    /// (marking it most-recently-used); otherwise evicts the least-recently-
    /// used entry when the cache is at capacity.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(idx) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(idx);
        } else if self.entries.len() >= self.capacity {
            let (k, v) = self.entries.remove(0);
            if let Some(cb) = self.on_evict.as_mut() {
                cb(&k, &v);
            }
        }
        self.entries.push((key, value));
    }

    /// Drop every entry, draining each through the eviction callback.
    pub fn clear(&mut self) {
        for (k, v) in self.entries.drain(..) {
            if let Some(cb) = self.on_evict.as_mut() {
                cb(&k, &v);
            }
        }
    }
}
