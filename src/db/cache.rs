//! Bounded cache of radius query results.
//!
//! Entries are kept in access order in an intrusive doubly linked list
//! threaded through a slot vector, so touch, insert and evict are all O(1).
//! When an insert pushes the cache past `max_size`, the `expunge_size`
//! least recently accessed entries are dropped in one round.

use crate::config::CacheConfig;
use crate::error::Result;
use rustc_hash::FxHashMap;

/// Exact `(x, y, R)` cache key.
///
/// Values are compared bit for bit, so logically equal queries that differ
/// in the last ulp miss the cache. `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    x: u64,
    y: u64,
    r: u64,
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl QueryKey {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self {
            x: canonical_bits(x),
            y: canonical_bits(y),
            r: canonical_bits(r),
        }
    }

    pub fn x(&self) -> f64 {
        f64::from_bits(self.x)
    }

    pub fn y(&self) -> f64 {
        f64::from_bits(self.y)
    }

    pub fn r(&self) -> f64 {
        f64::from_bits(self.r)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    key: QueryKey,
    value: V,
    last_access: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Access-ordered result cache.
///
/// Access times come from a logical clock that ticks on every read hit and
/// write, so "oldest" is well defined even within one clock tick of the OS.
/// Not synchronized; share it behind the store's lock.
#[derive(Debug, Clone)]
pub struct ResultCache<V> {
    index: FxHashMap<QueryKey, usize>,
    slots: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    /// Least recently accessed.
    head: Option<usize>,
    /// Most recently accessed.
    tail: Option<usize>,
    max_size: usize,
    expunge_size: usize,
    clock: u64,
}

impl<V> ResultCache<V> {
    /// Fails with a configuration error unless `max_size > 2` and
    /// `expunge_size < max_size`.
    pub fn new(max_size: usize, expunge_size: usize) -> Result<Self> {
        CacheConfig::new(max_size, expunge_size).validate()?;
        Ok(Self {
            index: FxHashMap::default(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            max_size,
            expunge_size,
            clock: 0,
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.max_size, config.expunge_size)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn expunge_size(&self) -> usize {
        self.expunge_size
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.index.contains_key(key)
    }

    /// Look up `key` and mark it as the most recently accessed entry.
    pub fn get(&mut self, key: &QueryKey) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.touch(slot);
        log::trace!(
            "Cache hit for ({}, {}, {})",
            key.x(),
            key.y(),
            key.r()
        );
        self.slots[slot].as_ref().map(|entry| &entry.value)
    }

    /// Look up `key` without affecting eviction order.
    pub fn peek(&self, key: &QueryKey) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_ref().map(|entry| &entry.value)
    }

    /// Logical access time of `key`, if cached.
    pub fn last_access(&self, key: &QueryKey) -> Option<u64> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_ref().map(|entry| entry.last_access)
    }

    /// Store `value` under `key` as the most recently accessed entry.
    ///
    /// Returns the previous value for `key`. If the cache now holds more than
    /// `max_size` entries, the `expunge_size` oldest are evicted.
    pub fn insert(&mut self, key: QueryKey, value: V) -> Option<V> {
        if let Some(&slot) = self.index.get(&key) {
            self.touch(slot);
            return self.slots[slot]
                .as_mut()
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        self.clock += 1;
        let entry = Entry {
            key,
            value,
            last_access: self.clock,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
        self.push_back(slot);

        if self.len() > self.max_size {
            self.expunge();
        }
        None
    }

    pub fn remove(&mut self, key: &QueryKey) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.unlink(slot);
        self.free.push(slot);
        self.slots[slot].take().map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Cached keys, least recently accessed first.
    pub fn keys_by_age(&self) -> Vec<QueryKey> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            match &self.slots[slot] {
                Some(entry) => {
                    keys.push(entry.key);
                    cursor = entry.next;
                }
                None => break,
            }
        }
        keys
    }

    fn expunge(&mut self) {
        let mut evicted = 0;
        while evicted < self.expunge_size {
            let Some(oldest) = self.head else { break };
            let Some(key) = self.slots[oldest].as_ref().map(|entry| entry.key) else {
                break;
            };
            self.remove(&key);
            evicted += 1;
        }
        log::debug!(
            "Result cache exceeded {} entries, evicted {} oldest",
            self.max_size,
            evicted
        );
    }

    fn touch(&mut self, slot: usize) {
        self.clock += 1;
        if let Some(entry) = self.slots[slot].as_mut() {
            entry.last_access = self.clock;
        }
        if self.tail != Some(slot) {
            self.unlink(slot);
            self.push_back(slot);
        }
    }

    fn unlink(&mut self, slot: usize) {
        let Some(entry) = self.slots[slot].as_mut() else {
            return;
        };
        let (prev, next) = (entry.prev.take(), entry.next.take());

        match prev {
            Some(p) => {
                if let Some(e) = self.slots[p].as_mut() {
                    e.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(e) = self.slots[n].as_mut() {
                    e.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn push_back(&mut self, slot: usize) {
        let old_tail = self.tail;
        if let Some(entry) = self.slots[slot].as_mut() {
            entry.prev = old_tail;
            entry.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(e) = self.slots[t].as_mut() {
                    e.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }
}
