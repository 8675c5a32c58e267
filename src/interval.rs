//! Intervals: loosely ordered key buckets with tracked boundaries
//!
//! An interval is a bag of keys whose maximum and minimum are known but whose
//! internal order is not. Intervals require a linked list data structure for
//! O(1) merging, but by chaining vectors instead of single elements the
//! structure takes advantage of bulk-built intervals and batched inserts,
//! keeping the total pointer count at O(min(n, q log n)).

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::LinkedList;

use crate::compare::Compare;

/// Tracked boundary keys of a non-empty interval.
#[derive(Debug, Clone)]
struct Bounds<K> {
    min: K,
    max: K,
}

/// A bag of keys with known max/min boundaries and unconstrained internal
/// order. The unit of bulk movement and merging inside a gap.
#[derive(Debug, Clone)]
pub struct Interval<K> {
    /// Total number of keys across the chain.
    len: usize,
    /// Boundary keys; `None` exactly when the interval is empty.
    bounds: Option<Bounds<K>>,
    /// Chain of key buckets. Merging splices chains in O(1).
    chain: LinkedList<Vec<K>>,
}

impl<K: Clone> Interval<K> {
    /// Create an interval holding a single key.
    pub fn single(key: K) -> Self {
        let mut chain = LinkedList::new();
        chain.push_back(vec![key.clone()]);
        Self {
            len: 1,
            bounds: Some(Bounds {
                min: key.clone(),
                max: key,
            }),
            chain,
        }
    }

    /// Create an interval absorbing a vector of keys, scanning once for the
    /// boundary keys. An empty vector produces an empty interval.
    pub fn from_keys<C: Compare<K>>(keys: Vec<K>, cmp: &C) -> Self {
        if keys.is_empty() {
            return Self {
                len: 0,
                bounds: None,
                chain: LinkedList::new(),
            };
        }
        let mut min = keys[0].clone();
        let mut max = keys[0].clone();
        for key in &keys[1..] {
            if cmp.lt(key, &min) {
                min = key.clone();
            }
            if cmp.lt(&max, key) {
                max = key.clone();
            }
        }
        let len = keys.len();
        let mut chain = LinkedList::new();
        chain.push_back(keys);
        Self {
            len,
            bounds: Some(Bounds { min, max }),
            chain,
        }
    }

    /// Insert a single key. Which bucket receives it does not matter; the
    /// front bucket keeps the operation O(1).
    pub fn insert_one<C: Compare<K>>(&mut self, key: K, cmp: &C) {
        match &mut self.bounds {
            None => {
                self.bounds = Some(Bounds {
                    min: key.clone(),
                    max: key.clone(),
                });
            }
            Some(bounds) => {
                if cmp.lt(&key, &bounds.min) {
                    bounds.min = key.clone();
                }
                if cmp.lt(&bounds.max, &key) {
                    bounds.max = key.clone();
                }
            }
        }
        if self.chain.is_empty() {
            self.chain.push_back(Vec::new());
        }
        self.chain.front_mut().expect("chain is non-empty").push(key);
        self.len += 1;
    }

    /// Merge `other` into this interval by splicing its chain onto the end.
    /// O(1) regardless of either interval's size.
    pub fn merge_from<C: Compare<K>>(&mut self, mut other: Interval<K>, cmp: &C) {
        let other_bounds = match other.bounds.take() {
            Some(bounds) => bounds,
            None => return,
        };
        match &mut self.bounds {
            None => self.bounds = Some(other_bounds),
            Some(bounds) => {
                if cmp.lt(&other_bounds.min, &bounds.min) {
                    bounds.min = other_bounds.min;
                }
                if cmp.lt(&bounds.max, &other_bounds.max) {
                    bounds.max = other_bounds.max;
                }
            }
        }
        self.len += other.len;
        self.chain.append(&mut other.chain);
    }

    /// Return a key drawn uniformly at random from the interval.
    ///
    /// Correct under non-uniform bucket sizes: a global index is drawn and
    /// the chain is walked until the bucket containing it is found.
    ///
    /// # Panics
    ///
    /// Panics if the interval is empty.
    pub fn sample(&self, rng: &mut StdRng) -> &K {
        assert!(self.len > 0, "sample() on empty interval");
        let mut idx = rng.gen_range(0..self.len);
        for bucket in &self.chain {
            if idx < bucket.len() {
                return &bucket[idx];
            }
            idx -= bucket.len();
        }
        unreachable!("bucket lengths sum to interval length")
    }

    /// Partition into `(lesser, greater)` around `pivot`: keys strictly less
    /// go left, strictly greater go right, and each equal key is assigned by
    /// an independent coin flip. O(len).
    pub fn pivot<C: Compare<K>>(
        self,
        pivot: &K,
        cmp: &C,
        rng: &mut StdRng,
    ) -> (Interval<K>, Interval<K>) {
        let mut lesser = Vec::new();
        let mut greater = Vec::new();
        for bucket in self.chain {
            for key in bucket {
                if cmp.lt(&key, pivot) {
                    lesser.push(key);
                } else if cmp.lt(pivot, &key) {
                    greater.push(key);
                } else if rng.gen::<bool>() {
                    lesser.push(key);
                } else {
                    greater.push(key);
                }
            }
        }
        (
            Interval::from_keys(lesser, cmp),
            Interval::from_keys(greater, cmp),
        )
    }

    /// Linear membership scan using comparator-derived equality. Only called
    /// once a query has been localized to this interval.
    pub fn contains<C: Compare<K>>(&self, key: &K, cmp: &C) -> bool {
        self.chain
            .iter()
            .flatten()
            .any(|stored| cmp.eq(stored, key))
    }

    /// Largest key stored.
    ///
    /// # Panics
    ///
    /// Panics if the interval is empty.
    pub fn max(&self) -> &K {
        &self.bounds.as_ref().expect("max() on empty interval").max
    }

    /// Smallest key stored.
    ///
    /// # Panics
    ///
    /// Panics if the interval is empty.
    pub fn min(&self) -> &K {
        &self.bounds.as_ref().expect("min() on empty interval").min
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the interval holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets in the chain.
    pub fn bucket_count(&self) -> usize {
        self.chain.len()
    }

    /// Verify chain consistency: the length matches the bucket contents and
    /// the tracked bounds are the true extremes. Test and debug aid.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn assert_consistent<C: Compare<K>>(&self, cmp: &C) {
        let total: usize = self.chain.iter().map(Vec::len).sum();
        assert_eq!(self.len, total, "interval length mismatch");
        assert_eq!(self.len > 0, self.bounds.is_some());
        if let Some(bounds) = &self.bounds {
            for key in self.chain.iter().flatten() {
                assert!(cmp.le(&bounds.min, key), "key below tracked min");
                assert!(cmp.le(key, &bounds.max), "key above tracked max");
            }
            assert!(
                self.chain.iter().flatten().any(|k| cmp.eq(k, &bounds.min)),
                "tracked min not present"
            );
            assert!(
                self.chain.iter().flatten().any(|k| cmp.eq(k, &bounds.max)),
                "tracked max not present"
            );
        }
    }
}
