//! The lazy search tree driver
//!
//! Holds the ordered set of gaps and routes operations to the gap that owns
//! the queried region. Inserts only append; queries answer membership and
//! then pay down sorting debt by restructuring the queried gap into two
//! finer gaps. After n inserts and q queries the structure has performed
//! O(min(n log n, n log q + q log n)) comparisons and holds
//! O(min(n, q log n)) pointers.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::compare::{Compare, NaturalOrder};
use crate::gap::{gap_order, probe_order, Gap};
use crate::interval::Interval;
use crate::splay::SplayTree;

/// Configuration for a lazy search tree.
#[derive(Debug, Clone)]
pub struct LazyTreeConfig {
    /// Seed for the tree-owned PRNG driving pivot selection and equal-key
    /// coin flips. Fixed by default so runs are reproducible.
    pub seed: u64,
    /// Number of uniform samples per pivot choice; the median is used. Must
    /// be odd. 1 picks a single sample.
    pub pivot_samples: usize,
}

impl Default for LazyTreeConfig {
    fn default() -> Self {
        Self {
            seed: 0x9E37_79B9_7F4A_7C15,
            pivot_samples: 1,
        }
    }
}

/// A point-in-time snapshot of the structure's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyTreeStats {
    /// Live keys.
    pub key_count: usize,
    /// Gaps in the ordering structure.
    pub gap_count: usize,
    /// Intervals across all gaps.
    pub interval_count: usize,
    /// Key buckets across all interval chains.
    pub bucket_count: usize,
}

/// An ordered dictionary that defers sorting work until queries demand it.
///
/// Keys are compared exclusively through the supplied comparator. The
/// structure keeps a multiset: duplicates count toward `len` and membership
/// holds while at least one copy is present. Queries mutate the structure,
/// so `contains` takes `&mut self`.
#[derive(Debug)]
pub struct LazySearchTree<K, C = NaturalOrder> {
    cmp: C,
    gaps: SplayTree<Gap<K>>,
    len: usize,
    rng: StdRng,
    config: LazyTreeConfig,
}

impl<K: Clone + Ord> LazySearchTree<K, NaturalOrder> {
    /// Create an empty tree ordered by the key type's `Ord` instance.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Create an empty naturally ordered tree with explicit configuration.
    pub fn with_config(config: LazyTreeConfig) -> Self {
        Self::with_comparator_and_config(NaturalOrder, config)
    }
}

impl<K: Clone + Ord> Default for LazySearchTree<K, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, C: Compare<K>> LazySearchTree<K, C> {
    /// Create an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_and_config(cmp, LazyTreeConfig::default())
    }

    /// Create an empty tree ordered by `cmp` with explicit configuration.
    pub fn with_comparator_and_config(cmp: C, config: LazyTreeConfig) -> Self {
        assert!(
            config.pivot_samples % 2 == 1,
            "pivot_samples must be odd"
        );
        Self {
            cmp,
            gaps: SplayTree::new(),
            len: 0,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Insert a key. O(log gap-count) to find the gap plus O(1) within it;
    /// no sorting work happens.
    pub fn insert(&mut self, key: K) {
        let cmp = &self.cmp;
        if self.gaps.is_empty() {
            self.gaps
                .insert_by(Gap::singleton(key), |a, b| gap_order(cmp, a, b));
        } else {
            let gap = self
                .gaps
                .lower_bound_or_last_by_mut(|g| probe_order(cmp, &key, g))
                .expect("gap set is non-empty");
            // the locator places the key inside the gap's span, or extends
            // an end gap; neither reorders the gap among its neighbors
            gap.insert(key, cmp);
        }
        self.len += 1;
    }

    /// Whether at least one copy of `key` is present.
    ///
    /// Answering also restructures: the gap owning the queried position is
    /// taken out of the ordering structure, split around the key, and the
    /// non-empty halves are reinserted. Repeating a query is cheap.
    pub fn contains(&mut self, key: &K) -> bool {
        if self.gaps.is_empty() {
            return false;
        }
        let cmp = &self.cmp;
        let mut gap = self
            .gaps
            .take_lower_bound_or_last_by(|g| probe_order(cmp, key, g))
            .expect("gap set is non-empty");
        let found = gap.contains(key, cmp);
        let (lesser, greater) =
            gap.restructure(key, cmp, &mut self.rng, self.config.pivot_samples);
        if !lesser.is_empty() {
            self.gaps.insert_by(lesser, |a, b| gap_order(cmp, a, b));
        }
        if !greater.is_empty() {
            self.gaps.insert_by(greater, |a, b| gap_order(cmp, a, b));
        }
        found
    }

    /// Number of live keys, counting duplicates.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest key, if any. Does not restructure.
    pub fn min(&self) -> Option<&K> {
        self.gaps.min().map(Gap::min)
    }

    /// Largest key, if any. Does not restructure.
    pub fn max(&self) -> Option<&K> {
        self.gaps.max().map(Gap::max)
    }

    /// The active configuration.
    pub fn config(&self) -> &LazyTreeConfig {
        &self.config
    }

    /// Snapshot the structure's shape. Walks every gap; O(gap count).
    pub fn stats(&self) -> LazyTreeStats {
        let mut stats = LazyTreeStats {
            key_count: self.len,
            gap_count: 0,
            interval_count: 0,
            bucket_count: 0,
        };
        for gap in self.gaps.iter() {
            stats.gap_count += 1;
            stats.interval_count += gap.intervals().len();
            stats.bucket_count += gap
                .intervals()
                .iter()
                .map(Interval::bucket_count)
                .sum::<usize>();
        }
        stats
    }

    /// Verify every structural invariant: per-interval chain consistency,
    /// per-gap ordering and lengths, cross-gap ordering, non-emptiness, and
    /// the total count. O(n); a test and debugging aid.
    ///
    /// # Panics
    ///
    /// Panics on any violated invariant.
    #[cfg(any(test, debug_assertions))]
    pub fn validate(&self) {
        let cmp = &self.cmp;
        let mut total = 0usize;
        let mut prev_max: Option<&K> = None;
        for gap in self.gaps.iter() {
            assert!(!gap.is_empty(), "empty gap resident in ordering structure");
            gap.assert_consistent(cmp);
            if let Some(prev) = prev_max {
                assert!(cmp.le(prev, gap.min()), "gap ordering violated");
            }
            prev_max = Some(gap.max());
            total += gap.len();
        }
        assert_eq!(total, self.len, "key count mismatch");
    }

    /// The gap ordering structure, for structure-level tests.
    #[cfg(test)]
    pub(crate) fn gaps(&self) -> &SplayTree<Gap<K>> {
        &self.gaps
    }
}
