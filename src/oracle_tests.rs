//! Stress and oracle tests driving the full structure against an ordered
//! multiset reference, plus comparison-budget and pointer-bound property
//! checks with a counting comparator.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::compare::Compare;
use crate::tree::{LazySearchTree, LazyTreeConfig};

/// A natural u64 ordering that counts every `lt` call, shared through a
/// cloneable handle so a tree and the test can both see the total.
#[derive(Clone)]
struct CountingOrder {
    calls: Rc<Cell<u64>>,
}

impl CountingOrder {
    fn new() -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn total(&self) -> u64 {
        self.calls.get()
    }
}

impl Compare<u64> for CountingOrder {
    fn lt(&self, a: &u64, b: &u64) -> bool {
        self.calls.set(self.calls.get() + 1);
        a < b
    }
}

fn shuffled(n: u64, seed: u64) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}

/// Multiset oracle: key -> copy count.
fn oracle_insert(oracle: &mut BTreeMap<u64, usize>, key: u64) {
    *oracle.entry(key).or_insert(0) += 1;
}

#[test]
fn test_priority_queue_pattern() {
    let mut tree = LazySearchTree::new();
    for key in shuffled(1000, 101) {
        tree.insert(key + 1);
    }
    assert_eq!(tree.len(), 1000);
    for key in 1..=1000u64 {
        assert!(tree.contains(&key), "missing key {}", key);
    }
    assert_eq!(tree.len(), 1000);
    tree.validate();
}

#[test]
fn test_few_query_comparison_budget() {
    let n = 10_000u64;
    let cmp = CountingOrder::new();
    let mut tree = LazySearchTree::with_comparator_and_config(
        cmp.clone(),
        LazyTreeConfig {
            seed: 17,
            pivot_samples: 1,
        },
    );
    for key in shuffled(n, 102) {
        tree.insert(key);
    }
    let insert_comparisons = cmp.total();
    // inserts do no sorting work: a small constant per key
    assert!(
        insert_comparisons <= 12 * n,
        "insert comparisons {} exceed budget",
        insert_comparisons
    );

    let mut probe_rng = StdRng::seed_from_u64(103);
    for _ in 0..10 {
        let key = probe_rng.gen_range(0..n);
        assert!(tree.contains(&key));
    }
    let query_comparisons = cmp.total() - insert_comparisons;
    println!(
        "{} inserts: {} comparisons; 10 queries: {} comparisons",
        n, insert_comparisons, query_comparisons
    );
    // ten queries should cost on the order of n log q, far from a full
    // n log n sort; the constant is generous
    assert!(
        query_comparisons <= 80 * n,
        "query comparisons {} exceed budget",
        query_comparisons
    );
    tree.validate();
}

#[test]
fn test_locator_locality() {
    let n = 2000u64;
    let cmp = CountingOrder::new();
    let mut tree = LazySearchTree::with_comparator_and_config(
        cmp.clone(),
        LazyTreeConfig {
            seed: 23,
            pivot_samples: 1,
        },
    );
    for key in shuffled(n, 104) {
        tree.insert(key);
    }
    // first query pays for restructuring the whole gap
    assert!(tree.contains(&1000));
    // repeats touch only the already-refined neighborhood
    for _ in 0..30 {
        let before = cmp.total();
        assert!(tree.contains(&1000));
        let delta = cmp.total() - before;
        assert!(delta <= 400, "repeat query cost {} comparisons", delta);
    }
    tree.validate();
}

#[test]
fn test_mixed_workload_matches_oracle() {
    let mut tree = LazySearchTree::new();
    let mut oracle: BTreeMap<u64, usize> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(105);
    for step in 0..10_000u32 {
        let key = rng.gen_range(0..500u64);
        if rng.gen::<bool>() {
            tree.insert(key);
            oracle_insert(&mut oracle, key);
        } else {
            assert_eq!(
                tree.contains(&key),
                oracle.contains_key(&key),
                "membership mismatch for {} at step {}",
                key,
                step
            );
        }
        if step % 1000 == 0 {
            tree.validate();
        }
    }
    assert_eq!(tree.len(), oracle.values().sum::<usize>());
    tree.validate();
}

#[test]
fn test_insert_commutativity() {
    let mut base: Vec<u64> = (0..200).collect();
    base.extend([7u64, 7, 7, 50, 50, 199]);
    let mut reversed = base.clone();
    reversed.reverse();
    let mut mixed = base.clone();
    mixed.shuffle(&mut StdRng::seed_from_u64(106));

    for permutation in [base.clone(), reversed, mixed] {
        let mut tree = LazySearchTree::new();
        for key in permutation {
            tree.insert(key);
        }
        assert_eq!(tree.len(), base.len());
        for probe in 0..250u64 {
            assert_eq!(
                tree.contains(&probe),
                probe < 200,
                "membership of {} depends on insertion order",
                probe
            );
        }
        tree.validate();
    }
}

#[test]
fn test_query_stability() {
    let mut tree = LazySearchTree::new();
    let mut oracle: BTreeMap<u64, usize> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(107);
    for _ in 0..500 {
        let key = rng.gen_range(0..300u64);
        tree.insert(key);
        oracle_insert(&mut oracle, key);
    }
    for probe in (0..300u64).step_by(7) {
        let first = tree.contains(&probe);
        let second = tree.contains(&probe);
        assert_eq!(first, second, "unstable answer for {}", probe);
        assert_eq!(first, oracle.contains_key(&probe));
        tree.validate();
    }
}

#[test]
fn test_pointer_bound() {
    let n = 5000u64;
    let q = 25u32;
    let mut tree = LazySearchTree::new();
    for key in shuffled(n, 108) {
        tree.insert(key);
    }
    // before any query the whole tree is one unsorted interval
    let stats = tree.stats();
    assert_eq!(stats.gap_count, 1);
    assert_eq!(stats.interval_count, 1);

    let mut rng = StdRng::seed_from_u64(109);
    for _ in 0..q {
        let key = rng.gen_range(0..n);
        tree.contains(&key);
    }
    let stats = tree.stats();
    let log_n = (n as f64).log2() + 2.0;
    let bound = (8.0 * ((q + 1) as f64) * log_n).min(8.0 * n as f64) as usize;
    assert!(
        stats.interval_count <= bound,
        "interval count {} exceeds pointer bound {}",
        stats.interval_count,
        bound
    );
    assert!(
        stats.bucket_count <= 2 * bound,
        "bucket count {} exceeds pointer bound {}",
        stats.bucket_count,
        2 * bound
    );
    tree.validate();
}

#[test]
fn test_repeated_queries_on_duplicates() {
    let mut tree = LazySearchTree::new();
    for _ in 0..500 {
        tree.insert(7u64);
    }
    for _ in 0..50 {
        assert!(tree.contains(&7));
        assert!(!tree.contains(&6));
    }
    assert_eq!(tree.len(), 500);
    let stats = tree.stats();
    assert_eq!(stats.key_count, 500);
    tree.validate();
}

proptest! {
    #[test]
    fn prop_matches_oracle(ops in proptest::collection::vec((any::<bool>(), 0u8..50), 0..400)) {
        let mut tree = LazySearchTree::new();
        let mut oracle: BTreeMap<u64, usize> = BTreeMap::new();
        for (is_insert, key) in ops {
            let key = key as u64;
            if is_insert {
                tree.insert(key);
                oracle_insert(&mut oracle, key);
            } else {
                prop_assert_eq!(tree.contains(&key), oracle.contains_key(&key));
            }
        }
        prop_assert_eq!(tree.len(), oracle.values().sum::<usize>());
        tree.validate();
    }
}
