use std::collections::BTreeMap;
use std::time::Instant;

use lazytree::LazySearchTree;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("LazyTree Performance Test");
    println!("=========================");

    // Test 1: Bulk Insert Performance
    println!("\n1. Bulk Insert Performance Test (reverse order, no queries)");
    let insert_count: u64 = 1_000_000;
    let mut tree = LazySearchTree::new();
    let start = Instant::now();

    for key in (0..insert_count).rev() {
        tree.insert(key);

        if key % 100_000 == 0 && key > 0 {
            let inserted = insert_count - key;
            let elapsed = start.elapsed();
            let ops_per_sec = inserted as f64 / elapsed.as_secs_f64();
            println!("  {} records inserted, {:.0} ops/sec", inserted, ops_per_sec);
        }
    }

    let insert_duration = start.elapsed();
    let insert_ops_per_sec = insert_count as f64 / insert_duration.as_secs_f64();
    let stats = tree.stats();

    println!(
        "  ✅ Inserted {} records in {:?}",
        insert_count, insert_duration
    );
    println!("  📊 Insert rate: {:.0} ops/sec", insert_ops_per_sec);
    println!(
        "  📊 Structure: {} gaps, {} intervals, {} buckets (no sorting yet)",
        stats.gap_count, stats.interval_count, stats.bucket_count
    );

    // Test 2: Few-Query Regime
    println!("\n2. Few-Query Regime Test");
    let query_count = 10;
    let mut probe_rng = StdRng::seed_from_u64(1);

    let start = Instant::now();
    let mut found_count = 0;
    for _ in 0..query_count {
        let key = probe_rng.gen_range(0..insert_count);
        if tree.contains(&key) {
            found_count += 1;
        }
    }
    let query_duration = start.elapsed();
    let stats = tree.stats();

    println!(
        "  ✅ Performed {} queries in {:?} ({} hits)",
        query_count, query_duration, found_count
    );
    println!(
        "  📊 Structure after queries: {} gaps, {} intervals",
        stats.gap_count, stats.interval_count
    );

    // Test 3: Priority-Queue Pattern
    println!("\n3. Priority-Queue Pattern Test (query every key in order)");
    let n: u64 = 100_000;
    let mut keys: Vec<u64> = (1..=n).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(2));

    let mut tree = LazySearchTree::new();
    let build_start = Instant::now();
    for &key in &keys {
        tree.insert(key);
    }
    let build_duration = build_start.elapsed();

    let sweep_start = Instant::now();
    let mut hits = 0u64;
    for key in 1..=n {
        if tree.contains(&key) {
            hits += 1;
        }
    }
    let sweep_duration = sweep_start.elapsed();
    let sweep_ops_per_sec = n as f64 / sweep_duration.as_secs_f64();

    assert_eq!(hits, n);
    println!(
        "  ✅ Built {} keys in {:?}, swept all queries in {:?}",
        n, build_duration, sweep_duration
    );
    println!("  📊 Sweep rate: {:.0} queries/sec", sweep_ops_per_sec);

    // Test 4: Mixed Workload Verification
    println!("\n4. Mixed Workload Verification (vs ordered-map oracle)");
    let op_count = 200_000u32;
    let mut tree = LazySearchTree::new();
    let mut oracle: BTreeMap<u64, usize> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(3);

    let start = Instant::now();
    let mut mismatches = 0u32;
    for _ in 0..op_count {
        let key = rng.gen_range(0..5_000u64);
        if rng.gen::<bool>() {
            tree.insert(key);
            *oracle.entry(key).or_insert(0) += 1;
        } else if tree.contains(&key) != oracle.contains_key(&key) {
            mismatches += 1;
        }
    }
    let mixed_duration = start.elapsed();
    let mixed_ops_per_sec = op_count as f64 / mixed_duration.as_secs_f64();

    println!(
        "  ✅ {} mixed operations in {:?}, {} mismatches",
        op_count, mixed_duration, mismatches
    );
    println!("  📊 Mixed rate: {:.0} ops/sec", mixed_ops_per_sec);

    if mismatches > 0 {
        return Err(format!("{} oracle mismatches", mismatches).into());
    }

    println!("\nAll performance tests completed.");
    Ok(())
}
