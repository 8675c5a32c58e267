//! Gaps: loosely sorted interval sequences over a contiguous keyspace range
//!
//! A gap owns an ordered sequence of intervals; every key in `intervals[i]`
//! is at most every key in `intervals[i+1]` under the weak-max rule. Queries
//! restructure a gap into two finer gaps around the queried key; the
//! rebalance procedure keeps interval sizes decaying geometrically outward
//! so a gap never holds more than O(log len) intervals.

use rand::rngs::StdRng;
use smallvec::SmallVec;
use std::cmp::Ordering;

use crate::compare::Compare;
use crate::interval::Interval;

/// Intervals held inline before a gap spills to the heap. A gap holds
/// O(log len) intervals, so most gaps never spill.
const INTERVAL_INLINE_SIZE: usize = 8;

/// The interval sequence of a gap.
pub(crate) type IntervalSeq<K> = SmallVec<[Interval<K>; INTERVAL_INLINE_SIZE]>;

/// A contiguous region of the sorted keyspace whose internal order is only
/// loosely known. The unit of query-driven restructuring.
#[derive(Debug, Clone)]
pub struct Gap<K> {
    /// Total keys across all intervals.
    len: usize,
    /// Cached interval index from the previous locate, also refreshed by
    /// rebalance with the boundary of the left-side merge pass.
    last_left_idx: usize,
    /// The sorted interval sequence; never contains an empty interval.
    intervals: IntervalSeq<K>,
}

impl<K: Clone> Gap<K> {
    /// Create a gap holding a single key in a single interval.
    pub fn singleton(key: K) -> Self {
        let mut intervals = IntervalSeq::new();
        intervals.push(Interval::single(key));
        Self {
            len: 1,
            last_left_idx: 0,
            intervals,
        }
    }

    /// Build a gap from a sequence of intervals, dropping empty ones, then
    /// rebalance. The inputs must be ordered under the weak-max rule.
    pub fn from_intervals<C, I>(intervals: I, cmp: &C) -> Self
    where
        C: Compare<K>,
        I: IntoIterator<Item = Interval<K>>,
    {
        let mut gap = Self {
            len: 0,
            last_left_idx: 0,
            intervals: IntervalSeq::new(),
        };
        for interval in intervals {
            if !interval.is_empty() {
                gap.len += interval.len();
                gap.intervals.push(interval);
            }
        }
        gap.rebalance(cmp);
        gap
    }

    /// Index of the smallest interval whose max is at least `key`, or the
    /// last index if `key` exceeds every maximum.
    ///
    /// Probes exponentially outward from the cached index, then binary
    /// searches the bracketed range. Cost O(log d) in the distance from the
    /// previous locate. The cache is updated with the returned index.
    pub fn locate<C: Compare<K>>(&mut self, key: &K, cmp: &C) -> usize {
        let m = self.intervals.len() as i64;
        debug_assert!(m > 0, "locate() on empty gap");
        let mut lo = self.last_left_idx.min(self.intervals.len() - 1) as i64;

        // true: key <= max at the probe, search leftward; else rightward
        let init = !cmp.lt(self.intervals[lo as usize].max(), key);
        let mult: i64 = if init { -1 } else { 1 };

        // exponential probe, clamped to the [-1, m] sentinels
        let mut hi;
        let mut step = 0u32;
        loop {
            hi = lo + mult * (1i64 << step);
            if hi < 0 {
                hi = -1;
                break;
            }
            if hi >= m {
                hi = m;
                break;
            }
            if init != !cmp.lt(self.intervals[hi as usize].max(), key) {
                break;
            }
            step += 1;
        }

        // binary search the bracket; the condition matches `init` at lo and
        // differs at hi (or hi is a sentinel)
        let idx = loop {
            if (hi - lo).abs() <= 1 {
                if init || hi == m {
                    break lo as usize;
                }
                break hi as usize;
            }
            let mid = (lo + hi) / 2;
            if init == !cmp.lt(self.intervals[mid as usize].max(), key) {
                lo = mid;
            } else {
                hi = mid;
            }
        };

        self.last_left_idx = idx;
        idx
    }

    /// Insert a key into the interval the locator selects.
    pub fn insert<C: Compare<K>>(&mut self, key: K, cmp: &C) {
        let idx = self.locate(&key, cmp);
        self.intervals[idx].insert_one(key, cmp);
        self.len += 1;
    }

    /// Answer membership for `key`. Restructuring is the caller's business;
    /// this only locates and scans the one candidate interval.
    pub fn contains<C: Compare<K>>(&mut self, key: &K, cmp: &C) -> bool {
        let idx = self.locate(key, cmp);
        self.intervals[idx].contains(key, cmp)
    }

    /// Split this gap around `key` into a lesser and a greater gap.
    ///
    /// The located interval is pivoted around `key`; the lesser fragment is
    /// split toward its right edge and the greater fragment toward its left
    /// edge, so interval sizes shrink toward the queried position. Remaining
    /// intervals transfer wholesale. Either output may be empty; both are
    /// rebalanced by construction.
    pub fn restructure<C: Compare<K>>(
        mut self,
        key: &K,
        cmp: &C,
        rng: &mut StdRng,
        pivot_samples: usize,
    ) -> (Gap<K>, Gap<K>) {
        let idx = self.locate(key, cmp);
        let mut intervals = std::mem::take(&mut self.intervals);
        let target = intervals.remove(idx);
        let tail: IntervalSeq<K> = intervals.drain(idx..).collect();

        let (lesser_half, greater_half) = target.pivot(key, cmp, rng);
        let left_pieces = split(lesser_half, false, cmp, rng, pivot_samples);
        let right_pieces = split(greater_half, true, cmp, rng, pivot_samples);

        let lesser = Gap::from_intervals(intervals.into_iter().chain(left_pieces), cmp);
        let greater = Gap::from_intervals(right_pieces.into_iter().chain(tail), cmp);
        (lesser, greater)
    }

    /// Merge adjacent intervals from both ends until interval sizes decay
    /// geometrically outward from the midpoint, bounding the interval count
    /// at O(log len). The forward pass boundary becomes the new locator
    /// hint. Precondition: no interval is empty.
    fn rebalance<C: Compare<K>>(&mut self, cmp: &C) {
        let total = self.len;
        self.last_left_idx = merge_pass(&mut self.intervals, total, cmp);
        self.intervals.reverse();
        merge_pass(&mut self.intervals, total, cmp);
        self.intervals.reverse();
        if !self.intervals.is_empty() {
            self.last_left_idx = self.last_left_idx.min(self.intervals.len() - 1);
        }
    }

    /// Total keys in this gap.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the gap holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest key in the gap (last interval's max).
    ///
    /// # Panics
    ///
    /// Panics if the gap is empty.
    pub fn max(&self) -> &K {
        self.intervals.last().expect("max() on empty gap").max()
    }

    /// Smallest key in the gap (first interval's min).
    ///
    /// # Panics
    ///
    /// Panics if the gap is empty.
    pub fn min(&self) -> &K {
        self.intervals.first().expect("min() on empty gap").min()
    }

    /// The interval sequence, for structure inspection.
    pub(crate) fn intervals(&self) -> &[Interval<K>] {
        &self.intervals
    }

    /// Verify the gap's invariants: no empty interval, lengths consistent,
    /// weak-max ordering between neighbors, locator hint in range.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn assert_consistent<C: Compare<K>>(&self, cmp: &C) {
        let total: usize = self.intervals.iter().map(Interval::len).sum();
        assert_eq!(self.len, total, "gap length mismatch");
        if !self.intervals.is_empty() {
            assert!(self.last_left_idx < self.intervals.len(), "stale locator hint");
        }
        for interval in &self.intervals {
            assert!(!interval.is_empty(), "empty interval in gap");
            interval.assert_consistent(cmp);
        }
        for pair in self.intervals.windows(2) {
            assert!(
                cmp.le(pair[0].max(), pair[1].min()),
                "interval ordering violated"
            );
        }
    }
}

/// Split an interval into a sequence of intervals whose sizes decay
/// geometrically toward one edge: repeatedly pivot around a sampled key,
/// bank the far side, and continue on the side named by `toward_left`.
///
/// Runs as a loop rather than by recursion so an adversarial all-equal
/// input cannot exhaust the stack; the coin-flip tie break in `pivot` keeps
/// the expected iteration count logarithmic.
fn split<K: Clone, C: Compare<K>>(
    interval: Interval<K>,
    toward_left: bool,
    cmp: &C,
    rng: &mut StdRng,
    pivot_samples: usize,
) -> IntervalSeq<K> {
    let mut pieces = IntervalSeq::new();
    let mut cur = interval;
    loop {
        if cur.len() <= 1 {
            if !cur.is_empty() {
                pieces.push(cur);
            }
            break;
        }
        let pivot = pick_pivot(&cur, cmp, rng, pivot_samples);
        let (lesser, greater) = cur.pivot(&pivot, cmp, rng);
        if toward_left {
            if !greater.is_empty() {
                pieces.push(greater);
            }
            cur = lesser;
        } else {
            if !lesser.is_empty() {
                pieces.push(lesser);
            }
            cur = greater;
        }
    }
    if toward_left {
        pieces.reverse();
    }
    pieces
}

/// Choose a pivot key: a single uniform sample, or the median of `samples`
/// uniform draws when a tighter split is configured. `samples` must be odd.
fn pick_pivot<K: Clone, C: Compare<K>>(
    interval: &Interval<K>,
    cmp: &C,
    rng: &mut StdRng,
    samples: usize,
) -> K {
    debug_assert!(samples % 2 == 1, "pivot sample count must be odd");
    if samples <= 1 {
        return interval.sample(rng).clone();
    }
    let mut picks: Vec<K> = (0..samples).map(|_| interval.sample(rng).clone()).collect();
    picks.sort_by(|a, b| cmp.ordering(a, b));
    picks.swap_remove(samples / 2)
}

/// One directional merge sweep of the rebalance procedure.
///
/// Walks the sequence keeping `n_out` (keys already banked on this side)
/// and `n_in` (keys still interior). Stops when advancing would cross the
/// midpoint, and merges the next interval into the current one whenever the
/// banked side already outweighs both. Returns the number of intervals
/// advanced past.
fn merge_pass<K: Clone, C: Compare<K>>(
    intervals: &mut IntervalSeq<K>,
    total: usize,
    cmp: &C,
) -> usize {
    let mut n_out = 0usize;
    let mut i = 0usize;
    let mut advanced = 0usize;
    while i + 1 < intervals.len() {
        let cur = intervals[i].len();
        let next = intervals[i + 1].len();
        let n_in = total - cur - n_out;
        if n_out + cur >= n_in - next {
            // the next interval belongs to the other side
            break;
        }
        if n_out >= cur + next {
            let absorbed = intervals.remove(i + 1);
            intervals[i].merge_from(absorbed, cmp);
        } else {
            n_out += cur;
            i += 1;
            advanced += 1;
        }
    }
    advanced
}

/// Order two gaps lexicographically on (last-interval max, first-interval
/// min). Strict weak and total under the cross-gap ordering invariant.
pub(crate) fn gap_order<K: Clone, C: Compare<K>>(cmp: &C, a: &Gap<K>, b: &Gap<K>) -> Ordering {
    match cmp.ordering(a.max(), b.max()) {
        Ordering::Equal => cmp.ordering(a.min(), b.min()),
        ord => ord,
    }
}

/// Order a probe key against a gap's closed span: `Less` below the gap's
/// minimum, `Greater` above its maximum, `Equal` within. Gap bounds are
/// realized by stored keys, so an `Equal` gap is always a correct
/// membership and restructure target, including when equal keys span a
/// gap boundary.
pub(crate) fn probe_order<K: Clone, C: Compare<K>>(cmp: &C, key: &K, gap: &Gap<K>) -> Ordering {
    if cmp.lt(key, gap.min()) {
        Ordering::Less
    } else if cmp.lt(gap.max(), key) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}
