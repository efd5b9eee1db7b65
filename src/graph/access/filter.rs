//! `CuckooFilter` - an approximate, lock-free pre-filter for the visited set.
//!
//! Each bucket is one `AtomicU64` holding four 16-bit fingerprints (0 = empty
//! lane). A node hashes to two candidate buckets, cuckoo style; insertion
//! CASes the fingerprint into a free lane of either bucket. There is no
//! eviction: when both buckets are full the filter flips to *saturated* and
//! answers "maybe" for everything from then on. Hence:
//!
//! - `may_contain` never returns `false` for a node whose `insert` completed
//!   (no false negatives),
//! - it may return `true` for nodes never inserted (false positives).
//!
//! The filter is never the source of truth. The engine only uses a negative
//! answer to go straight to the exact claim, and a positive answer to try an
//! exact read-only check first.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::graph::Node;
use crate::token::InvariantLifetime;
use crate::GhostToken;

const LANES: usize = 4;
const LANE_BITS: u32 = 16;
const LANE_MASK: u64 = 0xffff;

/// Lock-free cuckoo-style approximate membership filter over node ids.
pub struct CuckooFilter<'brand> {
    buckets: Box<[AtomicU64]>,
    mask: usize,
    saturated: AtomicBool,
    _brand: InvariantLifetime<'brand>,
}

impl<'brand> CuckooFilter<'brand> {
    /// Creates a filter sized for roughly `expected_items` insertions.
    pub fn with_capacity(_token: &GhostToken<'brand>, expected_items: usize) -> Self {
        let buckets = expected_items.div_ceil(LANES).next_power_of_two().max(1 << 8);
        Self {
            buckets: (0..buckets).map(|_| AtomicU64::new(0)).collect(),
            mask: buckets - 1,
            saturated: AtomicBool::new(false),
            _brand: InvariantLifetime::new(),
        }
    }

    /// Returns `true` once an insertion found both candidate buckets full.
    pub fn is_saturated(&self) -> bool {
        self.saturated.load(Ordering::Relaxed)
    }

    /// Records `node`. Returns `false` if the filter had to saturate instead.
    pub fn insert(&self, node: Node) -> bool {
        let (fp, i1, i2) = self.locate(node);
        if self.insert_into(i1, fp) || self.insert_into(i2, fp) {
            return true;
        }
        self.saturated.store(true, Ordering::Release);
        false
    }

    /// Returns `false` only if `node` was definitely never inserted.
    #[inline]
    pub fn may_contain(&self, node: Node) -> bool {
        if self.saturated.load(Ordering::Acquire) {
            return true;
        }
        let (fp, i1, i2) = self.locate(node);
        has_lane(self.buckets[i1].load(Ordering::Acquire), fp)
            || has_lane(self.buckets[i2].load(Ordering::Acquire), fp)
    }

    fn insert_into(&self, bucket: usize, fp: u64) -> bool {
        let slot = &self.buckets[bucket];
        let mut cur = slot.load(Ordering::Relaxed);
        loop {
            if has_lane(cur, fp) {
                return true;
            }
            let Some(lane) = (0..LANES).find(|&l| (cur >> (l as u32 * LANE_BITS)) & LANE_MASK == 0) else {
                return false;
            };
            let next = cur | (fp << (lane as u32 * LANE_BITS));
            match slot.compare_exchange_weak(cur, next, Ordering::Release, Ordering::Relaxed) {
                Ok(_) => return true,
                Err(actual) => cur = actual,
            }
        }
    }

    #[inline(always)]
    fn locate(&self, node: Node) -> (u64, usize, usize) {
        let h = mix64(u64::from(node));
        let fp = match (h >> 48) & LANE_MASK {
            0 => 1,
            f => f,
        };
        let i1 = (h as usize) & self.mask;
        let i2 = (i1 ^ mix64(fp) as usize) & self.mask;
        (fp, i1, i2)
    }
}

#[inline(always)]
fn has_lane(bucket: u64, fp: u64) -> bool {
    (0..LANES).any(|l| (bucket >> (l as u32 * LANE_BITS)) & LANE_MASK == fp)
}

/// MurmurHash3's 64-bit finalizer.
#[inline(always)]
fn mix64(mut h: u64) -> u64 {
    h = (h ^ (h >> 33)).wrapping_mul(0xff51_afd7_ed55_8ccd);
    h = (h ^ (h >> 33)).wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^ (h >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_nodes_are_always_reported() {
        GhostToken::new(|token| {
            let filter = CuckooFilter::with_capacity(&token, 4096);
            for n in (0..4096).step_by(3) {
                filter.insert(n);
            }
            for n in (0..4096).step_by(3) {
                assert!(filter.may_contain(n), "false negative for {n}");
            }
        });
    }

    #[test]
    fn false_positive_rate_is_low_when_lightly_loaded() {
        GhostToken::new(|token| {
            let filter = CuckooFilter::with_capacity(&token, 8192);
            for n in 0..1024 {
                filter.insert(n);
            }
            assert!(!filter.is_saturated());
            let fps = (100_000..110_000).filter(|&n| filter.may_contain(n)).count();
            // Two buckets x four 16-bit lanes: expected rate is well under 1%.
            assert!(fps < 200, "{fps} false positives out of 10000");
        });
    }

    #[test]
    fn saturation_degrades_to_maybe() {
        GhostToken::new(|token| {
            let filter = CuckooFilter::with_capacity(&token, 0);
            assert_eq!(filter.buckets.len(), 256);
            // 256 buckets x 4 lanes cannot hold 10k distinct fingerprints.
            let all_fit = (0..10_000).map(|n| filter.insert(n)).all(|ok| ok);
            assert!(!all_fit);
            assert!(filter.is_saturated());
            assert!(filter.may_contain(999_999));
            for n in 0..10_000 {
                assert!(filter.may_contain(n));
            }
        });
    }
}
