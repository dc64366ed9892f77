//! Fibonacci placement: maps a 64-bit hash to a slot of a power-of-two table.
//!
//! The hash is multiplied by `2^64 / φ` and the top `log2(capacity)` bits
//! of the product become the slot index. Every input bit can reach those top
//! bits, so hash codes whose low bits never change (float bit patterns,
//! aligned addresses, multiples of large powers of two) still spread over the
//! table. Growing the table exposes one more high bit of the same product
//! rather than unmasking a fresh low bit of the raw hash.

/// `floor(2^64 / φ)`, the odd multiplier used for placement.
pub const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;

/// Shift that moves the top `log2(capacity)` product bits down to the index
/// range. Equals `64 - log2(capacity)`; `capacity` must be a power of two
/// of at least 2.
#[inline]
pub fn shift_for(capacity: usize) -> u32 {
    debug_assert!(capacity.is_power_of_two() && capacity >= 2);
    ((capacity - 1) as u64).leading_zeros()
}

/// Slot index in `[0, capacity)` for `hash` at the given shift.
#[inline]
pub fn place(hash: u64, shift: u32) -> usize {
    (hash.wrapping_mul(GOLDEN_RATIO_64) >> shift) as usize
}

/// How many steps `index` lies past `home`, wrapping around the table.
#[inline]
pub fn probe_distance(home: usize, index: usize, mask: usize) -> usize {
    index.wrapping_sub(home) & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_matches_log2_of_capacity() {
        assert_eq!(shift_for(2), 63);
        assert_eq!(shift_for(8), 61);
        assert_eq!(shift_for(1 << 30), 34);
    }

    /// Invariant: placement always lands inside the table.
    #[test]
    fn place_stays_in_range() {
        for bits in 1..20u32 {
            let cap = 1usize << bits;
            let shift = shift_for(cap);
            for h in [0u64, 1, 2, u64::MAX, 1 << 63, 0xdead_beef, 12345 << 40] {
                assert!(place(h, shift) < cap);
            }
        }
    }

    /// Invariant: hashes that differ only in their high bits still spread out.
    #[test]
    fn high_bit_only_hashes_spread() {
        let shift = shift_for(64);
        let slots: std::collections::BTreeSet<usize> =
            (0..64u64).map(|i| place(i << 40, shift)).collect();
        assert!(slots.len() > 32, "only {} distinct slots", slots.len());
    }

    /// Invariant: doubling the table refines placement using the next high bit.
    #[test]
    fn doubling_refines_placement() {
        for h in [3u64, 99, 0xabcdef, u64::MAX / 3] {
            let small = place(h, shift_for(16));
            let big = place(h, shift_for(32));
            assert_eq!(big >> 1, small);
        }
    }

    #[test]
    fn distance_wraps() {
        assert_eq!(probe_distance(6, 1, 7), 3);
        assert_eq!(probe_distance(2, 2, 7), 0);
        assert_eq!(probe_distance(2, 5, 7), 3);
    }
}
