//! The multi-way hash splitter.
//!
//! Turns one 64-bit hashed value into up to `H` `(subtable, in-table
//! offset)` probe locations. `T` and `H` are compile-time constants: the
//! source's template parameters become Rust const generics here.

use crate::hash::KeyHasher;
use crate::key::Key;

/// One candidate probe location: an (as yet unmasked) subtable index and
/// in-table offset. The engine applies the subtable's current bitmask to
/// `loc` at lookup time, since the mask depends on whether that
/// subtable is currently "large" or "small".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub tab: usize,
    pub loc: u64,
}

/// Produces the `H` candidate buckets for a key.
#[derive(Debug, Clone, Copy)]
pub struct HashSplitter<const T: usize, const H: usize> {
    tab_width: u32,
    dual_pair: bool,
    linear_combine: bool,
}

impl<const T: usize, const H: usize> HashSplitter<T, H> {
    pub fn new(dual_pair: bool, linear_combine: bool) -> Self {
        assert!(T.is_power_of_two(), "T must be a power of two");
        assert!(H >= 1, "h must be at least 1");
        Self {
            tab_width: if T <= 1 { 0 } else { T.trailing_zeros() },
            dual_pair,
            linear_combine,
        }
    }

    /// Produces `H` probe locations from a key's hashed value.
    ///
    /// `hasher` is only used in single-pair mode, where each candidate
    /// beyond the first needs its own independent 64-bit hash (see
    /// `split_single_pair`'s doc comment for why).
    pub fn split<K: Key>(&self, hashed: u64, hasher: &KeyHasher, key: &K) -> [Probe; H] {
        if T == 1 {
            // Compile-time-constant subtable count of 1: tab is always 0
            // and the entire remainder is loc. Still need H independent
            // offsets, so fall back to the same per-candidate re-hash
            // single-pair mode uses.
            return self.independent_locs(hashed, hasher, key, 64);
        }

        if self.dual_pair {
            self.split_dual_pair(hashed)
        } else {
            self.independent_locs(hashed, hasher, key, 64 - self.tab_width)
        }
    }

    /// Dual-pair mode: the 64-bit hash is viewed as two 32-bit halves,
    /// each split into `(tab_width, 32 - tab_width)`. Candidates 0 and 1
    /// come directly from those two halves; for `h > 2` with
    /// `linear_combine` enabled, later candidates are synthesised from
    /// the first two via an odd-step linear recurrence. This mode caps
    /// the addressable in-table offset at 32 bits, so it only fits
    /// tables up to 2^32 total slots, in exchange for needing only one
    /// hash per key.
    fn split_dual_pair(&self, hashed: u64) -> [Probe; H] {
        let loc_width = 32 - self.tab_width;
        let lo = hashed as u32;
        let hi = (hashed >> 32) as u32;

        let (tab0, loc0) = Self::split_field(lo, self.tab_width, loc_width);
        let (tab1, loc1) = Self::split_field(hi, self.tab_width, loc_width);

        let mut out = [Probe { tab: 0, loc: 0 }; H];
        if H > 0 {
            out[0] = Probe {
                tab: tab0,
                loc: loc0 as u64,
            };
        }
        if H > 1 {
            out[1] = Probe {
                tab: tab1,
                loc: loc1 as u64,
            };
        }
        for i in 2..H {
            if self.linear_combine {
                let step_tab = (tab1 | 1) % T.max(1);
                let step_loc = (loc1 | 1) as u64;
                let tab_i = (tab0 + i * step_tab) % T;
                let loc_i = (loc0 as u64 + (i as u64) * step_loc) % (1u64 << loc_width);
                out[i] = Probe {
                    tab: tab_i,
                    loc: loc_i,
                };
            } else {
                // linear_combine disabled and h > 2: fall back to
                // treating candidate i like a fresh dual-pair split of a
                // re-mixed hash, so candidates stay well distributed
                // without relying on the recurrence.
                let mixed = Self::splitmix64(hashed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
                let (tab_i, loc_i) = Self::split_field(mixed as u32, self.tab_width, loc_width);
                out[i] = Probe {
                    tab: tab_i,
                    loc: loc_i as u64,
                };
            }
        }
        out
    }

    /// Single-pair / widened mode: every candidate gets its own
    /// independent `loc_width`-bit offset computed from a *derived*
    /// hash of the key rather than by slicing one shared 64-bit value.
    /// With `loc_width` up to 64 bits and independently re-hashed per
    /// candidate, this addresses subtables larger than 2^32 buckets
    /// correctly, unlike dual-pair mode's 32-bit-capped halves.
    fn independent_locs<K: Key>(
        &self,
        hashed: u64,
        hasher: &KeyHasher,
        key: &K,
        loc_width: u32,
    ) -> [Probe; H] {
        let mut out = [Probe { tab: 0, loc: 0 }; H];
        out[0] = {
            let (tab, loc) = Self::split_field_u64(hashed, self.tab_width, loc_width);
            Probe { tab, loc }
        };
        for i in 1..H {
            let h_i = hasher.derive(i as u64).hash(key);
            let (tab, loc) = Self::split_field_u64(h_i, self.tab_width, loc_width);
            out[i] = Probe { tab, loc };
        }
        out
    }

    #[inline]
    fn split_field(bits: u32, tab_width: u32, loc_width: u32) -> (usize, u32) {
        debug_assert_eq!(tab_width + loc_width, 32);
        if tab_width == 0 {
            return (0, bits);
        }
        let tab = (bits >> loc_width) as usize;
        let loc = bits & ((1u32 << loc_width) - 1);
        (tab, loc)
    }

    #[inline]
    fn split_field_u64(bits: u64, tab_width: u32, loc_width: u32) -> (usize, u64) {
        if tab_width == 0 {
            let loc = if loc_width >= 64 {
                bits
            } else {
                bits & ((1u64 << loc_width) - 1)
            };
            return (0, loc);
        }
        let tab = (bits >> (64 - tab_width)) as usize % T;
        let loc = if loc_width >= 64 {
            bits
        } else {
            bits & ((1u64 << loc_width) - 1)
        };
        (tab, loc)
    }

    #[inline]
    fn splitmix64(mut x: u64) -> u64 {
        x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = x;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
