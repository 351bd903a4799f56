// width.rs — Identifier width selection
//
// Picks the narrowest unsigned integer able to hold every tensor index of a
// registry. The choice is observable in generated headers, so the tier
// boundaries are fixed constants rather than runtime parameters.

use std::fmt;

/// Largest tensor count addressable by the 8-bit tier.
pub const NARROW_LIMIT: usize = 1 << 8;

/// Largest tensor count addressable by the 16-bit tier.
pub const WIDE_LIMIT: usize = 1 << 16;

const WORD_LIMIT: u64 = 1 << 32;

/// Unsigned integer width used to address tensor indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    U8,
    U16,
    U32,
    U64,
}

impl Width {
    pub fn bits(self) -> u32 {
        match self {
            Width::U8 => 8,
            Width::U16 => 16,
            Width::U32 => 32,
            Width::U64 => 64,
        }
    }

    /// Type name written into the header's width annotation.
    pub fn c_type(self) -> &'static str {
        match self {
            Width::U8 => "uchar",
            Width::U16 => "ushort",
            Width::U32 => "uint",
            Width::U64 => "ulong",
        }
    }

    /// True for the 8-bit tier.
    pub fn is_narrow(self) -> bool {
        self == Width::U8
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// Select the identifier width for a registry holding `n` tensors.
///
/// Total: `n == 0` and `n == 256` both select the 8-bit tier.
pub fn select_width(n: usize) -> Width {
    if n <= NARROW_LIMIT {
        Width::U8
    } else if n <= WIDE_LIMIT {
        Width::U16
    } else if (n as u64) <= WORD_LIMIT {
        Width::U32
    } else {
        Width::U64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_boundary_is_inclusive() {
        assert_eq!(select_width(255), Width::U8);
        assert_eq!(select_width(256), Width::U8);
        assert_eq!(select_width(257), Width::U16);
    }

    #[test]
    fn zero_tensors_is_narrow() {
        assert_eq!(select_width(0), Width::U8);
        assert!(select_width(0).is_narrow());
    }

    #[test]
    fn wide_boundary_is_inclusive() {
        assert_eq!(select_width(65_535), Width::U16);
        assert_eq!(select_width(65_536), Width::U16);
        assert_eq!(select_width(65_537), Width::U32);
    }

    #[test]
    fn tier_addresses_every_index() {
        for n in [1usize, 2, 200, 256, 257, 300, 4096, 65_536, 65_537, 1 << 20] {
            let w = select_width(n);
            assert!(
                (n as u128) <= (1u128 << w.bits()),
                "{} tensors do not fit {}",
                n,
                w
            );
        }
    }

    #[test]
    fn selection_is_monotonic() {
        let mut prev = select_width(0);
        for n in (0..70_000).step_by(97) {
            let w = select_width(n);
            assert!(w >= prev);
            prev = w;
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn word_and_long_tiers() {
        assert_eq!(select_width(1 << 32), Width::U32);
        assert_eq!(select_width((1 << 32) + 1), Width::U64);
    }

    #[test]
    fn annotation_types() {
        assert_eq!(Width::U8.c_type(), "uchar");
        assert_eq!(Width::U16.c_type(), "ushort");
        assert_eq!(Width::U16.to_string(), "u16");
    }
}
