//! 32-bit to 64-bit timecode reconstruction across counter wraparound.
//!
//! The hardware transmits a 32-bit tick counter that wraps roughly every
//! 89 seconds at 48 MHz. The light and IMU clock domains wrap independently,
//! so each keeps its own previous 64-bit value and extends new counters
//! against it.

const WRAP: u64 = 1 << 32;
const HALF_WRAP: u64 = 1 << 31;

/// Extend a 32-bit hardware counter to a 64-bit timecode near `prev`.
///
/// The result keeps the low 32 bits of `cur` and picks whichever of the
/// candidate, candidate + 2^32 or candidate - 2^32 lies within half the wrap
/// period of `prev`. Handles both forward wraps (counter overflowed) and
/// rare backward jumps. Pure function, no side effects.
#[inline]
#[must_use]
pub fn extend_timecode(prev: u64, cur: u32) -> u64 {
    let mut tc = u64::from(cur) | (prev & !0xFFFF_FFFF);
    if tc < prev && tc + HALF_WRAP < prev {
        tc += WRAP;
    }
    if tc > prev && prev + HALF_WRAP < tc && tc > WRAP {
        tc -= WRAP;
    }
    tc
}
