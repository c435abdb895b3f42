//! Byte-enable mask expansion and partial-word merge.

/// Byte enables that cover the whole 64-bit word.
pub const FULL_MASK: u8 = 0xFF;

/// Expand an 8-bit byte-enable mask into a 64-bit byte-lane mask.
///
/// Bit `i` of `mask` selects byte lane `i` (bits `8i..8i+8`).
#[must_use]
pub fn expand(mask: u8) -> u64 {
    (0..8u32)
        .filter(|lane| mask & (1 << lane) != 0)
        .fold(0, |bm, lane| bm | (0xFF_u64 << (lane * 8)))
}

/// Merge `data` into `old` on the lanes enabled by `mask`.
#[must_use]
pub fn merge(old: u64, data: u64, mask: u8) -> u64 {
    if mask == FULL_MASK {
        return data;
    }
    let bm = expand(mask);
    (old & !bm) | (data & bm)
}
