use crate::errors::{KmerQfError, KmerQfResult};

/// For every byte: the four 2-bit fields in reverse order, each complemented.
pub static REV_COMP_TABLE: [u8; 256] = build_rev_comp_table();

const fn build_rev_comp_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        let reversed =
            ((b & 0b11) << 6) | (((b >> 2) & 0b11) << 4) | (((b >> 4) & 0b11) << 2) | (b >> 6);
        table[i] = !reversed;
        i += 1;
    }
    table
}

#[inline]
fn valid_bit_width(bit_width: u32) -> bool {
    bit_width >= 2 && bit_width <= 64 && bit_width % 2 == 0
}

/// Reverse complement of a packed k-mer whose low `bit_width` bits are used.
///
/// The complement is a bitwise NOT of every 2-bit field, which swaps `A`/`T`
/// and `C`/`G` under both base orders. `bit_width` must be even and in
/// `2..=64`; use [`checked_reverse_complement`] when that isn't already known.
#[inline]
pub fn reverse_complement(value: u64, bit_width: u32) -> u64 {
    debug_assert!(valid_bit_width(bit_width));
    let rc = value
        .to_le_bytes()
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(REV_COMP_TABLE[b as usize]));
    rc >> (64 - bit_width)
}

/// [`reverse_complement`] with the bit width and value validated first.
pub fn checked_reverse_complement(value: u64, bit_width: u32) -> KmerQfResult<u64> {
    check_width(value, bit_width)?;
    Ok(reverse_complement(value, bit_width))
}

fn check_width(value: u64, bit_width: u32) -> KmerQfResult<()> {
    if !valid_bit_width(bit_width) {
        return Err(KmerQfError::InvalidBitWidth(bit_width));
    }
    if bit_width < 64 && value >> bit_width != 0 {
        return Err(KmerQfError::ValueExceedsBitWidth { value, bit_width });
    }
    Ok(())
}

/// The smaller of `value` and its reverse complement.
///
/// Strand symmetry only holds when `bit_width == 2 * k`; a wider width pads
/// the k-mer with leading `A`s (or `T`s) and the padding then dominates the
/// comparison.
#[inline]
pub fn canonical(value: u64, bit_width: u32) -> KmerQfResult<u64> {
    check_width(value, bit_width)?;
    Ok(canonical_unchecked(value, bit_width))
}

#[inline]
pub(crate) fn canonical_unchecked(value: u64, bit_width: u32) -> u64 {
    let rc = reverse_complement(value, bit_width);
    if rc < value {
        rc
    } else {
        value
    }
}
