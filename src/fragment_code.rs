// Fragment encoding shared by the index builder and the seed matcher.

use crate::error::PlasmapError;

/// Tuple length: the window size over which fingerprints are computed.
/// KTUP, FRAGMENT_MASK and MIN_FRAGMENT are a wire contract between the
/// index builder and the matcher; both sides must agree.
pub const KTUP: usize = 12;

/// (4^KTUP)-1: every fingerprint fits in 2*KTUP bits.
pub const FRAGMENT_MASK: u32 = 16_777_215;

/// Features shorter than this are not indexed at all; trailing chunks
/// shorter than this are spliced with their predecessor.
pub const MIN_FRAGMENT: usize = 6;

#[inline(always)]
fn base_code(base: u8) -> Result<u32, PlasmapError> {
    match base.to_ascii_lowercase() {
        b'a' | b'n' => Ok(0), // N is indexed as A
        b'g' => Ok(1),
        b'c' => Ok(2),
        b't' => Ok(3),
        other => Err(PlasmapError::Encoding { base: other }),
    }
}

/// Packs up to KTUP bases into a 2-bits-per-base integer, first base in the
/// highest bits. Shorter input is right-padded with `a`. Order-sensitive and
/// collision-free: two padded strings share a fingerprint iff they are
/// character-identical. The caller guarantees `s.len() <= KTUP`.
pub fn fragment_fingerprint(s: &[u8]) -> Result<u32, PlasmapError> {
    debug_assert!(s.len() <= KTUP);
    let mut sum: u32 = 0;
    for base in s.iter().chain(std::iter::repeat(&b'a')).take(KTUP) {
        sum = (sum << 2) + base_code(*base)?;
    }
    Ok(sum)
}

/// Fingerprint of a `t`-run of the same (pre-pad) length as `s`: a fixed
/// per-length marker telling the matcher how many leading bases of a short
/// fragment are informative. Since pad bases encode as zero bits, this
/// doubles as a high-bit mask over fingerprints.
pub fn length_sentinel(s: &[u8]) -> u32 {
    let len = s.len().min(KTUP);
    if len == 0 {
        return 0;
    }
    ((1u32 << (2 * len)) - 1) << (2 * (KTUP - len))
}

/// Reverse complement over {a,c,g,t}, case-insensitive. Any other byte is
/// dropped, so the output can be shorter than the input.
pub fn reverse_complement(s: &[u8]) -> Vec<u8> {
    s.iter()
        .rev()
        .filter_map(|base| match base.to_ascii_lowercase() {
            b'a' => Some(b't'),
            b't' => Some(b'a'),
            b'g' => Some(b'c'),
            b'c' => Some(b'g'),
            _ => None,
        })
        .collect()
}
