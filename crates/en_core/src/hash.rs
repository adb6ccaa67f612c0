//! Deterministic string hash → unit interval.
//!
//! FNV-1a (32-bit) accumulated over UTF-16 code units, reduced to `[0, 1)` by
//! dividing by 2^32. No seed and no state: the same key yields the same value
//! in every run. Not cryptographic and not collision-free; it only needs to
//! spread district/party keys plausibly.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// 32-bit FNV-1a over the UTF-16 code units of `key`.
#[inline]
pub fn fnv1a_32(key: &str) -> u32 {
    key.encode_utf16().fold(FNV_OFFSET_BASIS, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Stable pseudo-random value in `[0, 1)` for `key`.
#[inline]
pub fn unit_hash(key: &str) -> f64 {
    f64::from(fnv1a_32(key)) / TWO_POW_32
}
