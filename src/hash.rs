//! 32-bit integer mixer used to spread IPv4 addresses over HyperLogLog registers.
//!
//! Addresses in real traffic share long prefixes, so feeding them to the sketch
//! directly would pile them into a handful of registers. The MurmurHash3 `fmix32`
//! finalizer gives full avalanche with two multiplies and three xor-shifts.

/// MurmurHash3 32-bit finalizer.
#[inline]
pub fn fmix32(mut key: u32) -> u32 {
    key ^= key >> 16;
    key = key.wrapping_mul(0x85eb_ca6b);
    key ^= key >> 13;
    key = key.wrapping_mul(0xc2b2_ae35);
    key ^= key >> 16;
    key
}
