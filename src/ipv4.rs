//! Dotted-quad IPv4 parsing.
//!
//! Lines are parsed straight from the byte buffer of the scanner, without UTF-8
//! validation: anything other than ASCII digits and dots is rejected anyway.

use std::net::Ipv4Addr;

/// Parse a trimmed dotted-quad string into its big-endian `u32` encoding.
#[inline]
pub fn parse_ipv4(s: &str) -> Option<u32> {
    parse_ipv4_bytes(s.as_bytes())
}

/// Parse a trimmed dotted-quad byte string into its big-endian `u32` encoding.
///
/// Accepts exactly four non-empty groups of decimal digits separated by dots,
/// each group in `[0..255]`. Leading zeros inside a group are allowed.
#[inline]
pub fn parse_ipv4_bytes(bytes: &[u8]) -> Option<u32> {
    let mut octets = [0u8; 4];
    let mut octet_idx = 0;
    let mut value: u32 = 0;
    let mut digits = 0;

    for &c in bytes {
        match c {
            b'0'..=b'9' => {
                value = value * 10 + u32::from(c - b'0');
                if value > 255 {
                    return None;
                }
                digits += 1;
            }
            b'.' => {
                if digits == 0 || octet_idx == 3 {
                    return None;
                }
                octets[octet_idx] = value as u8;
                octet_idx += 1;
                value = 0;
                digits = 0;
            }
            _ => return None,
        }
    }

    if octet_idx != 3 || digits == 0 {
        return None;
    }
    octets[3] = value as u8;

    Some(u32::from_be_bytes(octets))
}

/// Decode an encoded address back into an [`Ipv4Addr`].
#[inline]
pub fn to_ipv4_addr(addr: u32) -> Ipv4Addr {
    Ipv4Addr::from(addr)
}
