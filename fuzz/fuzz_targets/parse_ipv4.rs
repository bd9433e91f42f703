#![no_main]

use ipv4_cardinality::ipv4::{parse_ipv4_bytes, to_ipv4_addr};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(addr) = parse_ipv4_bytes(data) {
        // only digits and exactly three dots may be accepted
        assert!(data.iter().all(|c| c.is_ascii_digit() || *c == b'.'));
        assert_eq!(data.iter().filter(|&&c| c == b'.').count(), 3);
        // canonical form parses back to the same address
        let canonical = to_ipv4_addr(addr).to_string();
        assert_eq!(parse_ipv4_bytes(canonical.as_bytes()), Some(addr));
    }
});
