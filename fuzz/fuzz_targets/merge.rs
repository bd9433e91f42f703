#![no_main]

use ipv4_cardinality::HyperLogLog;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let precision = 4 + data[0] % 15;
    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data[1..].split_at(split_index.min(data.len() - 1));

    let sketch_of = |bytes: &[u8]| {
        let mut hll = HyperLogLog::new(precision).unwrap();
        for chunk in bytes.chunks(4) {
            let mut addr = [0u8; 4];
            addr[..chunk.len()].copy_from_slice(chunk);
            hll.add(u32::from_be_bytes(addr));
        }
        hll
    };

    let lhs = sketch_of(first_half);
    let rhs = sketch_of(second_half);

    let mut lhs_rhs = lhs.clone();
    lhs_rhs.merge(&rhs).unwrap();
    let mut rhs_lhs = rhs.clone();
    rhs_lhs.merge(&lhs).unwrap();
    assert_eq!(lhs_rhs, rhs_lhs);

    let mut twice = lhs_rhs.clone();
    twice.merge(&lhs_rhs).unwrap();
    assert_eq!(twice, lhs_rhs);
    assert!(lhs_rhs.estimate() <= 1 << 32);
});
