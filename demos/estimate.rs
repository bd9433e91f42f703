use ipv4_cardinality::{parse_ipv4, HyperLogLog};

fn main() -> Result<(), ipv4_cardinality::Error> {
    let mut hll1 = HyperLogLog::new(14)?;
    for line in ["10.0.0.1", "10.0.0.2", "10.0.0.1", "not an address"] {
        if let Some(addr) = parse_ipv4(line) {
            hll1.add(addr);
        }
    }
    println!("hll1 estimate = {}", hll1.estimate());

    let mut hll2 = HyperLogLog::new(14)?;
    for addr in 0x0a00_0002..0x0a00_0010u32 {
        hll2.add(addr);
    }
    println!("hll2 estimate = {}", hll2.estimate());

    hll1.merge(&hll2)?;
    println!("merged estimate = {}", hll1.estimate());
    Ok(())
}
