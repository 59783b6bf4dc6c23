use hyperloglog_estimator::{HyperLogLog64, HyperLogLogPlus};

fn main() {
    let mut morning = HyperLogLogPlus::new(14).expect("valid precision");
    for i in 0u64..10_000 {
        morning.add(wyhash::wyhash(&i.to_le_bytes(), 0));
    }
    println!("morning visitors ~ {}", morning.count());

    let mut evening = HyperLogLogPlus::new(14).expect("valid precision");
    for i in 5_000u64..12_000 {
        evening.add(wyhash::wyhash(&i.to_le_bytes(), 0));
    }
    println!("evening visitors ~ {}", evening.count());

    morning.merge(&evening).expect("same precision");
    println!("distinct visitors  ~ {}", morning.count());

    let mut seen = HyperLogLog64::new(18).expect("valid precision");
    let first = wyhash::wyhash(&1u64.to_le_bytes(), 0);
    seen.add(first);
    println!("seen(first) = {}", seen.seen(first));
}
