//! Benchmark for the sharded IP registry

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ip_registry::{IpId, IpRegistry, Principal};

fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("ip_registry");
    group.throughput(Throughput::Elements(1));

    group.bench_function("register", |b| {
        let registry = IpRegistry::new();
        let owner = Principal::new("owner").unwrap();

        b.iter(|| {
            let _ = registry.register(
                black_box(&owner),
                "Patent",
                "benchmark record",
                black_box(1_900_000_000_000),
            );
        });
    });

    group.finish();
}

fn bench_guarded_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ip_registry");
    group.throughput(Throughput::Elements(1));

    let registry = IpRegistry::new();
    let owner = Principal::new("owner").unwrap();
    let intruder = Principal::new("intruder").unwrap();
    for i in 0..1000 {
        registry.register(&owner, format!("Patent {:04}", i), "", 0);
    }

    group.bench_function("set_status", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let id = IpId::new((counter % 1000 + 1) as i64);
            let _ = registry.set_status(&owner, black_box(id), counter % 2 == 0);
        });
    });

    group.bench_function("set_status_denied", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let id = IpId::new((counter % 1000 + 1) as i64);
            let _ = registry.set_status(&intruder, black_box(id), false);
        });
    });

    group.bench_function("get_info", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let _ = registry.get_info(black_box(IpId::new((counter % 1000 + 1) as i64)));
        });
    });

    group.finish();
}

fn bench_concurrent_registrations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ip_registry");
    group.throughput(Throughput::Elements(100));

    let registry = IpRegistry::new();
    let rt = tokio::runtime::Runtime::new().unwrap();

    group.bench_function("concurrent_100_registrations", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut handles = Vec::new();
                for i in 0..100 {
                    let reg = registry.clone();
                    handles.push(tokio::spawn(async move {
                        let owner = Principal::new(format!("owner-{}", i % 8)).unwrap();
                        reg.register(&owner, "Concurrent", "", 0)
                    }));
                }
                for handle in handles {
                    let _ = handle.await;
                }
            });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_register,
    bench_guarded_mutations,
    bench_concurrent_registrations,
);
criterion_main!(benches);
