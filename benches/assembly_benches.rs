use std::sync::OnceLock;

use gwf6::{packages::Package, Simulation, TutorialParams};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

static SIM: OnceLock<Simulation> = OnceLock::new();

fn tutorial() -> &'static Simulation {
    SIM.get_or_init(|| {
        TutorialParams::default()
            .build_simulation()
            .expect("tutorial parameters are valid")
    })
}

fn benchmark_build_simulation(c: &mut Criterion) {
    let params = TutorialParams::default();
    c.bench_function("build_simulation", |b| {
        b.iter(|| black_box(&params).build_simulation())
    });
}

fn benchmark_write_chd(c: &mut Criterion) {
    let chd = &tutorial().model().chd()[0];
    c.bench_function("write_chd", |b| {
        b.iter(|| {
            let mut buffer = Vec::with_capacity(1 << 17);
            chd.write_to(&mut buffer).map(|_| buffer.len())
        })
    });
}

fn benchmark_write_npf(c: &mut Criterion) {
    let npf = tutorial().model().npf().expect("npf is attached");
    c.bench_function("write_npf", |b| {
        b.iter(|| {
            let mut buffer = Vec::new();
            npf.write_to(&mut buffer).map(|_| buffer.len())
        })
    });
}

criterion_group!(
    benches,
    benchmark_build_simulation,
    benchmark_write_chd,
    benchmark_write_npf
);
criterion_main!(benches);
