/// Benchmarks for archive path normalization.
use common_queries::path::normalize;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    for (name, raw) in [
        ("clean", "/badc/cmip6/data/CMIP6/CMIP/MOHC/HadGEM3-GC31-LL"),
        ("relative", "badc/cmip6/data/CMIP6/CMIP/MOHC/HadGEM3-GC31-LL"),
        ("messy", "//badc///cmip6//data/CMIP6//CMIP/MOHC///HadGEM3-GC31-LL///"),
        ("root", "////"),
    ] {
        c.bench_function(&format!("normalize({})", name), |b| {
            b.iter(|| normalize(black_box(Some(raw))))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
