use criterion::{Criterion, criterion_group, criterion_main};
use hexviewlib::{MemorySource, find_index_of};
use rand::Rng;

fn bench_pattern_search(c: &mut Criterion) {
    let mut rng = rand::rng();

    // 1 MiB of random data with the pattern planted at the very end,
    // forcing a full scan.
    let pattern = *b"\xDE\xAD\xBE\xEF\x00\x11\x22\x33";
    let mut haystack: Vec<u8> = (0..1_048_576).map(|_| rng.random::<u8>()).collect();
    let tail = haystack.len() - pattern.len();
    haystack[tail..].copy_from_slice(&pattern);
    let source = MemorySource::new(haystack);

    c.bench_function("search_bmh_1mb", |b| {
        b.iter(|| {
            let res = find_index_of(
                std::hint::black_box(&source),
                0,
                1_048_576,
                std::hint::black_box(&pattern),
                true,
            );
            std::hint::black_box(res);
        });
    });

    c.bench_function("search_bmh_1mb_case_insensitive", |b| {
        b.iter(|| {
            let res = find_index_of(
                std::hint::black_box(&source),
                0,
                1_048_576,
                std::hint::black_box(&pattern),
                false,
            );
            std::hint::black_box(res);
        });
    });

    #[cfg(feature = "benchmarking")]
    c.bench_function("search_skip_tables", |b| {
        b.iter(|| {
            let tables = hexviewlib::bench_priv_tables(std::hint::black_box(&pattern));
            std::hint::black_box(tables);
        });
    });
}

criterion_group!(
    name = hexviewlib_benches;
    config = Criterion::default().sample_size(20);
    targets = bench_pattern_search
);
criterion_main!(hexviewlib_benches);
