use criterion::{Criterion, criterion_group, criterion_main};
use totp::{Algorithm, FixedClock, Secret, Totp, TotpConfig, compute_code};

fn compute_code_benchmark(c: &mut Criterion) {
    let secret = Secret::from(&b"12345678901234567890"[..]);

    let mut group = c.benchmark_group("compute_code");
    for algorithm in [Algorithm::Sha1, Algorithm::Sha256, Algorithm::Sha512] {
        group.bench_function(algorithm.as_str(), |b| {
            b.iter(|| compute_code(&secret, 37037036, 6, algorithm))
        });
    }
    group.finish();
}

fn verify_code_benchmark(c: &mut Criterion) {
    let secret = Secret::from(&b"12345678901234567890"[..]);
    let totp = Totp::new(TotpConfig::default())
        .with_clock(FixedClock::new(1111111109));

    // Worst case, every step of the window is computed.
    c.bench_function("verify_code miss", |b| {
        b.iter(|| totp.verify_code(&secret, "000000"))
    });
}

fn generate_secret_benchmark(c: &mut Criterion) {
    c.bench_function("generate secret 16", |b| {
        b.iter(|| Secret::generate(Secret::DEFAULT_LENGTH))
    });
}

criterion_group!(
    benches,
    compute_code_benchmark,
    verify_code_benchmark,
    generate_secret_benchmark
);
criterion_main!(benches);
