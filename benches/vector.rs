use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{thread_rng, Rng};
use rrb_vector::Vector;

fn build_pushed(n: usize) -> Vector<u64> {
    let mut t = Vector::new().to_transient();
    for i in 0..n {
        t.push(i as u64);
    }
    t.to_persistent()
}

fn random_indices(n: usize, count: usize) -> Vec<usize> {
    let mut rng = thread_rng();
    (0..count).map(|_| rng.gen_range(0..n.max(1))).collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let sizes = [1_000usize, 10_000, 100_000, 1_000_000];
    let vectors: Vec<Vector<u64>> = sizes.iter().map(|&n| build_pushed(n)).collect();

    for (&n, _) in sizes.iter().zip(&vectors) {
        c.bench_function(&format!("transient push {n}"), |b| {
            b.iter(|| {
                let mut t = Vector::new().to_transient();
                for i in 0..n {
                    t.push(black_box(i as u64));
                }
                t.to_persistent()
            })
        });
    }

    for (&n, v) in sizes.iter().zip(&vectors) {
        let indices = random_indices(n, 1000);
        c.bench_function(&format!("nth {n}"), |b| {
            b.iter(|| {
                for &i in &indices {
                    black_box(v.get(i).unwrap());
                }
            })
        });
    }

    for (&n, v) in sizes.iter().zip(&vectors) {
        c.bench_function(&format!("persistent push_back {n}"), |b| {
            b.iter(|| black_box(v).push_back(0u64))
        });
    }

    for (&n, v) in sizes.iter().zip(&vectors) {
        c.bench_function(&format!("concat self {n}"), |b| {
            b.iter(|| black_box(v).concat(black_box(v)))
        });
    }

    for (&n, v) in sizes.iter().zip(&vectors) {
        c.bench_function(&format!("slice middle third {n}"), |b| {
            b.iter(|| black_box(v).slice(n / 3, 2 * n / 3).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
