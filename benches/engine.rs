use criterion::{criterion_group, criterion_main, Bencher, BenchmarkId, Criterion, Throughput};
use once_cell::sync::Lazy;
use rand::Rng;

use dysect::{DysectEngine, EngineConfig};

const ALPHAS: [f64; 3] = [1.05, 1.2, 1.5];
const CAPACITY: [usize; 3] = [512, 4096, 10024];
const TOTAL_KEYS: u64 = 10_000;
const TOTAL_OPERATIONS: u64 = 1_000;

type Engine = DysectEngine<8, 32, 3, u64, u64>;

static RANDOM_KEYS: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut rng = rand::thread_rng();
    let mut keys = Vec::with_capacity(TOTAL_OPERATIONS as usize);
    for _ in 0..TOTAL_OPERATIONS {
        keys.push(rng.gen_range(1, TOTAL_KEYS));
    }
    keys
});

fn populated(capacity: usize, alpha: f64) -> Engine {
    let mut engine: Engine = DysectEngine::new(capacity, EngineConfig::new(alpha));
    for i in 1..TOTAL_KEYS {
        engine.insert(i, i);
    }
    engine
}

fn engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(TOTAL_OPERATIONS));

    for &alpha in ALPHAS.iter() {
        for &capacity in CAPACITY.iter() {
            let description = format!("alpha: {}, capacity: {}", alpha, capacity);

            group.bench_with_input(
                BenchmarkId::new("Insert", description.clone()),
                &(alpha, capacity),
                |b, &(alpha, capacity)| insert(b, capacity, alpha),
            );
            group.bench_with_input(
                BenchmarkId::new("Random Get", description.clone()),
                &(alpha, capacity),
                |b, &(alpha, capacity)| random_get(b, capacity, alpha),
            );
            group.bench_with_input(
                BenchmarkId::new("RMW", description.clone()),
                &(alpha, capacity),
                |b, &(alpha, capacity)| rmw(b, capacity, alpha),
            );
            group.bench_with_input(
                BenchmarkId::new("Erase then reinsert", description.clone()),
                &(alpha, capacity),
                |b, &(alpha, capacity)| erase_reinsert(b, capacity, alpha),
            );
        }
    }

    group.bench_function("Insert forces growth", insert_forces_growth);

    group.finish()
}

fn insert(b: &mut Bencher, capacity: usize, alpha: f64) {
    b.iter(|| {
        let mut engine: Engine = DysectEngine::new(capacity, EngineConfig::new(alpha));
        for &k in RANDOM_KEYS.iter() {
            engine.insert(k, k);
        }
    });
}

fn random_get(b: &mut Bencher, capacity: usize, alpha: f64) {
    let engine = populated(capacity, alpha);
    b.iter(|| {
        for &k in RANDOM_KEYS.iter() {
            assert!(engine.contains(&k) || k >= TOTAL_KEYS);
        }
    });
}

fn rmw(b: &mut Bencher, capacity: usize, alpha: f64) {
    let mut engine = populated(capacity, alpha);
    b.iter(|| {
        for &k in RANDOM_KEYS.iter() {
            if let Some(value) = engine.get_mut(&k) {
                *value += 1;
            }
        }
    });
}

fn erase_reinsert(b: &mut Bencher, capacity: usize, alpha: f64) {
    let mut engine = populated(capacity, alpha);
    b.iter(|| {
        for &k in RANDOM_KEYS.iter() {
            engine.erase(&k);
        }
        for &k in RANDOM_KEYS.iter() {
            engine.insert(k, k);
        }
    });
}

fn insert_forces_growth(b: &mut Bencher) {
    b.iter(|| {
        let mut engine: Engine = DysectEngine::new(0, EngineConfig::new(1.1));
        for i in 1..TOTAL_KEYS {
            engine.insert(i, i);
        }
    });
}

criterion_group!(benches, engine);
criterion_main!(benches);
