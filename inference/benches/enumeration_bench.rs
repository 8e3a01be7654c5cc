//! Enumeration throughput benchmarks.
//!
//! Run with: cargo bench -p probly-inference --bench enumeration_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use probly::primitives::plus;
use probly::{bernoulli, categorical, draw, Cont, Result, Step, Value};
use probly_inference::{enumerate, forward_with_config, InferenceConfig};

/// Sum of `flips` fair coins, counted as integers.
fn coin_sum(flips: usize, total: i64, k: Cont) -> Result<Step> {
    if flips == 0 {
        return k.resume(Value::Int(total));
    }
    draw(
        Cont::new(move |heads| {
            let add = if heads == Value::Bool(true) { 1 } else { 0 };
            coin_sum(flips - 1, total + add, k.clone())
        }),
        bernoulli(),
        vec![Value::Float(0.5)],
    )
}

fn bench_coin_sums(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_coin_sum");
    for flips in [4usize, 8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(flips), &flips, |b, &flips| {
            b.iter(|| enumerate(move |k| coin_sum(black_box(flips), 0, k)))
        });
    }
    group.finish();
}

fn bench_wide_draw(c: &mut Criterion) {
    let params: Vec<Value> = (1..=256).map(|w| Value::Float(w as f64)).collect();
    c.bench_function("enumerate_categorical_256", |b| {
        b.iter(|| {
            let params = params.clone();
            enumerate(move |k| {
                draw(
                    Cont::new(move |i| plus(k.clone(), i, Value::Int(1))),
                    categorical(),
                    params,
                )
            })
        })
    });
}

fn bench_forward(c: &mut Criterion) {
    let config = InferenceConfig::new().with_seed(7);
    c.bench_function("forward_coin_sum_12", |b| {
        b.iter(|| forward_with_config(&config, |k| coin_sum(black_box(12), 0, k)))
    });
}

criterion_group!(benches, bench_coin_sums, bench_wide_draw, bench_forward);
criterion_main!(benches);
