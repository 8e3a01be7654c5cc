// Demonstration of running one program under different strategies
// The program never names a strategy; whichever handler is installed decides
// what its draws and conditions mean.
//
// Run with: RUST_LOG=debug cargo run --example coin_flips

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use probly::primitives::{and, display};
use probly::{bernoulli, condition, draw, run, Cont, Step, Value};
use probly_inference::{
    enumerate_with_config, forward, infer, Enumerate, InferenceConfig, Metrics, Recording, Trace,
};

fn flip(k: Cont, p: f64) -> probly::Result<Step> {
    draw(k, bernoulli(), vec![Value::Float(p)])
}

// a = flip(0.5); b = flip(0.5); a && b
fn both_heads(k: Cont) -> probly::Result<Step> {
    flip(
        Cont::new(move |a| {
            let k = k.clone();
            flip(Cont::new(move |b| and(k.clone(), a.clone(), b)), 0.5)
        }),
        0.5,
    )
}

// a = flip(0.3); b = flip(0.6); condition(a || b); a
fn first_given_either(k: Cont) -> probly::Result<Step> {
    flip(
        Cont::new(move |a| {
            let k = k.clone();
            flip(
                Cont::new(move |b| {
                    let either = a == Value::Bool(true) || b == Value::Bool(true);
                    let (k, a) = (k.clone(), a.clone());
                    condition(Cont::new(move |_| k.resume(a.clone())), either)
                }),
                0.6,
            )
        }),
        0.3,
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("probly::display=info".parse()?))
        .init();

    println!("=== Default handler ===");
    let value = run(|k| both_heads(Cont::new(move |v| display(k.clone(), v))))?;
    println!("display returned {}", value);

    println!("\n=== Direct sampling ===");
    let sampled = forward(both_heads)?;
    println!("sampled support: {:?}", sampled.support(&[])?);

    println!("\n=== Exhaustive enumeration ===");
    let config = InferenceConfig::new().with_marginal_report(true);
    let exact = enumerate_with_config(&config, both_heads)?;
    for value in exact.support(&[])? {
        println!("P({}) = {:.4}", value, exact.score(&[], &value)?.exp());
    }

    println!("\n=== Conditioning, traced and counted ===");
    let strategy = Metrics::new(Trace::with_prefix(
        Enumerate::new(&InferenceConfig::default()),
        "posterior",
    ));
    let counts = strategy.counts();
    let posterior = infer(strategy, first_given_either)?;
    println!(
        "P(a | a || b) = {:.4}",
        posterior.score(&[], &Value::Bool(true))?.exp()
    );
    println!(
        "draws: {}, weights: {}, paths: {}",
        counts.draws(),
        counts.weights(),
        counts.exits()
    );

    println!("\n=== Recorded effects ===");
    let strategy = Recording::new(Enumerate::new(&InferenceConfig::default()));
    let log = strategy.log();
    infer(strategy, both_heads)?;
    for event in log.events() {
        println!("  {:?}", event);
    }

    Ok(())
}
