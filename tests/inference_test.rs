// End-to-end tests: programs written against the core crate, run under the
// default handler and under each inference strategy.

use std::cell::Cell;
use std::rc::Rc;

use probly::effects::router;
use probly::primitives::{and, plus};
use probly::{
    bernoulli, condition, draw, run, uniform_draw, weight, Capability, Cont, Distribution, Effect,
    InferenceError, Result, Step, Value,
};
use probly_inference::{
    enumerate, forward, infer, run_enumeration, Enumerate, InferenceConfig, Metrics, Recording,
    Trace,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn flip(k: Cont, p: f64) -> Result<Step> {
    draw(k, bernoulli(), vec![Value::Float(p)])
}

/// `flip(0.5) && flip(0.5)`
fn two_fair_flips(k: Cont) -> Result<Step> {
    flip(
        Cont::new(move |a| {
            let k = k.clone();
            flip(Cont::new(move |b| and(k.clone(), a.clone(), b)), 0.5)
        }),
        0.5,
    )
}

fn prob(dist: &Distribution, value: impl Into<Value>) -> f64 {
    dist.score(&[], &value.into()).unwrap().exp()
}

#[test]
fn conjunction_of_fair_flips() {
    init_tracing();
    let dist = enumerate(two_fair_flips).unwrap();
    assert!((prob(&dist, true) - 0.25).abs() < 1e-12);
    assert!((prob(&dist, false) - 0.75).abs() < 1e-12);
    assert!(router::is_default());
}

#[test]
fn two_binary_draws_exit_four_times() {
    init_tracing();
    let strategy = Metrics::new(Trace::with_prefix(
        Enumerate::new(&InferenceConfig::default()),
        "conjunction",
    ));
    let counts = strategy.counts();
    infer(strategy, two_fair_flips).unwrap();
    assert_eq!(counts.exits(), 4);
}

#[test]
fn conditioning_renormalizes() {
    init_tracing();
    // first flip given that at least one of two flips came up heads
    let dist = enumerate(|k| {
        flip(
            Cont::new(move |a| {
                let k = k.clone();
                flip(
                    Cont::new(move |b| {
                        let either = a == Value::Bool(true) || b == Value::Bool(true);
                        let (k, a) = (k.clone(), a.clone());
                        condition(Cont::new(move |_| k.resume(a.clone())), either)
                    }),
                    0.5,
                )
            }),
            0.5,
        )
    })
    .unwrap();
    assert!((prob(&dist, true) - 2.0 / 3.0).abs() < 1e-12);
    assert!((prob(&dist, false) - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn soft_evidence_scales_paths() {
    let dist = enumerate(|k| {
        draw(
            Cont::new(move |x| {
                let log_weight = if x == Value::Int(2) { 2f64.ln() } else { 0.0 };
                let k = k.clone();
                weight(Cont::new(move |_| k.resume(x.clone())), log_weight)
            }),
            uniform_draw(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        )
    })
    .unwrap();
    assert!((prob(&dist, 2i64) - 0.5).abs() < 1e-12);
    assert!((prob(&dist, 1i64) - 0.25).abs() < 1e-12);
}

#[test]
fn nested_enumeration_restores_the_outer_strategy() {
    init_tracing();
    let inner_depth = Rc::new(Cell::new(0));
    let after_inner = Rc::new(Cell::new(""));
    let (seen_depth, seen_name) = (inner_depth.clone(), after_inner.clone());

    // outer: a ~ flip(0.5); inner: P(a || flip(0.5))
    let dist = enumerate(move |k| {
        flip(
            Cont::new(move |a| {
                let (k, probe, seen_name) = (k.clone(), seen_depth.clone(), seen_name.clone());
                run_enumeration(
                    move |inner| {
                        seen_name.set(router::active_name());
                        k.resume(Value::Float(inner.score(&[], &Value::Bool(true))?.exp()))
                    },
                    move |k2| {
                        probe.set(router::depth());
                        flip(
                            Cont::new(move |b| {
                                let either = a == Value::Bool(true) || b == Value::Bool(true);
                                k2.resume(Value::Bool(either))
                            }),
                            0.5,
                        )
                    },
                )
            }),
            0.5,
        )
    })
    .unwrap();

    assert_eq!(inner_depth.get(), 2);
    assert_eq!(after_inner.get(), "enumerate");
    assert!((prob(&dist, 1.0) - 0.5).abs() < 1e-12);
    assert!((prob(&dist, 0.5) - 0.5).abs() < 1e-12);
    assert!(router::is_default());
    assert_eq!(router::depth(), 0);
}

#[test]
fn weight_needs_an_inference_strategy() {
    assert_eq!(
        run(|k| weight(k, 0.0)).unwrap_err(),
        InferenceError::NoActiveInference
    );
    assert!(matches!(
        forward(|k| weight(k, 0.0)).unwrap_err(),
        InferenceError::UnsupportedEffect {
            strategy: "forward",
            effect: Effect::Weight,
            ..
        }
    ));
    assert!(router::is_default());
}

#[test]
fn default_handler_samples_at_top_level() {
    let value = run(|k| {
        flip(
            Cont::new(move |heads| plus(k.clone(), Value::from("heads="), Value::from(heads.to_string()))),
            1.0,
        )
    })
    .unwrap();
    assert_eq!(value, Value::from("heads=true"));
}

#[test]
fn failures_restore_the_default_handler() {
    let opaque = Distribution::builder("opaque")
        .sample(|_, _| Ok(Value::Unit))
        .build();
    assert!(enumerate(move |k| draw(k, opaque, vec![])).is_err());
    assert!(router::is_default());

    let unsampled = Distribution::builder("unsampled")
        .support(|_| Ok(vec![Value::Unit]))
        .build();
    assert_eq!(
        forward(move |k| draw(k, unsampled, vec![])).unwrap_err(),
        InferenceError::MissingCapability {
            distribution: "unsampled".into(),
            capability: Capability::Sample,
        }
    );
    assert!(router::is_default());
    assert_eq!(router::depth(), 0);
}

#[test]
fn recorded_trace_matches_the_search_order() {
    let strategy = Recording::new(Enumerate::new(&InferenceConfig::default()));
    let log = strategy.log();
    infer(strategy, two_fair_flips).unwrap();
    let exits = log.exits();
    assert_eq!(exits.iter().filter(|v| **v == Value::Bool(false)).count(), 3);
    assert_eq!(exits.len(), 4);
}
