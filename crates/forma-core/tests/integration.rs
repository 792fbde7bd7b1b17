//! Integration tests for forma-core.
//!
//! Builds multi-leaf composites, checks them against direct whole-array
//! computations, and exercises the error paths a driver can hit.

use forma_core::{
    Composite, CrossingRule, Graph, GraphError, Leaf, MapFn, Reduction, StreamStore, WindowFn,
    apply_sliding, power,
};

const SAMPLE_RATE: f64 = 1000.0;

fn sine(freq_hz: f64, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|n| (core::f64::consts::TAU * freq_hz * n as f64 / SAMPLE_RATE).sin())
        .collect()
}

/// Clock + feeder + `body`, run for `signal.len()` ticks.
fn run_fed(body: Vec<forma_core::Node>, signal: &[f64]) -> StreamStore {
    let mut children = vec![
        Leaf::time_counter("time", SAMPLE_RATE).unwrap().into(),
        Leaf::input_feeder([("x".to_string(), signal.to_vec())]).unwrap().into(),
    ];
    children.extend(body);
    let mut graph = Graph::new(Composite::new("root", children).unwrap()).unwrap();
    let mut store = StreamStore::new();
    graph.run(&mut store, signal.len()).unwrap();
    store
}

#[test]
fn mean_composite_matches_sliding_mean() {
    let signal = sine(13.0, 400);
    let store = run_fed(
        vec![
            Leaf::running_sum("x", "sum", 25).unwrap().into(),
            Leaf::functional_window_length("x", "len", 25).unwrap().into(),
            Leaf::exponent("len", "inv", -1.0).unwrap().into(),
            Leaf::multiplier(&["sum", "inv"], "mean").unwrap().into(),
        ],
        &signal,
    );
    let expected = apply_sliding(&signal, 25, WindowFn::Mean);
    for (i, (got, want)) in store.samples("mean").unwrap().iter().zip(&expected).enumerate() {
        assert!((got - want).abs() < 1e-12, "sample {i}: {got} vs {want}");
    }
}

#[test]
fn fixed_window_rms_matches_sliding() {
    let signal = sine(7.0, 300);
    let store = run_fed(
        vec![Leaf::fixed_window("x", "rms", 40, WindowFn::Rms).unwrap().into()],
        &signal,
    );
    assert_eq!(
        store.samples("rms").unwrap(),
        apply_sliding(&signal, 40, WindowFn::Rms).as_slice()
    );
}

#[test]
fn derivative_of_sampled_ramp() {
    let ramp: Vec<f64> = (0..10).map(|n| 2.0 * n as f64).collect();
    let store = run_fed(
        vec![Leaf::derivative("x", "time", "dx").unwrap().into()],
        &ramp,
    );
    let dx = store.samples("dx").unwrap();
    assert_eq!(dx[0], 0.0);
    for &d in &dx[1..] {
        assert!((d - 2.0 * SAMPLE_RATE).abs() < 1e-6, "slope {d}");
    }
}

#[test]
fn direction_tracker_on_sine_slope() {
    let signal = sine(5.0, 1000);
    let store = run_fed(
        vec![
            Leaf::derivative("x", "time", "dx").unwrap().into(),
            Leaf::discretizor("dx", "slope_sign", 0.0).unwrap().into(),
            Leaf::direction_tracker("slope_sign", "flag", "dir", CrossingRule::SignChange)
                .unwrap()
                .into(),
            Leaf::running_sum("flag", "crossings", 1000).unwrap().into(),
        ],
        &signal,
    );
    // Five cycles turn around ten times.
    let total = *store.samples("crossings").unwrap().last().unwrap();
    assert!((9.0..=10.0).contains(&total), "crossings {total}");
    assert!(store.samples("dir").unwrap().iter().all(|d| d.abs() == 1.0));
}

#[test]
fn difference_and_map_compose() {
    let signal = sine(3.0, 200);
    let store = run_fed(
        vec![
            Leaf::map("x", "pos", MapFn::Rectify).unwrap().into(),
            Leaf::aggregator(&["x", "pos"], "neg", Reduction::Difference).unwrap().into(),
            Leaf::exponent("neg", "neg_sq", 2.0).unwrap().into(),
        ],
        &signal,
    );
    for ((&x, &neg), &sq) in signal
        .iter()
        .zip(store.samples("neg").unwrap())
        .zip(store.samples("neg_sq").unwrap())
    {
        assert_eq!(neg, x.min(0.0));
        assert_eq!(sq, power(neg, 2.0));
    }
}

#[test]
fn highpass_removes_offset() {
    let signal = vec![0.75; 5000];
    let store = run_fed(
        vec![Leaf::highpass_dc_block("x", "hp", 0.995).unwrap().into()],
        &signal,
    );
    let hp = store.samples("hp").unwrap();
    assert_eq!(hp[0], 0.75);
    assert!(hp[4999].abs() < 1e-6);
}

#[test]
fn feeder_exhaustion_surfaces() {
    let mut graph = Graph::new(
        Composite::new(
            "root",
            vec![
                Leaf::input_feeder([("x".to_string(), vec![1.0; 3])]).unwrap().into(),
                Leaf::exponent("x", "y", 2.0).unwrap().into(),
            ],
        )
        .unwrap(),
    )
    .unwrap();
    let mut store = StreamStore::new();
    let err = graph.run(&mut store, 5).unwrap_err();
    assert!(matches!(err, GraphError::InputExhausted { index: 3, .. }));
    assert_eq!(store.samples("y").unwrap().len(), 3);
}

#[test]
fn externally_driven_graph() {
    let mut graph = Graph::new(
        Composite::new(
            "square_sum",
            vec![
                Leaf::exponent("x", "x2", 2.0).unwrap().into(),
                Leaf::running_sum("x2", "energy", 3).unwrap().into(),
            ],
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(graph.inputs(), &["x"]);

    let mut store = StreamStore::new();
    let x = store.get_or_create("x");
    for value in [1.0, 2.0, 3.0, 4.0] {
        store.append(x, value);
        assert!(graph.ready(&store));
        graph.tick(&mut store).unwrap();
    }
    assert_eq!(store.samples("energy").unwrap(), &[1.0, 5.0, 14.0, 29.0]);
}

#[test]
fn duplicate_output_fails_before_any_tick() {
    let result = Composite::new(
        "clash",
        vec![
            Leaf::time_counter("t", SAMPLE_RATE).unwrap().into(),
            Leaf::time_counter("t", SAMPLE_RATE).unwrap().into(),
        ],
    );
    assert_eq!(
        result.unwrap_err(),
        GraphError::DuplicateOutput {
            stream: "t".to_string()
        }
    );
}
