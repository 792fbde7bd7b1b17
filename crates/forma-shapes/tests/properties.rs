//! Property-based tests for forma-shapes.
//!
//! Randomised checks of decomposition bookkeeping, the triangle rescale
//! bounds, and batch/streaming agreement on arbitrary short signals.

use forma_core::CrossingRule;
use forma_shapes::{
    Plan, Transform, iterative_apply, rescale_gain, run_streaming, square_wave, triangle_wave,
};
use proptest::prelude::*;

fn transform_strategy() -> impl Strategy<Value = Transform> {
    prop_oneof![
        (-0.5f64..0.5).prop_map(|bias| Transform::Square { bias }),
        Just(Transform::TRIANGLE),
        Just(Transform::Triangle {
            rule: CrossingRule::SignChange
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// One iterative pass equals applying the transform directly.
    #[test]
    fn single_pass_is_the_transform(
        signal in prop::collection::vec(-1.0f64..1.0, 1..300),
        window in 1usize..64,
    ) {
        let result = iterative_apply(|s| square_wave(s, window), &signal, 1);
        prop_assert_eq!(result.output, square_wave(&signal, window));
    }

    /// Output plus residual reconstructs the input.
    #[test]
    fn residual_plus_output_is_input(
        signal in prop::collection::vec(-4.0f64..4.0, 1..300),
        window in 1usize..64,
        passes in 1usize..6,
    ) {
        let result = iterative_apply(|s| triangle_wave(s, window), &signal, passes);
        for i in 0..signal.len() {
            let rebuilt = result.output[i] + result.residual[i];
            let scale = signal[i].abs() + result.output[i].abs() + result.residual[i].abs();
            prop_assert!((rebuilt - signal[i]).abs() <= 1e-9 * scale.max(1.0));
        }
    }

    /// The rescale gain never leaves [0, 10].
    #[test]
    fn rescale_gain_is_bounded(target in 0.0f64..1e6, own in prop_oneof![Just(0.0), 0.0f64..1e6]) {
        let gain = rescale_gain(target, own);
        prop_assert!((0.0..=10.0).contains(&gain), "gain {}", gain);
    }

    /// Streaming and batch agree for any transform, window, and short signal.
    #[test]
    fn streaming_matches_batch(
        signal in prop::collection::vec(-1.0f64..1.0, 1..200),
        window in 1usize..40,
        transform in transform_strategy(),
    ) {
        let plan = Plan::Iterative { transform, passes: 1 };
        let streamed = run_streaming(&plan, &signal, 1000.0, window).unwrap();
        let batch = transform.apply(&signal, window);
        for (s, b) in streamed.output.iter().zip(&batch) {
            prop_assert!((s - b).abs() <= 1e-9 * b.abs().max(1.0), "streaming {} vs batch {}", s, b);
        }
    }
}
