//! Batch transformation semantics: ordered results, per-element failure
//! scoping, and the fail-fast/collect policy split.
use approx::assert_relative_eq;
use nalgebra::Vector3;

use helioframe::transformer::partition_batch;
use helioframe::{CartesianState, ErrorPolicy, HelioframeError, Origin, ReferenceFrame, Transformer};

mod common;

fn batch_with_one_bad_element() -> Vec<CartesianState> {
    let good = common::heliocentric_circular();
    let displaced = CartesianState {
        position: Vector3::new(0.2, 0.9, -0.04),
        ..good.clone()
    };
    // Neptune has no record in the fixture ephemeris
    let bad = CartesianState {
        origin: Origin::Neptune,
        ..good.clone()
    };
    vec![good, bad, displaced]
}

#[test]
fn test_collect_mode_keeps_order_and_scopes_errors() {
    let transformer = Transformer::new(common::fixture_ephemeris());
    let states = batch_with_one_bad_element();

    let results = transformer
        .transform_batch(
            &states,
            ReferenceFrame::Ecliptic,
            Origin::SolarSystemBarycenter,
            ErrorPolicy::Collect,
        )
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1].as_ref().unwrap_err(),
        HelioframeError::EphemerisUnavailable {
            origin: Origin::Neptune,
            ..
        }
    ));
    assert!(results[2].is_ok(), "error must not block later elements");

    // indices survive the partition into successes and failures
    let (successes, failures) = partition_batch(results);
    assert_eq!(successes.len(), 2);
    assert_eq!(failures.len(), 1);
    assert_eq!(successes[0].0, 0);
    assert_eq!(successes[1].0, 2);
    assert_eq!(failures[0].0, 1);
}

#[test]
fn test_fail_fast_mode_surfaces_first_error() {
    let transformer = Transformer::new(common::fixture_ephemeris());
    let states = batch_with_one_bad_element();

    let err = transformer
        .transform_batch(
            &states,
            ReferenceFrame::Ecliptic,
            Origin::SolarSystemBarycenter,
            ErrorPolicy::FailFast,
        )
        .unwrap_err();
    assert!(matches!(err, HelioframeError::EphemerisUnavailable { .. }));
}

#[test]
fn test_all_good_batch_is_identical_under_both_policies() {
    let transformer = Transformer::new(common::fixture_ephemeris());
    let good = common::heliocentric_circular();
    let states = vec![good.clone(), good.clone(), good];

    let collected = transformer
        .transform_batch(
            &states,
            ReferenceFrame::Equatorial,
            Origin::EarthMoon,
            ErrorPolicy::Collect,
        )
        .unwrap();
    let fail_fast = transformer
        .transform_batch(
            &states,
            ReferenceFrame::Equatorial,
            Origin::EarthMoon,
            ErrorPolicy::FailFast,
        )
        .unwrap();

    for (a, b) in collected.iter().zip(fail_fast.iter()) {
        let a = a.as_ref().unwrap();
        let b = b.as_ref().unwrap();
        assert_relative_eq!(a.position, b.position, max_relative = 1e-15);
        assert_eq!(a.origin, Origin::EarthMoon);
    }
}

#[test]
fn test_batch_round_trip_preserves_every_element() {
    let transformer = Transformer::new(common::fixture_ephemeris());
    let good = common::heliocentric_circular();
    let states: Vec<CartesianState> = (0..5)
        .map(|i| CartesianState {
            position: Vector3::new(1.0 + 0.1 * i as f64, -0.2 * i as f64, 0.03),
            ..good.clone()
        })
        .collect();

    let forward = transformer
        .transform_batch(
            &states,
            ReferenceFrame::Equatorial,
            Origin::Jupiter,
            ErrorPolicy::FailFast,
        )
        .unwrap();
    let forward_states: Vec<CartesianState> =
        forward.into_iter().map(|r| r.unwrap()).collect();

    let back = transformer
        .transform_batch(
            &forward_states,
            ReferenceFrame::Ecliptic,
            Origin::Sun,
            ErrorPolicy::FailFast,
        )
        .unwrap();

    for (restored, original) in back.iter().zip(states.iter()) {
        let restored = restored.as_ref().unwrap();
        assert_relative_eq!(restored.position, original.position, max_relative = 1e-11);
        assert_relative_eq!(restored.velocity, original.velocity, max_relative = 1e-11);
    }
}
