//! Anomaly solvers for the two-body element conversions.
//!
//! All iterative solvers share the same budget: Newton–Raphson with at most
//! [`KEPLER_MAX_ITER`] iterations and a convergence tolerance of
//! [`KEPLER_TOL`] radians. A solver that fails to converge reports
//! `KeplerSolverDivergence` instead of returning a stale estimate.
use std::f64::consts::PI;

use crate::constants::DPI;
use crate::helioframe_errors::HelioframeError;

/// Iteration cap shared by the anomaly solvers.
pub const KEPLER_MAX_ITER: usize = 50;

/// Convergence tolerance of the anomaly solvers, radians.
pub const KEPLER_TOL: f64 = 1e-12;

/// Principal value of an angle, in [0, 2π).
pub fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Principal difference between two angles, in [-π, π].
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let mut diff = principal_angle(a) - principal_angle(b);
    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }
    diff
}

/// Solve the elliptic Kepler equation `M = E - e sin E` for E.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: M (radians, any value).
/// * `eccentricity`: e, must satisfy `0 <= e < 1`.
///
/// Return
/// ------
/// * Eccentric anomaly E in radians, with `E - e sin E = M (mod 2π)`.
///
/// Errors
/// ------
/// * `KeplerSolverDivergence` if Newton iteration does not converge within
///   the shared budget.
pub fn solve_elliptic_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, HelioframeError> {
    let m = principal_angle(mean_anomaly);

    // Danby's starter keeps Newton stable for high eccentricity
    let mut e_anom = if eccentricity > 0.8 { PI } else { m };
    let mut step = f64::MAX;

    for _ in 0..KEPLER_MAX_ITER {
        let f = e_anom - eccentricity * e_anom.sin() - m;
        let fp = 1.0 - eccentricity * e_anom.cos();
        step = -f / fp;
        e_anom += step;
        if step.abs() < KEPLER_TOL {
            return Ok(e_anom);
        }
    }

    Err(HelioframeError::KeplerSolverDivergence {
        iterations: KEPLER_MAX_ITER,
        last_step: step,
    })
}

/// Solve the hyperbolic Kepler equation `M = e sinh H - H` for H.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: hyperbolic mean anomaly M (radians, any sign).
/// * `eccentricity`: e, must satisfy `e > 1`.
///
/// Return
/// ------
/// * Hyperbolic anomaly H, same sign as M.
///
/// Errors
/// ------
/// * `KeplerSolverDivergence` if Newton iteration does not converge within
///   the shared budget.
pub fn solve_hyperbolic_kepler(
    mean_anomaly: f64,
    eccentricity: f64,
) -> Result<f64, HelioframeError> {
    let m = mean_anomaly;

    // asinh starter; exact for e -> inf, close enough elsewhere
    let mut h = (m / eccentricity).asinh();
    let mut step = f64::MAX;

    for _ in 0..KEPLER_MAX_ITER {
        let f = eccentricity * h.sinh() - h - m;
        let fp = eccentricity * h.cosh() - 1.0;
        step = -f / fp;
        h += step;
        if step.abs() < KEPLER_TOL {
            return Ok(h);
        }
    }

    Err(HelioframeError::KeplerSolverDivergence {
        iterations: KEPLER_MAX_ITER,
        last_step: step,
    })
}

/// Solve Barker's equation for the parabolic true anomaly.
///
/// For a parabola, `D + D³/3 = √(µ / 2q³) · Δt` with `D = tan(ν/2)` has the
/// closed-form Cardano solution; no iteration is involved.
///
/// Arguments
/// ---------
/// * `dt_days`: time since perihelion passage (days, signed).
/// * `perihelion_distance`: q (AU).
/// * `mu`: gravitational parameter (AU³/day²).
///
/// Return
/// ------
/// * True anomaly ν in (-π, π).
pub fn solve_barker(dt_days: f64, perihelion_distance: f64, mu: f64) -> f64 {
    let a = 1.5 * (mu / (2.0 * perihelion_distance.powi(3))).sqrt() * dt_days;
    let b = (a + (a * a + 1.0).sqrt()).cbrt();
    let d = b - 1.0 / b;
    2.0 * d.atan()
}
