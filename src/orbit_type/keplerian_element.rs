//! # Keplerian orbital elements
//!
//! Classical element set `(a, e, i, Ω, ω, M)` tagged with the epoch, origin
//! and frame of the state it parameterizes.
//!
//! ## Units
//!
//! - Lengths: **AU**
//! - Angles: **radians**
//! - Gravitational parameter µ: **AU³/day²**, supplied by the caller on every
//!   conversion (a property of the chosen origin body, not of the state; a
//!   wrong µ yields numerically well-defined but physically wrong elements).
//!
//! ## Conic domains
//!
//! - `e < 1`: bound orbit, `a > 0`, `mean_anomaly` is the elliptic M.
//! - `e > 1`: hyperbolic orbit, `a < 0`, `mean_anomaly` is the **hyperbolic**
//!   mean anomaly and conversions go through the hyperbolic Kepler equation.
//! - `|e - 1| < 1e-10`: no finite semi-major axis; conversions are refused in
//!   favour of the parabolic-safe [`CometaryElements`] form.
//!
//! ## Degeneracies
//!
//! Near-circular (`e ≈ 0`) and near-equatorial (`i ≈ 0` or `i ≈ π`) states
//! produced by [`OrbitalElements::from_cartesian`] adopt the conventional
//! `ω = 0` / `Ω = 0` rather than leaving the angles undefined.
//!
//! [`CometaryElements`]: crate::orbit_type::cometary_element::CometaryElements
//! [`OrbitalElements::from_cartesian`]: crate::orbit_type::OrbitalElements::from_cartesian
use std::f64::consts::PI;
use std::fmt;

use nalgebra::Vector3;

use crate::cartesian::CartesianState;
use crate::constants::DPI;
use crate::helioframe_errors::HelioframeError;
use crate::kepler::{
    principal_angle, solve_elliptic_kepler, solve_hyperbolic_kepler,
};
use crate::orbit_type::cometary_element::CometaryElements;
use crate::orbit_type::{perifocal_rotation, PARABOLIC_ECC_TOL};
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;
use crate::time::HighPrecisionTime;

/// Classical Keplerian elements (osculating, two-body).
#[derive(Debug, Clone, PartialEq)]
pub struct KeplerianElements {
    pub epoch: HighPrecisionTime,
    pub origin: Origin,
    pub frame: ReferenceFrame,
    /// Semi-major axis `a` (AU); negative for hyperbolic orbits.
    pub semi_major_axis: f64,
    /// Eccentricity `e` (unitless).
    pub eccentricity: f64,
    /// Inclination `i` (rad).
    pub inclination: f64,
    /// Longitude of the ascending node `Ω` (rad).
    pub ascending_node_longitude: f64,
    /// Argument of periapsis `ω` (rad).
    pub periapsis_argument: f64,
    /// Mean anomaly `M` (rad); hyperbolic mean anomaly when `e > 1`.
    pub mean_anomaly: f64,
}

impl KeplerianElements {
    /// Mean motion n = √(µ/|a|³), rad/day.
    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.semi_major_axis.abs().powi(3)).sqrt()
    }

    /// Orbital period 2π/n in days; `None` for unbound orbits.
    pub fn period(&self, mu: f64) -> Option<f64> {
        (self.eccentricity < 1.0).then(|| DPI / self.mean_motion(mu))
    }

    /// True anomaly at epoch, solving the Kepler equation appropriate to the
    /// conic domain.
    pub fn true_anomaly(&self) -> Result<f64, HelioframeError> {
        let e = self.eccentricity;
        if (e - 1.0).abs() < PARABOLIC_ECC_TOL {
            return Err(HelioframeError::DegenerateElementConversion(
                "eccentricity within 1e-10 of 1; use the cometary form".into(),
            ));
        }
        if e < 1.0 {
            let big_e = solve_elliptic_kepler(self.mean_anomaly, e)?;
            Ok(((1.0 - e * e).sqrt() * big_e.sin()).atan2(big_e.cos() - e))
        } else {
            let h = solve_hyperbolic_kepler(self.mean_anomaly, e)?;
            let half = ((e + 1.0) / (e - 1.0)).sqrt() * (h / 2.0).tanh();
            Ok(2.0 * half.atan())
        }
    }

    /// Convert to a Cartesian state with the same epoch/origin/frame tags.
    ///
    /// Deterministic closed form: solve the Kepler equation for the anomaly,
    /// evaluate the perifocal position/velocity, and rotate into the element
    /// frame.
    ///
    /// Errors
    /// ------
    /// * `DegenerateElementConversion` for `|e - 1| < 1e-10`.
    /// * `KeplerSolverDivergence` if the anomaly iteration does not converge.
    pub fn to_cartesian(&self, mu: f64) -> Result<CartesianState, HelioframeError> {
        let e = self.eccentricity;
        let nu = self.true_anomaly()?;

        // semilatus rectum is positive for both signs of a
        let p = self.semi_major_axis * (1.0 - e * e);
        let r_mag = p / (1.0 + e * nu.cos());
        let vel_scale = (mu / p).sqrt();

        let r_pqw = Vector3::new(r_mag * nu.cos(), r_mag * nu.sin(), 0.0);
        let v_pqw = Vector3::new(-vel_scale * nu.sin(), vel_scale * (e + nu.cos()), 0.0);

        let rot = perifocal_rotation(
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
        );

        Ok(CartesianState::new(
            self.epoch,
            rot * r_pqw,
            rot * v_pqw,
            self.origin,
            self.frame,
        ))
    }

    /// Convert to the perihelion-based cometary form.
    ///
    /// The perihelion time follows the nearest-passage convention: for bound
    /// orbits with `M > π` the upcoming passage is taken, otherwise the most
    /// recent one; hyperbolic orbits have a single passage.
    ///
    /// Errors
    /// ------
    /// `DegenerateElementConversion` when `|e - 1| < 1e-10` (no finite
    /// semi-major axis to derive the mean motion from).
    pub fn to_cometary(&self, mu: f64) -> Result<CometaryElements, HelioframeError> {
        let e = self.eccentricity;
        if (e - 1.0).abs() < PARABOLIC_ECC_TOL {
            return Err(HelioframeError::DegenerateElementConversion(
                "parabolic Keplerian set carries no finite mean motion".into(),
            ));
        }

        let n = self.mean_motion(mu);
        let t0 = self.epoch.mjd();
        let perihelion_time = if e < 1.0 {
            let m = principal_angle(self.mean_anomaly);
            if m > PI {
                t0 + (DPI - m) / n
            } else {
                t0 - m / n
            }
        } else {
            t0 - self.mean_anomaly / n
        };

        Ok(CometaryElements {
            epoch: self.epoch,
            origin: self.origin,
            frame: self.frame,
            perihelion_distance: self.semi_major_axis * (1.0 - e),
            eccentricity: e,
            inclination: self.inclination,
            ascending_node_longitude: self.ascending_node_longitude,
            periapsis_argument: self.periapsis_argument,
            perihelion_time,
        })
    }

    /// Normalize the angular elements (Ω, ω, and elliptic M) to `[0, 2π)`.
    pub fn normalized(mut self) -> Self {
        self.ascending_node_longitude = principal_angle(self.ascending_node_longitude);
        self.periapsis_argument = principal_angle(self.periapsis_argument);
        if self.eccentricity < 1.0 {
            self.mean_anomaly = principal_angle(self.mean_anomaly);
        }
        self
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;
        writeln!(f, "Keplerian Elements @ epoch: {}", self.epoch)?;
        writeln!(f, "  origin = {}, frame = {}", self.origin, self.frame)?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.6} AU",
            self.semi_major_axis
        )?;
        writeln!(f, "  e   (eccentricity)          = {:.6}", self.eccentricity)?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        write!(
            f,
            "  M   (mean anomaly)          = {:.6} rad ({:.6}°)",
            self.mean_anomaly,
            self.mean_anomaly * rad_to_deg
        )
    }
}
