//! # Cometary orbital elements
//!
//! Perihelion-based element set `(q, e, i, Ω, ω, T_peri)`, the parabolic-safe
//! parameterization: unlike the Keplerian form it stays finite and
//! well-conditioned through `e = 1`, so it is the representation of choice for
//! parabolic and hyperbolic solutions and for the `e ≈ 1` band the Keplerian
//! form refuses.
//!
//! Units & conventions
//! --------------------
//! - Distances in **AU**, angles in **radians**.
//! - `perihelion_time` is the MJD of pericenter passage, read in the same
//!   time scale as `epoch`.
use std::fmt;

use nalgebra::Vector3;

use crate::cartesian::CartesianState;
use crate::helioframe_errors::HelioframeError;
use crate::kepler::{
    principal_angle, solve_barker, solve_elliptic_kepler, solve_hyperbolic_kepler,
};
use crate::orbit_type::keplerian_element::KeplerianElements;
use crate::orbit_type::{perifocal_rotation, PARABOLIC_ECC_TOL};
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;
use crate::time::HighPrecisionTime;

/// Cometary (perihelion-based) orbital elements.
#[derive(Debug, Clone, PartialEq)]
pub struct CometaryElements {
    pub epoch: HighPrecisionTime,
    pub origin: Origin,
    pub frame: ReferenceFrame,
    /// Perihelion distance `q` (AU).
    pub perihelion_distance: f64,
    /// Eccentricity `e` (any conic: `e < 1`, `e = 1`, `e > 1`).
    pub eccentricity: f64,
    /// Inclination `i` (rad).
    pub inclination: f64,
    /// Longitude of the ascending node `Ω` (rad).
    pub ascending_node_longitude: f64,
    /// Argument of periapsis `ω` (rad).
    pub periapsis_argument: f64,
    /// Time of perihelion passage (MJD, same scale as `epoch`).
    pub perihelion_time: f64,
}

impl CometaryElements {
    /// Hyperbolic mean anomaly from `(e, ν)`:
    /// `tanh(H/2) = √((e-1)/(e+1)) · tan(ν/2)`, then `M = e·sinh(H) − H`.
    pub fn hyperbolic_mean_anomaly(e: f64, nu: f64) -> f64 {
        assert!(e > 1.0, "eccentricity must be > 1 for hyperbolic orbits");

        let tanh_half_h = ((e - 1.0) / (e + 1.0)).sqrt() * (nu / 2.0).tan();
        let h = 2.0 * tanh_half_h.atanh();
        e * h.sinh() - h
    }

    /// True anomaly at the element epoch, from the time since perihelion.
    ///
    /// Routes by conic domain: elliptic and hyperbolic cases go through the
    /// matching Kepler equation, the `|e - 1| < 1e-10` band through Barker's
    /// closed form.
    pub fn true_anomaly(&self, mu: f64) -> Result<f64, HelioframeError> {
        let e = self.eccentricity;
        let q = self.perihelion_distance;
        let dt = self.epoch.mjd() - self.perihelion_time;

        if (e - 1.0).abs() <= PARABOLIC_ECC_TOL {
            return Ok(solve_barker(dt, q, mu));
        }
        if e < 1.0 {
            let a = q / (1.0 - e);
            let n = (mu / a.powi(3)).sqrt();
            let big_e = solve_elliptic_kepler(n * dt, e)?;
            Ok(((1.0 - e * e).sqrt() * big_e.sin()).atan2(big_e.cos() - e))
        } else {
            let a = q / (1.0 - e); // negative
            let n = (mu / (-a).powi(3)).sqrt();
            let h = solve_hyperbolic_kepler(n * dt, e)?;
            let half = ((e + 1.0) / (e - 1.0)).sqrt() * (h / 2.0).tanh();
            Ok(2.0 * half.atan())
        }
    }

    /// Convert to a Cartesian state with the same epoch/origin/frame tags.
    ///
    /// Total over all conic domains; this is the variant that stays defined
    /// where the Keplerian form degenerates.
    pub fn to_cartesian(&self, mu: f64) -> Result<CartesianState, HelioframeError> {
        let e = self.eccentricity;
        let nu = self.true_anomaly(mu)?;

        // p = q (1 + e) holds for every conic, parabola included
        let p = self.perihelion_distance * (1.0 + e);
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

    /// Convert to Keplerian elements.
    ///
    /// For `e < 1` the mean anomaly is the elliptic M at epoch; for `e > 1` it
    /// is the hyperbolic mean anomaly and `a < 0`. The parabolic band has no
    /// finite semi-major axis and is refused.
    ///
    /// Errors
    /// ------
    /// `DegenerateElementConversion` when `|e - 1| < 1e-10`.
    pub fn to_keplerian(&self, mu: f64) -> Result<KeplerianElements, HelioframeError> {
        let e = self.eccentricity;
        if (e - 1.0).abs() < PARABOLIC_ECC_TOL {
            return Err(HelioframeError::DegenerateElementConversion(
                "parabolic orbit cannot be represented with a finite semi-major axis".into(),
            ));
        }

        let a = self.perihelion_distance / (1.0 - e);
        let n = (mu / a.abs().powi(3)).sqrt();
        let dt = self.epoch.mjd() - self.perihelion_time;
        let mean_anomaly = if e < 1.0 {
            principal_angle(n * dt)
        } else {
            n * dt
        };

        Ok(KeplerianElements {
            epoch: self.epoch,
            origin: self.origin,
            frame: self.frame,
            semi_major_axis: a,
            eccentricity: e,
            inclination: self.inclination,
            ascending_node_longitude: self.ascending_node_longitude,
            periapsis_argument: self.periapsis_argument,
            mean_anomaly,
        })
    }
}

impl fmt::Display for CometaryElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;
        writeln!(f, "Cometary Elements @ epoch: {}", self.epoch)?;
        writeln!(f, "  origin = {}, frame = {}", self.origin, self.frame)?;
        writeln!(f, "------------------------------------------------")?;
        writeln!(
            f,
            "  q   (perihelion distance)     = {:.6} AU",
            self.perihelion_distance
        )?;
        writeln!(
            f,
            "  e   (eccentricity)            = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)             = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)       = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis)   = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        write!(
            f,
            "  Tp  (perihelion passage)      = MJD {:.6}",
            self.perihelion_time
        )
    }
}
