//! # Orbital element representations
//!
//! This module defines the **orbital element sets** the crate can express a
//! Cartesian state in, and the conversions between them:
//!
//! - [`keplerian_element`] — Classical elements `(a, e, i, Ω, ω, M)`, valid
//!   for elliptic and (with hyperbolic mean anomaly) hyperbolic orbits.
//! - [`cometary_element`] — Perihelion form `(q, e, i, Ω, ω, T_peri)`, total
//!   over every conic including the parabolic band.
//! - [`equinoctial_element`] — Non-singular elements `(a, h, k, p, q, λ)`,
//!   robust near `e ≈ 0` and `i ≈ 0`.
//!
//! The [`OrbitalElements`] enum is the sum type over the three, with a
//! conic-aware constructor from Cartesian states and uniform conversion
//! methods. All conversions take the gravitational parameter µ explicitly:
//! µ belongs to the chosen origin body, not to the state, and passing a wrong
//! µ produces physically wrong but numerically well-defined elements — that
//! contract is the caller's to uphold.
//!
//! ## Edge policies
//!
//! - `|e − 1| < 1e-10` routes to the cometary form; the Keplerian/equinoctial
//!   forms refuse it with `DegenerateElementConversion`.
//! - `i` within `1e-10` of `0` or `π` sets `Ω = 0` by convention.
//! - `e < 1e-10` sets `ω = 0` and measures the anomaly from the node.
use nalgebra::{Matrix3, Vector3};

use crate::cartesian::CartesianState;
use crate::helioframe_errors::HelioframeError;
use crate::kepler::principal_angle;
use crate::ref_system::rotmt;

pub mod cometary_element;
pub mod equinoctial_element;
pub mod keplerian_element;

use cometary_element::CometaryElements;
use equinoctial_element::EquinoctialElements;
use keplerian_element::KeplerianElements;

/// Eccentricities within this band of 1.0 are treated as parabolic.
pub const PARABOLIC_ECC_TOL: f64 = 1e-10;

/// Eccentricities below this are treated as circular (ω set to 0).
pub const CIRCULAR_ECC_TOL: f64 = 1e-10;

/// Inclinations within this band of 0 or π are treated as equatorial
/// (Ω set to 0).
pub const EQUATORIAL_INCL_TOL: f64 = 1e-10;

/// Rotation taking perifocal (PQW) components into the element frame:
/// `R = Rz(Ω) · Rx(i) · Rz(ω)`.
pub(crate) fn perifocal_rotation(inclination: f64, node: f64, periapsis: f64) -> Matrix3<f64> {
    rotmt(node, 2) * rotmt(inclination, 0) * rotmt(periapsis, 2)
}

/// Frame-independent conic geometry of a Cartesian state.
struct ConicGeometry {
    eccentricity: f64,
    semilatus_rectum: f64,
    inclination: f64,
    ascending_node: f64,
    periapsis_argument: f64,
    true_anomaly: f64,
    specific_energy: f64,
}

/// Decompose a position/velocity pair into conic geometry.
///
/// Uses the angular-momentum, node, and Laplace–Runge–Lenz vectors; the
/// near-circular and near-equatorial conventions of the module are applied
/// here so every consumer sees the same angles.
fn conic_geometry(state: &CartesianState, mu: f64) -> Result<ConicGeometry, HelioframeError> {
    let r = state.position;
    let v = state.velocity;
    let r_mag = r.norm();
    if r_mag == 0.0 {
        return Err(HelioframeError::DegenerateElementConversion(
            "state at the coordinate origin has no conic geometry".into(),
        ));
    }

    let angular_momentum = r.cross(&v);
    let h_mag = angular_momentum.norm();
    if h_mag < f64::EPSILON {
        return Err(HelioframeError::DegenerateElementConversion(
            "rectilinear trajectory (zero angular momentum)".into(),
        ));
    }
    let h_unit = angular_momentum / h_mag;

    let v2 = v.norm_squared();
    let specific_energy = v2 / 2.0 - mu / r_mag;
    let semilatus_rectum = h_mag * h_mag / mu;

    // Laplace-Runge-Lenz vector, pointing at periapsis
    let lenz = v.cross(&angular_momentum) / mu - r / r_mag;
    let eccentricity = lenz.norm();

    let inclination = (h_unit.z).clamp(-1.0, 1.0).acos();

    // node vector ẑ × h vanishes for equatorial orbits; fall back to x̂
    let node = Vector3::new(-angular_momentum.y, angular_momentum.x, 0.0);
    let node_mag = node.norm();
    let near_equatorial = node_mag / h_mag < EQUATORIAL_INCL_TOL;
    let (ascending_node, node_dir) = if near_equatorial {
        (0.0, Vector3::x())
    } else {
        (principal_angle(node.y.atan2(node.x)), node / node_mag)
    };

    let r_unit = r / r_mag;
    let (periapsis_argument, true_anomaly) = if eccentricity < CIRCULAR_ECC_TOL {
        // circular orbit: measure the anomaly from the node itself
        let cos_u = node_dir.dot(&r_unit);
        let sin_u = node_dir.cross(&r_unit).dot(&h_unit);
        (0.0, principal_angle(sin_u.atan2(cos_u)))
    } else {
        let e_unit = lenz / eccentricity;
        let cos_w = node_dir.dot(&e_unit);
        let sin_w = node_dir.cross(&e_unit).dot(&h_unit);
        let cos_nu = e_unit.dot(&r_unit);
        let sin_nu = e_unit.cross(&r_unit).dot(&h_unit);
        (
            principal_angle(sin_w.atan2(cos_w)),
            sin_nu.atan2(cos_nu),
        )
    };

    Ok(ConicGeometry {
        eccentricity,
        semilatus_rectum,
        inclination,
        ascending_node,
        periapsis_argument,
        true_anomaly,
        specific_energy,
    })
}

/// Canonical orbital elements in multiple representations.
///
/// Variants
/// --------
/// * `Keplerian`  — classical elements; produced for bound non-degenerate
///   orbits.
/// * `Cometary`   — perihelion form; produced for the parabolic band and
///   hyperbolic orbits.
/// * `Equinoctial` — non-singular form; never produced by
///   [`OrbitalElements::from_cartesian`] but accepted everywhere else.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitalElements {
    Keplerian(KeplerianElements),
    Cometary(CometaryElements),
    Equinoctial(EquinoctialElements),
}

impl OrbitalElements {
    /// Build orbital elements from a Cartesian state.
    ///
    /// The conic domain selects the representation: bound orbits with
    /// `e < 1 − 1e-10` yield [`OrbitalElements::Keplerian`]; everything else
    /// (the parabolic band and hyperbolic orbits) yields
    /// [`OrbitalElements::Cometary`], whose fields stay finite there.
    ///
    /// Arguments
    /// ---------
    /// * `state`: the state to reparameterize; epoch/origin/frame tags are
    ///   carried over unchanged.
    /// * `mu`: gravitational parameter of the origin body (AU³/day²).
    pub fn from_cartesian(state: &CartesianState, mu: f64) -> Result<Self, HelioframeError> {
        let geom = conic_geometry(state, mu)?;
        let e = geom.eccentricity;

        if e < 1.0 - PARABOLIC_ECC_TOL {
            // eccentric anomaly from the true anomaly, then Kepler's equation
            let nu = geom.true_anomaly;
            let big_e = ((1.0 - e * e).sqrt() * nu.sin()).atan2(e + nu.cos());
            let mean_anomaly = principal_angle(big_e - e * big_e.sin());
            let semi_major_axis = -mu / (2.0 * geom.specific_energy);

            Ok(OrbitalElements::Keplerian(KeplerianElements {
                epoch: state.epoch,
                origin: state.origin,
                frame: state.frame,
                semi_major_axis,
                eccentricity: e,
                inclination: geom.inclination,
                ascending_node_longitude: geom.ascending_node,
                periapsis_argument: geom.periapsis_argument,
                mean_anomaly,
            }))
        } else {
            let q = geom.semilatus_rectum / (1.0 + e);
            let nu = geom.true_anomaly;
            let t0 = state.epoch.mjd();

            let perihelion_time = if (e - 1.0).abs() <= PARABOLIC_ECC_TOL {
                // Barker's equation gives the time from perihelion directly
                let d = (nu / 2.0).tan();
                let dt = (2.0 * q.powi(3) / mu).sqrt() * (d + d.powi(3) / 3.0);
                t0 - dt
            } else {
                let half_h = ((e - 1.0) / (e + 1.0)).sqrt() * (nu / 2.0).tan();
                let big_h = 2.0 * half_h.atanh();
                let mean_anomaly = e * big_h.sinh() - big_h;
                let a = q / (1.0 - e); // negative
                let n = (mu / (-a).powi(3)).sqrt();
                t0 - mean_anomaly / n
            };

            Ok(OrbitalElements::Cometary(CometaryElements {
                epoch: state.epoch,
                origin: state.origin,
                frame: state.frame,
                perihelion_distance: q,
                eccentricity: e,
                inclination: geom.inclination,
                ascending_node_longitude: geom.ascending_node,
                periapsis_argument: geom.periapsis_argument,
                perihelion_time,
            }))
        }
    }

    /// Convert whatever representation this is back to a Cartesian state.
    pub fn to_cartesian(&self, mu: f64) -> Result<CartesianState, HelioframeError> {
        match self {
            OrbitalElements::Keplerian(ke) => ke.to_cartesian(mu),
            OrbitalElements::Cometary(ce) => ce.to_cartesian(mu),
            OrbitalElements::Equinoctial(ee) => ee.to_cartesian(mu),
        }
    }

    /// Convert to Keplerian elements, if the conic domain allows it.
    ///
    /// Errors
    /// ------
    /// `DegenerateElementConversion` for parabolic cometary sets.
    pub fn to_keplerian(&self, mu: f64) -> Result<KeplerianElements, HelioframeError> {
        match self {
            OrbitalElements::Keplerian(ke) => Ok(ke.clone()),
            OrbitalElements::Cometary(ce) => ce.to_keplerian(mu),
            OrbitalElements::Equinoctial(ee) => Ok(ee.into()),
        }
    }

    /// Convert to the cometary (perihelion) form.
    ///
    /// Errors
    /// ------
    /// `DegenerateElementConversion` for parabolic Keplerian/equinoctial sets
    /// (the mean motion is undefined there; parabolic states reach the
    /// cometary form through [`OrbitalElements::from_cartesian`] instead).
    pub fn to_cometary(&self, mu: f64) -> Result<CometaryElements, HelioframeError> {
        match self {
            OrbitalElements::Cometary(ce) => Ok(ce.clone()),
            OrbitalElements::Keplerian(ke) => ke.to_cometary(mu),
            OrbitalElements::Equinoctial(ee) => KeplerianElements::from(ee).to_cometary(mu),
        }
    }

    /// Convert to equinoctial elements, if the conic domain allows it.
    ///
    /// Errors
    /// ------
    /// `DegenerateElementConversion` for parabolic or hyperbolic sets
    /// (the equinoctial form is elliptic-only).
    pub fn to_equinoctial(&self, mu: f64) -> Result<EquinoctialElements, HelioframeError> {
        match self {
            OrbitalElements::Keplerian(ke) => Ok(ke.into()),
            OrbitalElements::Equinoctial(ee) => Ok(ee.clone()),
            OrbitalElements::Cometary(ce) => {
                if ce.eccentricity >= 1.0 - PARABOLIC_ECC_TOL {
                    return Err(HelioframeError::DegenerateElementConversion(
                        "equinoctial elements only exist for bound orbits".into(),
                    ));
                }
                Ok((&ce.to_keplerian(mu)?).into())
            }
        }
    }

    /// Get a reference to the underlying [`KeplerianElements`] if this is `Keplerian`.
    pub fn as_keplerian(&self) -> Option<&KeplerianElements> {
        if let OrbitalElements::Keplerian(ref k) = self {
            Some(k)
        } else {
            None
        }
    }

    /// Get a reference to the underlying [`CometaryElements`] if this is `Cometary`.
    pub fn as_cometary(&self) -> Option<&CometaryElements> {
        if let OrbitalElements::Cometary(ref c) = self {
            Some(c)
        } else {
            None
        }
    }

    /// Get a reference to the underlying [`EquinoctialElements`] if this is `Equinoctial`.
    pub fn as_equinoctial(&self) -> Option<&EquinoctialElements> {
        if let OrbitalElements::Equinoctial(ref e) = self {
            Some(e)
        } else {
            None
        }
    }
}

use std::fmt;

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitalElements::Keplerian(k) => {
                writeln!(f, "[Keplerian representation]")?;
                write!(f, "{k}")
            }
            OrbitalElements::Cometary(c) => {
                writeln!(f, "[Cometary representation]")?;
                write!(f, "{c}")
            }
            OrbitalElements::Equinoctial(e) => {
                writeln!(f, "[Equinoctial representation]")?;
                write!(f, "{e}")
            }
        }
    }
}
