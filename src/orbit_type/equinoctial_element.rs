//! Non-singular equinoctial elements `(a, h, k, p, q, λ)`, well conditioned
//! near zero eccentricity and zero inclination where the classical angles
//! degenerate.
use std::f64::consts::PI;
use std::fmt;

use nalgebra::Vector3;
use roots::{find_root_newton_raphson, SimpleConvergency};

use crate::cartesian::CartesianState;
use crate::constants::DPI;
use crate::helioframe_errors::HelioframeError;
use crate::kepler::principal_angle;
use crate::orbit_type::keplerian_element::KeplerianElements;
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;
use crate::time::HighPrecisionTime;

/// Equinoctial orbital elements.
///
/// Units:
/// - `semi_major_axis`: AU (must be positive; the set is elliptic-only)
/// - `eccentricity_sin_lon` (h), `eccentricity_cos_lon` (k): dimensionless
/// - `tan_half_incl_sin_node` (p), `tan_half_incl_cos_node` (q): dimensionless
/// - `mean_longitude` (λ = Ω + ω + M): radians
#[derive(Debug, Clone, PartialEq)]
pub struct EquinoctialElements {
    pub epoch: HighPrecisionTime,
    pub origin: Origin,
    pub frame: ReferenceFrame,
    pub semi_major_axis: f64,
    /// h = e · sin(Ω + ω)
    pub eccentricity_sin_lon: f64,
    /// k = e · cos(Ω + ω)
    pub eccentricity_cos_lon: f64,
    /// p = tan(i/2) · sin(Ω)
    pub tan_half_incl_sin_node: f64,
    /// q = tan(i/2) · cos(Ω)
    pub tan_half_incl_cos_node: f64,
    /// λ = Ω + ω + M
    pub mean_longitude: f64,
}

impl EquinoctialElements {
    /// Solve the longitude form of the Kepler equation,
    /// `F - k·sin(F) + h·cos(F) = λ`, for the eccentric longitude F.
    fn solve_kepler_equation(
        &self,
        mean_longitude: f64,
        longitude_of_periapsis: f64,
    ) -> Result<f64, HelioframeError> {
        let f = |fval: f64| -> f64 {
            fval - self.eccentricity_cos_lon * fval.sin() + self.eccentricity_sin_lon * fval.cos()
                - mean_longitude
        };

        let df = |fval: f64| -> f64 {
            1.0 - self.eccentricity_cos_lon * fval.cos() - self.eccentricity_sin_lon * fval.sin()
        };

        let x0 = PI + longitude_of_periapsis;

        let mut tol = SimpleConvergency {
            eps: f64::EPSILON * 1e2,
            max_iter: 50,
        };

        Ok(find_root_newton_raphson(x0, &f, &df, &mut tol)?)
    }

    /// Perifocal-free evaluation of position and velocity from the eccentric
    /// longitude, using the equinoctial basis vectors.
    fn cartesian_position_and_velocity(
        &self,
        mean_motion: f64,
        eccentric_longitude: f64,
        eccentricity_pow2: f64,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let beta = 1. / (1. + (1. - eccentricity_pow2).sqrt());

        let beta_ecc_term = beta * self.eccentricity_sin_lon * self.eccentricity_cos_lon;

        let sin_ecc_lon = eccentric_longitude.sin();
        let cos_ecc_lon = eccentric_longitude.cos();

        let xe = self.semi_major_axis
            * ((1. - beta * self.eccentricity_sin_lon.powi(2)) * cos_ecc_lon
                + beta_ecc_term * sin_ecc_lon
                - self.eccentricity_cos_lon);

        let ye = self.semi_major_axis
            * ((1. - beta * self.eccentricity_cos_lon.powi(2)) * sin_ecc_lon
                + beta_ecc_term * cos_ecc_lon
                - self.eccentricity_sin_lon);

        let u = 1. + self.tan_half_incl_sin_node.powi(2) + self.tan_half_incl_cos_node.powi(2);
        let inv_u = 1.0 / u;

        let common_component =
            2. * self.tan_half_incl_sin_node * self.tan_half_incl_cos_node * inv_u;

        let f_vector = Vector3::new(
            (1. - self.tan_half_incl_sin_node.powi(2) + self.tan_half_incl_cos_node.powi(2))
                * inv_u,
            common_component,
            -2. * self.tan_half_incl_sin_node * inv_u,
        );

        let g_vector = Vector3::new(
            common_component,
            (1. + self.tan_half_incl_sin_node.powi(2) - self.tan_half_incl_cos_node.powi(2))
                * inv_u,
            2. * self.tan_half_incl_cos_node * inv_u,
        );

        let position = xe * f_vector + ye * g_vector;

        let v_const =
            mean_motion * self.semi_major_axis.powi(2) / (xe.powi(2) + ye.powi(2)).sqrt();

        let v_xe = v_const
            * (beta_ecc_term * cos_ecc_lon
                - (1. - beta * self.eccentricity_sin_lon.powi(2)) * sin_ecc_lon);
        let v_ye = v_const
            * ((1. - beta * self.eccentricity_cos_lon.powi(2)) * cos_ecc_lon
                - beta_ecc_term * sin_ecc_lon);
        let velocity = v_xe * f_vector + v_ye * g_vector;

        (position, velocity)
    }

    /// Convert to a Cartesian state with the same epoch/origin/frame tags.
    ///
    /// Errors
    /// ------
    /// * `DegenerateElementConversion` when `a <= 0` (the equinoctial set is
    ///   elliptic-only).
    /// * `KeplerSolverDivergence` if the longitude equation does not converge.
    pub fn to_cartesian(&self, mu: f64) -> Result<CartesianState, HelioframeError> {
        if self.semi_major_axis <= 0.0 {
            return Err(HelioframeError::DegenerateElementConversion(
                "equinoctial elements require a positive semi-major axis".into(),
            ));
        }
        let mean_motion = (mu / self.semi_major_axis.powi(3)).sqrt();

        let eccentricity_pow2 =
            self.eccentricity_sin_lon.powi(2) + self.eccentricity_cos_lon.powi(2);
        let epsilon = f64::EPSILON * 1e2;

        let mut longitude_of_periapsis = 0.0;
        if eccentricity_pow2 > epsilon {
            longitude_of_periapsis =
                principal_angle(self.eccentricity_sin_lon.atan2(self.eccentricity_cos_lon));
        }

        let mut mean_longitude = principal_angle(self.mean_longitude);
        if mean_longitude < longitude_of_periapsis {
            mean_longitude += DPI;
        }

        let eccentric_longitude =
            self.solve_kepler_equation(mean_longitude, longitude_of_periapsis)?;

        let (position, velocity) = self.cartesian_position_and_velocity(
            mean_motion,
            eccentric_longitude,
            eccentricity_pow2,
        );

        Ok(CartesianState::new(
            self.epoch,
            position,
            velocity,
            self.origin,
            self.frame,
        ))
    }
}

impl From<&KeplerianElements> for EquinoctialElements {
    /// Forward mapping `(a, e, i, Ω, ω, M)` → `(a, h, k, p, q, λ)` with
    /// ϖ = Ω + ω and λ = M + ϖ.
    fn from(kep: &KeplerianElements) -> Self {
        let lon_periapsis = kep.ascending_node_longitude + kep.periapsis_argument;
        let tan_half_incl = (kep.inclination / 2.0).tan();

        EquinoctialElements {
            epoch: kep.epoch,
            origin: kep.origin,
            frame: kep.frame,
            semi_major_axis: kep.semi_major_axis,
            eccentricity_sin_lon: kep.eccentricity * lon_periapsis.sin(),
            eccentricity_cos_lon: kep.eccentricity * lon_periapsis.cos(),
            tan_half_incl_sin_node: tan_half_incl * kep.ascending_node_longitude.sin(),
            tan_half_incl_cos_node: tan_half_incl * kep.ascending_node_longitude.cos(),
            mean_longitude: principal_angle(kep.mean_anomaly + lon_periapsis),
        }
    }
}

impl From<KeplerianElements> for EquinoctialElements {
    fn from(kep: KeplerianElements) -> Self {
        (&kep).into()
    }
}

impl From<&EquinoctialElements> for KeplerianElements {
    /// Inverse mapping; near-circular sets get ϖ = 0 and near-equatorial sets
    /// get Ω = 0, all final angles normalized to `[0, 2π)`.
    fn from(equinoctial: &EquinoctialElements) -> Self {
        let eps = 1.0e-12;

        let ecc = (equinoctial.eccentricity_sin_lon.powi(2)
            + equinoctial.eccentricity_cos_lon.powi(2))
        .sqrt();

        let lon_periapsis = if ecc < eps {
            0.0
        } else {
            equinoctial
                .eccentricity_sin_lon
                .atan2(equinoctial.eccentricity_cos_lon)
        };

        let tan_half_incl = (equinoctial.tan_half_incl_sin_node.powi(2)
            + equinoctial.tan_half_incl_cos_node.powi(2))
        .sqrt();

        let ascending_node = if tan_half_incl < eps {
            0.0
        } else {
            equinoctial
                .tan_half_incl_sin_node
                .atan2(equinoctial.tan_half_incl_cos_node)
        };

        KeplerianElements {
            epoch: equinoctial.epoch,
            origin: equinoctial.origin,
            frame: equinoctial.frame,
            semi_major_axis: equinoctial.semi_major_axis,
            eccentricity: ecc,
            inclination: 2.0 * tan_half_incl.atan(),
            ascending_node_longitude: principal_angle(ascending_node),
            periapsis_argument: principal_angle(lon_periapsis - ascending_node),
            mean_anomaly: principal_angle(equinoctial.mean_longitude - lon_periapsis),
        }
    }
}

impl From<EquinoctialElements> for KeplerianElements {
    fn from(equinoctial: EquinoctialElements) -> Self {
        (&equinoctial).into()
    }
}

impl fmt::Display for EquinoctialElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Equinoctial Elements @ epoch: {}", self.epoch)?;
        writeln!(f, "  origin = {}, frame = {}", self.origin, self.frame)?;
        writeln!(f, "---------------------------------------------")?;
        writeln!(f, "  a  = {:.6} AU", self.semi_major_axis)?;
        writeln!(f, "  h  = {:.6}", self.eccentricity_sin_lon)?;
        writeln!(f, "  k  = {:.6}", self.eccentricity_cos_lon)?;
        writeln!(f, "  p  = {:.6}", self.tan_half_incl_sin_node)?;
        writeln!(f, "  q  = {:.6}", self.tan_half_incl_cos_node)?;
        write!(f, "  λ  = {:.6} rad", self.mean_longitude)
    }
}
