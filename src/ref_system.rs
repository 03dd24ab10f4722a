//! # Reference frames and rotations
//!
//! The crate expresses state vectors in one of two fixed orientations:
//!
//! - `Equatorial` — equatorial mean J2000 (ICRF-aligned), the canonical frame
//!   every ephemeris lookup is returned in;
//! - `Ecliptic` — ecliptic mean J2000, related to the equatorial frame by a
//!   single rotation about the X axis through the mean obliquity at J2000.
//!
//! Both orientations are epoch-independent, so the rotation between them is a
//! pure function of the two frame tags. The frames are treated as mutually
//! non-rotating: applying a rotation to a state rotates position and velocity
//! by the same matrix, with no angular-rate correction.
use nalgebra::{Matrix3, Rotation3, Vector3};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::{Radian, RADSEC};

/// Orientation convention of a state vector's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// Equatorial mean J2000 (canonical).
    Equatorial,
    /// Ecliptic mean J2000.
    Ecliptic,
}

impl std::fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceFrame::Equatorial => write!(f, "EQUATORIAL"),
            ReferenceFrame::Ecliptic => write!(f, "ECLIPTIC"),
        }
    }
}

impl std::str::FromStr for ReferenceFrame {
    type Err = crate::helioframe_errors::HelioframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUATORIAL" => Ok(ReferenceFrame::Equatorial),
            "ECLIPTIC" => Ok(ReferenceFrame::Ecliptic),
            other => Err(crate::helioframe_errors::HelioframeError::InvalidTabularField {
                field: "frame",
                value: other.to_string(),
            }),
        }
    }
}

/// Rotating a vector from equatorial into ecliptic components is a rotation by
/// `-ε` about X; both matrices are built once and reused.
static ROT_EQUATORIAL_TO_ECLIPTIC: Lazy<Matrix3<f64>> = Lazy::new(|| rotmt(-obleq_j2000(), 0));
static ROT_ECLIPTIC_TO_EQUATORIAL: Lazy<Matrix3<f64>> = Lazy::new(|| rotmt(obleq_j2000(), 0));

impl ReferenceFrame {
    /// Rotation matrix taking components expressed in `self` to components
    /// expressed in `other`: `x_other = R · x_self`.
    ///
    /// Pure and epoch-independent; `rotation_to(B)` composed with the reverse
    /// rotation is the identity to better than 1e-12.
    pub fn rotation_to(&self, other: ReferenceFrame) -> Matrix3<f64> {
        match (self, other) {
            (ReferenceFrame::Equatorial, ReferenceFrame::Ecliptic) => *ROT_EQUATORIAL_TO_ECLIPTIC,
            (ReferenceFrame::Ecliptic, ReferenceFrame::Equatorial) => *ROT_ECLIPTIC_TO_EQUATORIAL,
            _ => Matrix3::identity(),
        }
    }
}

/// Mean obliquity of the ecliptic at J2000 (IAU 1976 model, constant term).
///
/// The full polynomial reduces to its constant term at the J2000 epoch:
/// ε₀ = 23° 26′ 21.448″.
pub fn obleq_j2000() -> Radian {
    ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal
/// axes (X, Y, or Z).
///
/// This builds an **active rotation** of a 3D vector by an angle `alpha`
/// around the chosen axis, in the direct (counter-clockwise) sense.
///
/// Arguments
/// ---------
/// * `alpha` - Rotation angle in radians.
/// * `k` - Index of the axis of rotation: `0` → X, `1` → Y, `2` → Z.
///
/// Return
/// ------
/// * A 3×3 orthonormal matrix `R` such that the rotated vector is `x' = R·x`,
///   satisfying `R.transpose() == R.inverse()`.
///
/// Panics
/// ------
/// * If `k > 2`.
pub fn rotmt(alpha: f64, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_obliquity_value() {
        assert_eq!(obleq_j2000(), 0.40909280422232897);
    }

    #[test]
    fn test_equatorial_to_ecliptic_matrix() {
        let rot = ReferenceFrame::Equatorial.rotation_to(ReferenceFrame::Ecliptic);
        let expected = [
            [1.0, 0.0, 0.0],
            [0.0, 0.9174820620691818, 0.3977771559319137],
            [0.0, -0.3977771559319137, 0.9174820620691818],
        ];
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(rot[(i, j)], expected[i][j], epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_rotation_to_self_is_identity() {
        let rot = ReferenceFrame::Ecliptic.rotation_to(ReferenceFrame::Ecliptic);
        assert_eq!(rot, Matrix3::identity());
    }

    #[test]
    fn test_forward_backward_composes_to_identity() {
        let fwd = ReferenceFrame::Equatorial.rotation_to(ReferenceFrame::Ecliptic);
        let back = ReferenceFrame::Ecliptic.rotation_to(ReferenceFrame::Equatorial);
        let prod = back * fwd;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((prod[(i, j)] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rotmt_orthonormal() {
        let r = rotmt(0.7, 2);
        let prod = r * r.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((prod[(i, j)] - expected).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_pole_maps_between_frames() {
        // The ecliptic pole seen from the equatorial frame leans by ε toward -Y
        let rot = ReferenceFrame::Ecliptic.rotation_to(ReferenceFrame::Equatorial);
        let pole_ecl = Vector3::z();
        let pole_equ = rot * pole_ecl;
        assert_abs_diff_eq!(pole_equ.x, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(pole_equ.y, -obleq_j2000().sin(), epsilon = 1e-15);
        assert_abs_diff_eq!(pole_equ.z, obleq_j2000().cos(), epsilon = 1e-15);
    }
}
