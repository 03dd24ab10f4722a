//! # Cartesian state vectors
//!
//! [`CartesianState`] is the canonical internal representation: a time-tagged
//! position/velocity pair bound to an [`Origin`] and a [`ReferenceFrame`],
//! optionally carrying a 6×6 covariance. All transformations return new
//! instances; nothing is mutated in place.
//!
//! Covariance policy: a covariance, when present, is expressed in the same
//! frame and origin as the state itself. Frame rotations conjugate it by the
//! block-diagonal rotation; origin shifts are pure translations and pass it
//! through unchanged. No operation ever leaves a covariance silently stale.
use nalgebra::{Matrix3, Matrix6, Vector3};

use crate::ephemeris::Ephemeris;
use crate::helioframe_errors::HelioframeError;
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;
use crate::time::HighPrecisionTime;

/// Maximum relative asymmetry tolerated when attaching a covariance.
const COVARIANCE_SYMMETRY_TOL: f64 = 1e-9;

/// A time-tagged position/velocity state.
///
/// Units & conventions
/// --------------------
/// * `position`: AU, components in `frame`, measured from `origin`.
/// * `velocity`: AU/day, same frame and origin.
/// * `covariance`: optional 6×6 (position block first), same frame/origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianState {
    pub epoch: HighPrecisionTime,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub origin: Origin,
    pub frame: ReferenceFrame,
    pub covariance: Option<Matrix6<f64>>,
}

impl CartesianState {
    /// Build a state without covariance.
    pub fn new(
        epoch: HighPrecisionTime,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        origin: Origin,
        frame: ReferenceFrame,
    ) -> Self {
        CartesianState {
            epoch,
            position,
            velocity,
            origin,
            frame,
            covariance: None,
        }
    }

    /// Attach a covariance, validating its symmetry.
    ///
    /// The matrix must be expressed in the state's own frame and origin.
    ///
    /// Errors
    /// ------
    /// `InvalidCovariance` when the matrix is asymmetric beyond tolerance.
    pub fn with_covariance(mut self, covariance: Matrix6<f64>) -> Result<Self, HelioframeError> {
        let scale = covariance.amax().max(f64::MIN_POSITIVE);
        let mut worst = 0.0_f64;
        for i in 0..6 {
            for j in (i + 1)..6 {
                worst = worst.max((covariance[(i, j)] - covariance[(j, i)]).abs());
            }
        }
        if worst > COVARIANCE_SYMMETRY_TOL * scale {
            return Err(HelioframeError::InvalidCovariance(worst));
        }
        self.covariance = Some(covariance);
        Ok(self)
    }

    /// Expand a 3×3 frame rotation into the 6×6 block-diagonal map acting on
    /// a (position, velocity) pair.
    pub fn block_rotation(rotation: &Matrix3<f64>) -> Matrix6<f64> {
        let mut block = Matrix6::zeros();
        block.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        block.fixed_view_mut::<3, 3>(3, 3).copy_from(rotation);
        block
    }

    /// Re-express the state in `frame`.
    ///
    /// Position and velocity are rotated by the same matrix (the frames are
    /// mutually non-rotating, so no angular-rate term applies); a covariance
    /// is conjugated by the block-diagonal rotation.
    pub fn rotated_to(&self, frame: ReferenceFrame) -> Self {
        if frame == self.frame {
            return self.clone();
        }
        let rotation = self.frame.rotation_to(frame);
        let covariance = self.covariance.map(|cov| {
            let block = Self::block_rotation(&rotation);
            block * cov * block.transpose()
        });
        CartesianState {
            epoch: self.epoch,
            position: rotation * self.position,
            velocity: rotation * self.velocity,
            origin: self.origin,
            frame,
            covariance,
        }
    }

    /// Re-express the state relative to `new_origin`.
    ///
    /// Both origins are resolved against the canonical origin at the state's
    /// epoch through `ephemeris`, and the displacement between them is
    /// subtracted from position and velocity:
    /// `r' = r - (r_new - r_old)`, `v' = v - (v_new - v_old)`.
    ///
    /// The state must be expressed in the canonical (equatorial) frame, the
    /// frame the ephemeris operand states are returned in; rotate first
    /// otherwise. A covariance is unaffected by the translation and passes
    /// through unchanged.
    ///
    /// Errors
    /// ------
    /// * `FrameMismatch` when the state is not in the canonical frame.
    /// * `EphemerisUnavailable` when either origin lacks coverage at the
    ///   state's epoch.
    pub fn shift_origin<E: Ephemeris + ?Sized>(
        &self,
        new_origin: Origin,
        ephemeris: &E,
    ) -> Result<Self, HelioframeError> {
        if new_origin == self.origin {
            return Ok(self.clone());
        }
        if self.frame != ReferenceFrame::Equatorial {
            return Err(HelioframeError::FrameMismatch(
                self.frame.to_string(),
                ReferenceFrame::Equatorial.to_string(),
            ));
        }

        let (new_pos, new_vel) = ephemeris.state_at(new_origin, &self.epoch)?;
        let (old_pos, old_vel) = ephemeris.state_at(self.origin, &self.epoch)?;

        Ok(CartesianState {
            epoch: self.epoch,
            position: self.position - (new_pos - old_pos),
            velocity: self.velocity - (new_vel - old_vel),
            origin: new_origin,
            frame: self.frame,
            covariance: self.covariance,
        })
    }

    /// Euclidean distance to the origin, AU.
    pub fn radial_distance(&self) -> f64 {
        self.position.norm()
    }

    /// Speed relative to the origin, AU/day.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

impl std::fmt::Display for CartesianState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cartesian state @ {}", self.epoch)?;
        writeln!(f, "  origin = {}, frame = {}", self.origin, self.frame)?;
        writeln!(
            f,
            "  r = [{:+.12e}, {:+.12e}, {:+.12e}] AU",
            self.position.x, self.position.y, self.position.z
        )?;
        write!(
            f,
            "  v = [{:+.12e}, {:+.12e}, {:+.12e}] AU/day",
            self.velocity.x, self.velocity.y, self.velocity.z
        )
    }
}

#[cfg(test)]
mod cartesian_test {
    use super::*;
    use crate::ephemeris::TabulatedEphemeris;
    use crate::time::TimeScale;
    use approx::assert_relative_eq;

    fn sample_state() -> CartesianState {
        CartesianState::new(
            HighPrecisionTime::from_mjd(60000.0, TimeScale::TDB),
            Vector3::new(1.0, 0.2, -0.1),
            Vector3::new(-0.002, 0.017, 0.0004),
            Origin::Sun,
            ReferenceFrame::Equatorial,
        )
    }

    #[test]
    fn test_rotation_round_trip() {
        let state = sample_state();
        let there = state.rotated_to(ReferenceFrame::Ecliptic);
        let back = there.rotated_to(ReferenceFrame::Equatorial);

        assert_relative_eq!(back.position, state.position, max_relative = 1e-12);
        assert_relative_eq!(back.velocity, state.velocity, max_relative = 1e-12);
        assert_eq!(back.frame, ReferenceFrame::Equatorial);
    }

    #[test]
    fn test_rotation_preserves_norms() {
        let state = sample_state();
        let rotated = state.rotated_to(ReferenceFrame::Ecliptic);
        assert_relative_eq!(
            rotated.radial_distance(),
            state.radial_distance(),
            max_relative = 1e-13
        );
        assert_relative_eq!(rotated.speed(), state.speed(), max_relative = 1e-13);
    }

    #[test]
    fn test_covariance_conjugated_by_rotation() {
        let mut cov = Matrix6::zeros();
        for i in 0..6 {
            cov[(i, i)] = 1e-8 * (i + 1) as f64;
        }
        cov[(0, 1)] = 2e-9;
        cov[(1, 0)] = 2e-9;

        let state = sample_state().with_covariance(cov).unwrap();
        let rotated = state.rotated_to(ReferenceFrame::Ecliptic);
        let rotated_cov = rotated.covariance.unwrap();

        // symmetric, trace-preserving (orthogonal conjugation)
        let mut trace_before = 0.0;
        let mut trace_after = 0.0;
        for i in 0..6 {
            trace_before += cov[(i, i)];
            trace_after += rotated_cov[(i, i)];
            for j in 0..6 {
                assert_relative_eq!(
                    rotated_cov[(i, j)],
                    rotated_cov[(j, i)],
                    max_relative = 1e-9
                );
            }
        }
        assert_relative_eq!(trace_after, trace_before, max_relative = 1e-12);

        // round trip restores the original matrix
        let back = rotated.rotated_to(ReferenceFrame::Equatorial);
        let back_cov = back.covariance.unwrap();
        for i in 0..6 {
            for j in 0..6 {
                assert_relative_eq!(back_cov[(i, j)], cov[(i, j)], epsilon = 1e-22);
            }
        }
    }

    #[test]
    fn test_asymmetric_covariance_rejected() {
        let mut cov = Matrix6::identity();
        cov[(0, 5)] = 0.5;
        let err = sample_state().with_covariance(cov).unwrap_err();
        assert!(matches!(err, HelioframeError::InvalidCovariance(_)));
    }

    #[test]
    fn test_shift_origin_sun_to_barycenter() {
        // 1 AU heliocentric state with the barycenter at -4.36e-3 AU from the
        // Sun, i.e. the Sun at +4.36e-3 AU from the barycenter
        let mut ephem = TabulatedEphemeris::new();
        ephem.insert(
            Origin::Sun,
            60000.0,
            Vector3::new(4.36e-3, 0.0, 0.0),
            Vector3::zeros(),
        );

        let state = CartesianState::new(
            HighPrecisionTime::from_mjd(60000.0, TimeScale::TDB),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 29.78 / 1731.456_836_805_555_6, 0.0),
            Origin::Sun,
            ReferenceFrame::Equatorial,
        );

        let shifted = state
            .shift_origin(Origin::SolarSystemBarycenter, &ephem)
            .unwrap();
        assert_relative_eq!(shifted.position.x, 1.00436, max_relative = 1e-12);
        assert_relative_eq!(shifted.velocity, state.velocity, max_relative = 1e-15);
        assert_eq!(shifted.origin, Origin::SolarSystemBarycenter);
    }

    #[test]
    fn test_shift_origin_round_trip() {
        let mut ephem = TabulatedEphemeris::new();
        ephem.insert(
            Origin::Sun,
            60000.0,
            Vector3::new(-4.36e-3, 1.2e-3, 0.5e-3),
            Vector3::new(1.0e-7, -3.0e-7, 2.0e-8),
        );
        ephem.insert(
            Origin::Jupiter,
            60000.0,
            Vector3::new(3.5, -2.9, 0.1),
            Vector3::new(0.004, 0.005, -0.0001),
        );

        let state = sample_state();
        let via_jupiter = state.shift_origin(Origin::Jupiter, &ephem).unwrap();
        let back = via_jupiter.shift_origin(Origin::Sun, &ephem).unwrap();

        assert_relative_eq!(back.position, state.position, max_relative = 1e-12);
        assert_relative_eq!(back.velocity, state.velocity, max_relative = 1e-12);
    }

    #[test]
    fn test_shift_origin_requires_canonical_frame() {
        let ephem = TabulatedEphemeris::new();
        let state = sample_state().rotated_to(ReferenceFrame::Ecliptic);
        let err = state
            .shift_origin(Origin::SolarSystemBarycenter, &ephem)
            .unwrap_err();
        assert!(matches!(err, HelioframeError::FrameMismatch(..)));
    }

    #[test]
    fn test_shift_to_same_origin_is_identity() {
        let ephem = TabulatedEphemeris::new();
        let state = sample_state();
        let same = state.shift_origin(Origin::Sun, &ephem).unwrap();
        assert_eq!(same, state);
    }

    #[test]
    fn test_shift_origin_passes_covariance_through() {
        let mut ephem = TabulatedEphemeris::new();
        ephem.insert(Origin::Sun, 60000.0, Vector3::x() * 1e-3, Vector3::zeros());

        let cov = Matrix6::identity() * 1e-10;
        let state = sample_state().with_covariance(cov).unwrap();
        let shifted = state
            .shift_origin(Origin::SolarSystemBarycenter, &ephem)
            .unwrap();
        assert_eq!(shifted.covariance, Some(cov));
    }
}
