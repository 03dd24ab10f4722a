//! Shared fixtures for the integration suites.
use helioframe::ephemeris::TabulatedEphemeris;
use helioframe::time::{HighPrecisionTime, TimeScale};
use helioframe::{CartesianState, Origin, ReferenceFrame};
use nalgebra::Vector3;

/// Epoch every fixture record is tabulated at.
pub const FIXTURE_MJD: f64 = 60000.0;

/// Barycentric fixture records for a handful of bodies at [`FIXTURE_MJD`].
///
/// The numbers are representative magnitudes (the Sun a few 1e-3 AU from the
/// barycenter, Jupiter ~5 AU out), not a kernel extract; the suites only rely
/// on self-consistency, not on matching any particular ephemeris release.
pub fn fixture_ephemeris() -> TabulatedEphemeris {
    let mut ephem = TabulatedEphemeris::new();
    ephem.insert(
        Origin::Sun,
        FIXTURE_MJD,
        Vector3::new(-4.36e-3, 1.13e-3, 3.2e-4),
        Vector3::new(3.1e-7, -5.9e-7, 1.4e-8),
    );
    ephem.insert(
        Origin::EarthMoon,
        FIXTURE_MJD,
        Vector3::new(-0.17684, 0.96153, 0.00031),
        Vector3::new(-0.01714, -0.00318, 0.00000072),
    );
    ephem.insert(
        Origin::Jupiter,
        FIXTURE_MJD,
        Vector3::new(3.5361, -3.4021, -0.0652),
        Vector3::new(0.00498, 0.00563, -0.00013),
    );
    ephem
}

pub fn fixture_epoch() -> HighPrecisionTime {
    HighPrecisionTime::from_mjd(FIXTURE_MJD, TimeScale::TDB)
}

/// Heliocentric state at 1 AU with circular speed, ecliptic frame.
pub fn heliocentric_circular() -> CartesianState {
    CartesianState::new(
        fixture_epoch(),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0172, 0.0),
        Origin::Sun,
        ReferenceFrame::Ecliptic,
    )
}
