//! # Coordinate origins
//!
//! [`Origin`] tags the physical point a state vector is measured from. The set
//! of bodies is a closed enum so an unsupported code is a validation-time
//! error, not a stringly-typed surprise at lookup time. Observing stations are
//! carried as compact `u16` site indices, the same indexing scheme used for
//! observatory registries elsewhere in the ecosystem.
//!
//! The origin itself holds no ephemeris data: its time-dependent position
//! relative to the canonical origin (the solar-system barycenter) comes from
//! the injected [`Ephemeris`](crate::ephemeris::Ephemeris) service.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    GAUSS_GRAV_SQUARED, MASS_RATIO_EARTH_MOON, MASS_RATIO_JUPITER, MASS_RATIO_MARS,
    MASS_RATIO_MERCURY, MASS_RATIO_NEPTUNE, MASS_RATIO_SATURN, MASS_RATIO_URANUS,
    MASS_RATIO_VENUS,
};
use crate::helioframe_errors::HelioframeError;

/// Reference point of a state vector.
///
/// `Sun` and the planet variants denote the body (planetary-system barycenter
/// for planets with moons); `SolarSystemBarycenter` is the canonical origin
/// every ephemeris lookup is expressed against. `Station` identifies a
/// registered observing site by its stable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    SolarSystemBarycenter,
    Sun,
    Mercury,
    Venus,
    EarthMoon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Station(u16),
}

impl Origin {
    /// Canonical origin of the ephemeris service.
    pub const CANONICAL: Origin = Origin::SolarSystemBarycenter;

    /// Gravitational parameter GM of the body, in AU³/day².
    ///
    /// Returns `None` for the barycenter and for stations: neither is a
    /// massive body a two-body element set can be defined around. Element
    /// conversions take µ explicitly, so callers remain free to use any
    /// central body; this accessor only provides the conventional values.
    pub fn gravitational_parameter(&self) -> Option<f64> {
        let ratio = match self {
            Origin::Sun => return Some(GAUSS_GRAV_SQUARED),
            Origin::Mercury => MASS_RATIO_MERCURY,
            Origin::Venus => MASS_RATIO_VENUS,
            Origin::EarthMoon => MASS_RATIO_EARTH_MOON,
            Origin::Mars => MASS_RATIO_MARS,
            Origin::Jupiter => MASS_RATIO_JUPITER,
            Origin::Saturn => MASS_RATIO_SATURN,
            Origin::Uranus => MASS_RATIO_URANUS,
            Origin::Neptune => MASS_RATIO_NEPTUNE,
            Origin::SolarSystemBarycenter | Origin::Station(_) => return None,
        };
        Some(GAUSS_GRAV_SQUARED / ratio)
    }

    /// All body variants, in increasing heliocentric distance order.
    pub fn bodies() -> &'static [Origin] {
        &[
            Origin::SolarSystemBarycenter,
            Origin::Sun,
            Origin::Mercury,
            Origin::Venus,
            Origin::EarthMoon,
            Origin::Mars,
            Origin::Jupiter,
            Origin::Saturn,
            Origin::Uranus,
            Origin::Neptune,
        ]
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::SolarSystemBarycenter => write!(f, "SSB"),
            Origin::Sun => write!(f, "SUN"),
            Origin::Mercury => write!(f, "MERCURY"),
            Origin::Venus => write!(f, "VENUS"),
            Origin::EarthMoon => write!(f, "EARTH-MOON"),
            Origin::Mars => write!(f, "MARS"),
            Origin::Jupiter => write!(f, "JUPITER"),
            Origin::Saturn => write!(f, "SATURN"),
            Origin::Uranus => write!(f, "URANUS"),
            Origin::Neptune => write!(f, "NEPTUNE"),
            Origin::Station(idx) => write!(f, "STATION:{idx}"),
        }
    }
}

impl FromStr for Origin {
    type Err = HelioframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if let Some(idx) = upper.strip_prefix("STATION:") {
            let idx = idx.parse::<u16>().map_err(|_| HelioframeError::InvalidTabularField {
                field: "origin",
                value: s.to_string(),
            })?;
            return Ok(Origin::Station(idx));
        }
        match upper.as_str() {
            "SSB" => Ok(Origin::SolarSystemBarycenter),
            "SUN" => Ok(Origin::Sun),
            "MERCURY" => Ok(Origin::Mercury),
            "VENUS" => Ok(Origin::Venus),
            "EARTH-MOON" => Ok(Origin::EarthMoon),
            "MARS" => Ok(Origin::Mars),
            "JUPITER" => Ok(Origin::Jupiter),
            "SATURN" => Ok(Origin::Saturn),
            "URANUS" => Ok(Origin::Uranus),
            "NEPTUNE" => Ok(Origin::Neptune),
            _ => Err(HelioframeError::InvalidTabularField {
                field: "origin",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod origin_test {
    use super::*;

    #[test]
    fn test_equality_is_by_code() {
        assert_eq!(Origin::Sun, Origin::Sun);
        assert_ne!(Origin::Sun, Origin::SolarSystemBarycenter);
        assert_eq!(Origin::Station(7), Origin::Station(7));
        assert_ne!(Origin::Station(7), Origin::Station(8));
    }

    #[test]
    fn test_sun_mu_is_gauss_constant_squared() {
        assert_eq!(
            Origin::Sun.gravitational_parameter(),
            Some(GAUSS_GRAV_SQUARED)
        );
    }

    #[test]
    fn test_jupiter_mu_scale() {
        let mu = Origin::Jupiter.gravitational_parameter().unwrap();
        // Jupiter is about 1/1047 of a solar mass
        assert!((mu / GAUSS_GRAV_SQUARED - 1.0 / 1047.348625).abs() < 1e-12);
    }

    #[test]
    fn test_barycenter_and_station_have_no_mu() {
        assert!(Origin::SolarSystemBarycenter
            .gravitational_parameter()
            .is_none());
        assert!(Origin::Station(0).gravitational_parameter().is_none());
    }

    #[test]
    fn test_display_round_trip() {
        for &origin in Origin::bodies() {
            let text = origin.to_string();
            assert_eq!(text.parse::<Origin>().unwrap(), origin);
        }
        let station = Origin::Station(675);
        assert_eq!(station.to_string().parse::<Origin>().unwrap(), station);
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!("PLANET-X".parse::<Origin>().is_err());
        assert!("STATION:NaN".parse::<Origin>().is_err());
    }
}
