//! # Helioframe
//!
//! State-vector representation and transformation engine for solar-system
//! work: time-tagged Cartesian and orbital-element states, converted between
//! reference frames (ecliptic/equatorial), coordinate origins (Sun,
//! solar-system barycenter, planets, observing stations) and time scales
//! (UTC, TAI, TT, TDB).
//!
//! Ephemeris and leap-second data enter through the injected
//! [`ephemeris::Ephemeris`] and [`time::TimeScaleProvider`] services; the
//! engine itself is pure, immutable-value based, and safe to share across
//! threads.

pub mod cartesian;
pub mod constants;
pub mod ephemeris;
pub mod helioframe_errors;
pub mod kepler;
pub mod orbit_type;
pub mod origin;
pub mod ref_system;
pub mod tabular;
pub mod time;
pub mod transformer;

pub use cartesian::CartesianState;
pub use helioframe_errors::HelioframeError;
pub use orbit_type::OrbitalElements;
pub use origin::Origin;
pub use ref_system::ReferenceFrame;
pub use time::{HighPrecisionTime, TimeScale};
pub use transformer::{ErrorPolicy, Transformer};
