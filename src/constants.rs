//! # Constants and type definitions for Helioframe
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `helioframe` library.
//!
//! ## Overview
//!
//! - Astronomical constants (AU, Gauss gravitational constant, speed of light)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds, JD ↔ MJD)
//! - Sun/planet mass ratios used to derive per-body gravitational parameters
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including the element
//! conversions, the reference-frame rotations, and the time-scale provider.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Gaussian gravitational constant k (AU^(3/2) day^-1)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², the heliocentric gravitational parameter in AU³/day²
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = VLIGHT / AU * SECONDS_PER_DAY;

/// TT minus TAI, fixed by definition (seconds)
pub const TT_MINUS_TAI: f64 = 32.184;

// -------------------------------------------------------------------------------------------------
// Sun/planet inverse mass ratios (DE440), scaling k² into per-body gravitational parameters
// -------------------------------------------------------------------------------------------------

/// Sun/Mercury
pub const MASS_RATIO_MERCURY: f64 = 6_023_682.155_592;
/// Sun/Venus
pub const MASS_RATIO_VENUS: f64 = 408_523.718_658;
/// Sun/(Earth + Moon)
pub const MASS_RATIO_EARTH_MOON: f64 = 328_900.559_708;
/// Sun/Mars system
pub const MASS_RATIO_MARS: f64 = 3_098_703.546_737;
/// Sun/Jupiter system
pub const MASS_RATIO_JUPITER: f64 = 1_047.348_625;
/// Sun/Saturn system
pub const MASS_RATIO_SATURN: f64 = 3_497.901_768;
/// Sun/Uranus system
pub const MASS_RATIO_URANUS: f64 = 22_902.951_161;
/// Sun/Neptune system
pub const MASS_RATIO_NEPTUNE: f64 = 19_412.259_776;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
