//! # High-precision epochs and time-scale conversions
//!
//! This module defines [`HighPrecisionTime`], the epoch representation used by
//! every state type in the crate, together with the [`TimeScaleProvider`]
//! abstraction over leap-second / relativistic offset data and its built-in
//! implementation [`StandardTimeScales`].
//!
//! ## Two-part storage
//!
//! An epoch is a Modified Julian Date split into an integer day count and a
//! fractional day, so that a date a century away from J2000 still resolves
//! sub-microsecond intervals. The fractional part always satisfies
//! `0.0 <= frac < 1.0`; every constructor and arithmetic operation renormalizes
//! the pair, carrying into the day count in either direction.
//!
//! ## Scales
//!
//! Four scales are supported: UTC, TAI, TT and TDB. Conversion between them is
//! delegated to an injected [`TimeScaleProvider`]; the built-in provider embeds
//! the leap-second table (1972 → present) and refuses conversions outside its
//! coverage instead of extrapolating.
//!
//! ## Example
//!
//! ```rust
//! use helioframe::time::{HighPrecisionTime, StandardTimeScales, TimeScale};
//!
//! let provider = StandardTimeScales::new();
//! let utc = HighPrecisionTime::from_mjd(59215.25, TimeScale::UTC);
//! let tt = utc.to_scale(TimeScale::TT, &provider).unwrap();
//! assert_eq!(tt.scale(), TimeScale::TT);
//! ```
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use hifitime::{Epoch, TimeScale as HifitimeScale};
use serde::{Deserialize, Serialize};

use crate::constants::{JDTOMJD, RADEG, SECONDS_PER_DAY, T2000, TT_MINUS_TAI, MJD};
use crate::helioframe_errors::HelioframeError;

/// Time scale tag of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    UTC,
    TAI,
    TT,
    TDB,
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeScale::UTC => "UTC",
            TimeScale::TAI => "TAI",
            TimeScale::TT => "TT",
            TimeScale::TDB => "TDB",
        };
        write!(f, "{name}")
    }
}

impl FromStr for TimeScale {
    type Err = HelioframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTC" => Ok(TimeScale::UTC),
            "TAI" => Ok(TimeScale::TAI),
            "TT" => Ok(TimeScale::TT),
            "TDB" => Ok(TimeScale::TDB),
            other => Err(HelioframeError::InvalidTabularField {
                field: "scale",
                value: other.to_string(),
            }),
        }
    }
}

/// An instant in time, stored as an integer MJD day plus a fractional day.
///
/// Immutable value type: scale conversions and arithmetic return new instances.
///
/// Units & conventions
/// --------------------
/// * `days`: whole Modified Julian Days in the epoch's scale.
/// * `frac`: fraction of the day, invariant `0.0 <= frac < 1.0`.
///
/// Equality and ordering are only defined between epochs of the same scale;
/// use [`HighPrecisionTime::try_cmp`] to get an explicit error on a cross-scale
/// comparison, or convert first with [`HighPrecisionTime::to_scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighPrecisionTime {
    days: i64,
    frac: f64,
    scale: TimeScale,
}

/// Renormalize a day/fraction pair so the fraction lands in `[0, 1)`.
fn normalize(days: i64, frac: f64) -> (i64, f64) {
    let carry = frac.floor();
    let mut d = days + carry as i64;
    let mut f = frac - carry;
    // frac - floor can round up to exactly 1.0
    if f >= 1.0 {
        d += 1;
        f -= 1.0;
    }
    (d, f)
}

impl HighPrecisionTime {
    /// Build an epoch from an integer day and a day fraction, renormalizing
    /// the pair so that `0.0 <= frac < 1.0` (the fraction may be any finite
    /// value, including negative).
    pub fn new(days: i64, frac: f64, scale: TimeScale) -> Self {
        let (days, frac) = normalize(days, frac);
        HighPrecisionTime { days, frac, scale }
    }

    /// Build an epoch from a single-float MJD.
    ///
    /// The split into day and fraction is exact for the input float, but a
    /// single f64 MJD only resolves ~1 µs near J2000; prefer
    /// [`HighPrecisionTime::from_gregorian`] when sub-microsecond fidelity
    /// matters.
    pub fn from_mjd(mjd: MJD, scale: TimeScale) -> Self {
        Self::new(mjd.floor() as i64, mjd - mjd.floor(), scale)
    }

    /// Build an epoch from a Gregorian calendar date and time of day.
    ///
    /// The day number is resolved through [`hifitime`]; the time of day is
    /// accumulated separately so nanosecond inputs survive the two-part split.
    pub fn from_gregorian(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        nanos: u32,
        scale: TimeScale,
    ) -> Self {
        // The calendar day number is the same in every scale's own reading;
        // TAI midnight avoids leap-second ambiguity in the lookup.
        let midnight = Epoch::from_gregorian(year, month, day, 0, 0, 0, 0, HifitimeScale::TAI);
        let days = midnight.to_mjd_tai_days().round() as i64;
        let frac = (hour as f64 * 3600.0
            + minute as f64 * 60.0
            + second as f64
            + nanos as f64 * 1e-9)
            / SECONDS_PER_DAY;
        Self::new(days, frac, scale)
    }

    /// Parse an ISO-8601 date-time string (e.g. `2021-01-01T00:00:00`) as UTC.
    pub fn from_iso(date: &str) -> Result<Self, HelioframeError> {
        let epoch = Epoch::from_str(date)
            .map_err(|_| HelioframeError::InvalidEpochString(date.to_string()))?;
        Ok(Self::from_mjd(epoch.to_mjd_utc_days(), TimeScale::UTC))
    }

    /// Whole-day part of the epoch (MJD).
    pub fn days(&self) -> i64 {
        self.days
    }

    /// Fractional-day part, in `[0, 1)`.
    pub fn fractional_day(&self) -> f64 {
        self.frac
    }

    /// Time scale of the epoch.
    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    /// Collapse to a single-float MJD (loses sub-microsecond precision far
    /// from MJD 0; use the two-part accessors where that matters).
    pub fn mjd(&self) -> MJD {
        self.days as f64 + self.frac
    }

    /// Collapse to a single-float Julian Date.
    pub fn jd(&self) -> f64 {
        self.mjd() + JDTOMJD
    }

    /// Days elapsed since J2000.0 (MJD 51544.5) in this epoch's scale.
    pub fn days_since_j2000(&self) -> f64 {
        (self.days as f64 - T2000.floor()) + (self.frac - 0.5)
    }

    /// Return a new epoch shifted by `delta` days (negative deltas allowed).
    pub fn add_days(&self, delta: f64) -> Self {
        let whole = delta.floor();
        Self::new(
            self.days + whole as i64,
            self.frac + (delta - whole),
            self.scale,
        )
    }

    /// Return a new epoch shifted by `delta` seconds.
    pub fn add_seconds(&self, delta: f64) -> Self {
        self.add_days(delta / SECONDS_PER_DAY)
    }

    /// Signed separation `self - other` in days.
    ///
    /// Errors
    /// ------
    /// `IncompatibleScale` if the scales differ.
    pub fn elapsed_days_since(&self, other: &Self) -> Result<f64, HelioframeError> {
        if self.scale != other.scale {
            return Err(HelioframeError::IncompatibleScale(other.scale, self.scale));
        }
        Ok((self.days - other.days) as f64 + (self.frac - other.frac))
    }

    /// Compare two epochs, failing instead of guessing when the scales differ.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, HelioframeError> {
        self.partial_cmp(other)
            .ok_or(HelioframeError::IncompatibleScale(self.scale, other.scale))
    }

    /// Re-express this epoch in `target`, using `provider` for the offset.
    ///
    /// Arguments
    /// ---------
    /// * `target`: the destination time scale.
    /// * `provider`: leap-second / periodic-term lookup service.
    ///
    /// Return
    /// ------
    /// * A new epoch reading the same instant in `target`, or
    ///   `UnsupportedScaleConversion` when the provider has no data covering
    ///   this epoch.
    pub fn to_scale(
        &self,
        target: TimeScale,
        provider: &dyn TimeScaleProvider,
    ) -> Result<Self, HelioframeError> {
        if target == self.scale {
            return Ok(*self);
        }
        let offset = provider.offset_seconds(self, self.scale, target)?;
        let mut shifted = self.add_seconds(offset);
        shifted.scale = target;
        Ok(shifted)
    }
}

impl PartialOrd for HighPrecisionTime {
    /// Epochs of different scales are incomparable (`None`).
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.scale != other.scale {
            return None;
        }
        match self.days.cmp(&other.days) {
            Ordering::Equal => self.frac.partial_cmp(&other.frac),
            ord => Some(ord),
        }
    }
}

impl fmt::Display for HighPrecisionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MJD {}{} {}", self.days, &format!("{:.9}", self.frac)[1..], self.scale)
    }
}

/// Lookup service for offsets between time scales.
///
/// The offset is defined so that `reading_in_to = reading_in_from + offset`;
/// implementations must be safe for concurrent read access.
pub trait TimeScaleProvider: Send + Sync {
    fn offset_seconds(
        &self,
        epoch: &HighPrecisionTime,
        from: TimeScale,
        to: TimeScale,
    ) -> Result<f64, HelioframeError>;
}

/// `(first MJD of validity, TAI - UTC in seconds)`, post-1972 entries only.
const LEAP_SECONDS: &[(f64, f64)] = &[
    (41317.0, 10.0), // 1972-01-01
    (41499.0, 11.0),
    (41683.0, 12.0),
    (42048.0, 13.0),
    (42413.0, 14.0),
    (42778.0, 15.0),
    (43144.0, 16.0),
    (43509.0, 17.0),
    (43874.0, 18.0),
    (44239.0, 19.0),
    (44786.0, 20.0),
    (45151.0, 21.0),
    (45516.0, 22.0),
    (46247.0, 23.0),
    (47161.0, 24.0),
    (47892.0, 25.0),
    (48257.0, 26.0),
    (48804.0, 27.0),
    (49169.0, 28.0),
    (49534.0, 29.0),
    (50083.0, 30.0),
    (50630.0, 31.0),
    (51179.0, 32.0),
    (53736.0, 33.0),
    (54832.0, 34.0),
    (56109.0, 35.0),
    (57204.0, 36.0),
    (57754.0, 37.0), // 2017-01-01
];

/// Leap seconds beyond this date are unknown; UTC conversions past it are
/// refused rather than extrapolated. (MJD 64328 = 2035-01-01.)
const LEAP_TABLE_HORIZON: f64 = 64328.0;

/// Built-in [`TimeScaleProvider`].
///
/// * UTC ↔ TAI from the embedded leap-second table, valid from 1972-01-01 up
///   to [`LEAP_TABLE_HORIZON`]; outside that window UTC conversions fail with
///   `UnsupportedScaleConversion`.
/// * TAI ↔ TT by the fixed 32.184 s definition.
/// * TT ↔ TDB by a two-term periodic model (≲ 30 µs error), adequate for the
///   sub-millisecond fidelity targeted by the crate.
#[derive(Debug, Clone, Default)]
pub struct StandardTimeScales;

impl StandardTimeScales {
    pub fn new() -> Self {
        StandardTimeScales
    }

    /// TAI - UTC at the given MJD, or an error outside table coverage.
    fn tai_minus_utc(&self, mjd: f64, from: TimeScale, to: TimeScale) -> Result<f64, HelioframeError> {
        let (first, _) = LEAP_SECONDS[0];
        if mjd < first || mjd >= LEAP_TABLE_HORIZON {
            return Err(HelioframeError::UnsupportedScaleConversion { mjd, from, to });
        }
        let offset = LEAP_SECONDS
            .iter()
            .rev()
            .find(|(start, _)| mjd >= *start)
            .map(|(_, dat)| *dat)
            .unwrap_or(LEAP_SECONDS[0].1);
        Ok(offset)
    }

    /// TDB - TT at the given MJD (TT), seconds.
    fn tdb_minus_tt(mjd_tt: f64) -> f64 {
        let d = mjd_tt - T2000;
        let g = (357.53 + 0.985_600_28 * d) * RADEG;
        let l = (246.11 + 0.902_517_92 * d) * RADEG;
        0.001_657 * g.sin() + 0.000_022 * l.sin()
    }

    /// Reading difference `scale - TAI` for the instant of `epoch`, seconds.
    fn scale_minus_tai(
        &self,
        scale: TimeScale,
        epoch: &HighPrecisionTime,
        from: TimeScale,
        to: TimeScale,
    ) -> Result<f64, HelioframeError> {
        match scale {
            TimeScale::TAI => Ok(0.0),
            TimeScale::TT => Ok(TT_MINUS_TAI),
            TimeScale::TDB => Ok(TT_MINUS_TAI + Self::tdb_minus_tt(epoch.mjd())),
            TimeScale::UTC => Ok(-self.tai_minus_utc(epoch.mjd(), from, to)?),
        }
    }
}

impl TimeScaleProvider for StandardTimeScales {
    fn offset_seconds(
        &self,
        epoch: &HighPrecisionTime,
        from: TimeScale,
        to: TimeScale,
    ) -> Result<f64, HelioframeError> {
        let to_part = self.scale_minus_tai(to, epoch, from, to)?;
        let from_part = self.scale_minus_tai(from, epoch, from, to)?;
        Ok(to_part - from_part)
    }
}
