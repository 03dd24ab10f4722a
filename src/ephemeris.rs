//! # Ephemeris lookup service
//!
//! The transformation engine never reads kernel files itself: it consumes an
//! [`Ephemeris`] implementation that answers "where was this body at that
//! epoch" in the **canonical frame and origin** (equatorial mean J2000,
//! solar-system barycenter). Kernel parsing, interpolation and caching of file
//! handles all live behind this trait.
//!
//! Two implementations are provided:
//!
//! - [`TabulatedEphemeris`] — an in-memory record store with exact-epoch
//!   lookup, the entry point for pre-interpolated kernel extracts and for test
//!   fixtures.
//! - [`CachedEphemeris`] — a wrapper that memoizes repeated `(body, epoch)`
//!   lookups within a transformation batch, so shifting many states sharing an
//!   epoch costs one service call per body.
use std::collections::HashMap;
use std::sync::RwLock;

use nalgebra::Vector3;

use crate::cartesian::CartesianState;
use crate::helioframe_errors::HelioframeError;
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;
use crate::time::HighPrecisionTime;

/// Barycentric position/velocity source queried during origin shifts.
///
/// Implementations return the state of `origin` **relative to the
/// solar-system barycenter, in the equatorial mean J2000 frame**, in AU and
/// AU/day, and must be safe for concurrent read access.
pub trait Ephemeris: Send + Sync {
    /// Position and velocity of `origin` at `epoch`.
    ///
    /// Errors
    /// ------
    /// `EphemerisUnavailable` when the body or the epoch lies outside loaded
    /// coverage.
    fn state_at(
        &self,
        origin: Origin,
        epoch: &HighPrecisionTime,
    ) -> Result<(Vector3<f64>, Vector3<f64>), HelioframeError>;

    /// Same lookup, packaged as a [`CartesianState`] tagged with the canonical
    /// frame and origin.
    fn cartesian_state_at(
        &self,
        origin: Origin,
        epoch: &HighPrecisionTime,
    ) -> Result<CartesianState, HelioframeError> {
        let (position, velocity) = self.state_at(origin, epoch)?;
        Ok(CartesianState::new(
            *epoch,
            position,
            velocity,
            Origin::CANONICAL,
            ReferenceFrame::Equatorial,
        ))
    }
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn state_at(
        &self,
        origin: Origin,
        epoch: &HighPrecisionTime,
    ) -> Result<(Vector3<f64>, Vector3<f64>), HelioframeError> {
        (**self).state_at(origin, epoch)
    }
}

/// One tabulated barycentric record.
#[derive(Debug, Clone, Copy)]
struct EphemerisRecord {
    mjd: f64,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

/// In-memory ephemeris backed by per-body records sorted by epoch.
///
/// Lookups match an epoch exactly (within `tolerance_days`); interpolation
/// between records is the upstream kernel reader's responsibility, not this
/// service's. The canonical origin always resolves to the zero state, so it
/// never needs records of its own.
#[derive(Debug, Default)]
pub struct TabulatedEphemeris {
    records: HashMap<Origin, Vec<EphemerisRecord>>,
    tolerance_days: f64,
}

impl TabulatedEphemeris {
    /// Default epoch-matching tolerance, about 1 ms.
    pub const DEFAULT_TOLERANCE_DAYS: f64 = 1e-8;

    pub fn new() -> Self {
        TabulatedEphemeris {
            records: HashMap::new(),
            tolerance_days: Self::DEFAULT_TOLERANCE_DAYS,
        }
    }

    pub fn with_tolerance(tolerance_days: f64) -> Self {
        TabulatedEphemeris {
            records: HashMap::new(),
            tolerance_days,
        }
    }

    /// Register a record for `origin` at `mjd` (canonical frame/origin, AU and
    /// AU/day). Records may be inserted in any order.
    pub fn insert(
        &mut self,
        origin: Origin,
        mjd: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) {
        let records = self.records.entry(origin).or_default();
        let record = EphemerisRecord {
            mjd,
            position,
            velocity,
        };
        let at = records.partition_point(|r| r.mjd < mjd);
        records.insert(at, record);
    }

    /// Number of bodies with at least one record.
    pub fn body_count(&self) -> usize {
        self.records.len()
    }
}

impl Ephemeris for TabulatedEphemeris {
    fn state_at(
        &self,
        origin: Origin,
        epoch: &HighPrecisionTime,
    ) -> Result<(Vector3<f64>, Vector3<f64>), HelioframeError> {
        if origin == Origin::CANONICAL {
            return Ok((Vector3::zeros(), Vector3::zeros()));
        }
        let mjd = epoch.mjd();
        let unavailable = || HelioframeError::EphemerisUnavailable { origin, mjd };

        let records = self.records.get(&origin).ok_or_else(unavailable)?;
        let at = records.partition_point(|r| r.mjd < mjd);
        // nearest of the two neighbors of the insertion point
        let candidates = [at.checked_sub(1), Some(at)];
        candidates
            .iter()
            .flatten()
            .filter_map(|&i| records.get(i))
            .find(|r| (r.mjd - mjd).abs() <= self.tolerance_days)
            .map(|r| (r.position, r.velocity))
            .ok_or_else(unavailable)
    }
}

/// Cache key: body plus the exact two-part epoch reading.
type LookupKey = (Origin, i64, u64);

/// Memoizing wrapper over any [`Ephemeris`].
///
/// Repeated lookups for the same `(body, epoch)` within a batch hit the inner
/// service once; the map lives behind an `RwLock` so concurrent readers on the
/// hot path never block each other.
#[derive(Debug)]
pub struct CachedEphemeris<E> {
    inner: E,
    cache: RwLock<HashMap<LookupKey, (Vector3<f64>, Vector3<f64>)>>,
}

impl<E: Ephemeris> CachedEphemeris<E> {
    pub fn new(inner: E) -> Self {
        CachedEphemeris {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Access the wrapped service.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of memoized lookups.
    pub fn cached_lookups(&self) -> usize {
        self.cache.read().expect("ephemeris cache lock poisoned").len()
    }

    fn key(origin: Origin, epoch: &HighPrecisionTime) -> LookupKey {
        (origin, epoch.days(), epoch.fractional_day().to_bits())
    }
}

impl<E: Ephemeris> Ephemeris for CachedEphemeris<E> {
    fn state_at(
        &self,
        origin: Origin,
        epoch: &HighPrecisionTime,
    ) -> Result<(Vector3<f64>, Vector3<f64>), HelioframeError> {
        let key = Self::key(origin, epoch);
        if let Some(state) = self
            .cache
            .read()
            .expect("ephemeris cache lock poisoned")
            .get(&key)
        {
            return Ok(*state);
        }
        let state = self.inner.state_at(origin, epoch)?;
        self.cache
            .write()
            .expect("ephemeris cache lock poisoned")
            .insert(key, state);
        Ok(state)
    }
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use crate::time::TimeScale;
    use approx::assert_abs_diff_eq;

    fn sun_record() -> (f64, Vector3<f64>, Vector3<f64>) {
        (
            60000.0,
            Vector3::new(-4.36e-3, 0.0, 0.0),
            Vector3::new(0.0, -1.0e-7, 0.0),
        )
    }

    #[test]
    fn test_lookup_exact_epoch() {
        let (mjd, pos, vel) = sun_record();
        let mut ephem = TabulatedEphemeris::new();
        ephem.insert(Origin::Sun, mjd, pos, vel);

        let epoch = HighPrecisionTime::from_mjd(mjd, TimeScale::TDB);
        let (p, v) = ephem.state_at(Origin::Sun, &epoch).unwrap();
        assert_eq!(p, pos);
        assert_eq!(v, vel);
    }

    #[test]
    fn test_canonical_origin_is_zero_state() {
        let ephem = TabulatedEphemeris::new();
        let epoch = HighPrecisionTime::from_mjd(60000.0, TimeScale::TDB);
        let (p, v) = ephem
            .state_at(Origin::SolarSystemBarycenter, &epoch)
            .unwrap();
        assert_abs_diff_eq!(p.norm(), 0.0);
        assert_abs_diff_eq!(v.norm(), 0.0);
    }

    #[test]
    fn test_unknown_body_fails() {
        let ephem = TabulatedEphemeris::new();
        let epoch = HighPrecisionTime::from_mjd(60000.0, TimeScale::TDB);
        let err = ephem.state_at(Origin::Neptune, &epoch).unwrap_err();
        assert!(matches!(err, HelioframeError::EphemerisUnavailable { .. }));
    }

    #[test]
    fn test_epoch_outside_coverage_fails() {
        let (mjd, pos, vel) = sun_record();
        let mut ephem = TabulatedEphemeris::new();
        ephem.insert(Origin::Sun, mjd, pos, vel);

        let off = HighPrecisionTime::from_mjd(mjd + 1.0, TimeScale::TDB);
        assert!(ephem.state_at(Origin::Sun, &off).is_err());
    }

    #[test]
    fn test_records_sorted_regardless_of_insertion_order() {
        let mut ephem = TabulatedEphemeris::new();
        ephem.insert(Origin::Sun, 60002.0, Vector3::x(), Vector3::zeros());
        ephem.insert(Origin::Sun, 60000.0, Vector3::y(), Vector3::zeros());
        ephem.insert(Origin::Sun, 60001.0, Vector3::z(), Vector3::zeros());

        let epoch = HighPrecisionTime::from_mjd(60001.0, TimeScale::TDB);
        let (p, _) = ephem.state_at(Origin::Sun, &epoch).unwrap();
        assert_eq!(p, Vector3::z());
    }

    #[test]
    fn test_cache_memoizes_repeated_lookups() {
        let (mjd, pos, vel) = sun_record();
        let mut inner = TabulatedEphemeris::new();
        inner.insert(Origin::Sun, mjd, pos, vel);
        let cached = CachedEphemeris::new(inner);

        let epoch = HighPrecisionTime::from_mjd(mjd, TimeScale::TDB);
        for _ in 0..5 {
            cached.state_at(Origin::Sun, &epoch).unwrap();
        }
        assert_eq!(cached.cached_lookups(), 1);
    }

    #[test]
    fn test_cache_does_not_memoize_failures() {
        let cached = CachedEphemeris::new(TabulatedEphemeris::new());
        let epoch = HighPrecisionTime::from_mjd(60000.0, TimeScale::TDB);
        assert!(cached.state_at(Origin::Mars, &epoch).is_err());
        assert_eq!(cached.cached_lookups(), 0);
    }
}
