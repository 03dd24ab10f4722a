//! # Flat tabular interchange layout
//!
//! Other components persist and exchange state collections as flat tables:
//! one row per state, columns for the two-part epoch, the six components,
//! origin code, frame name, and optionally the 21 independent covariance
//! entries (upper triangle, row-major). [`StateRow`] is that layout, with
//! lossless conversions to and from [`CartesianState`] and CSV helpers on
//! top of the `csv`/`serde` stack.
//!
//! Row order is meaningful — it indexes back to the originating objects — and
//! is preserved exactly by both the writer and the reader.
use std::io::{Read, Write};
use std::str::FromStr;

use nalgebra::{Matrix6, Vector3};
use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianState;
use crate::helioframe_errors::HelioframeError;
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;
use crate::time::{HighPrecisionTime, TimeScale};

/// Upper-triangle index pairs of a 6×6 matrix, row-major.
const COV_INDICES: [(usize, usize); 21] = [
    (0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5),
    (1, 1), (1, 2), (1, 3), (1, 4), (1, 5),
    (2, 2), (2, 3), (2, 4), (2, 5),
    (3, 3), (3, 4), (3, 5),
    (4, 4), (4, 5),
    (5, 5),
];

/// One state as a flat row.
///
/// Positions are AU, velocities AU/day; `epoch_day`/`epoch_frac` are the
/// two-part MJD in `scale`. The `cov_*` columns are either all present or all
/// absent for a given row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRow {
    pub epoch_day: i64,
    pub epoch_frac: f64,
    pub scale: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub origin: String,
    pub frame: String,
    pub cov_00: Option<f64>,
    pub cov_01: Option<f64>,
    pub cov_02: Option<f64>,
    pub cov_03: Option<f64>,
    pub cov_04: Option<f64>,
    pub cov_05: Option<f64>,
    pub cov_11: Option<f64>,
    pub cov_12: Option<f64>,
    pub cov_13: Option<f64>,
    pub cov_14: Option<f64>,
    pub cov_15: Option<f64>,
    pub cov_22: Option<f64>,
    pub cov_23: Option<f64>,
    pub cov_24: Option<f64>,
    pub cov_25: Option<f64>,
    pub cov_33: Option<f64>,
    pub cov_34: Option<f64>,
    pub cov_35: Option<f64>,
    pub cov_44: Option<f64>,
    pub cov_45: Option<f64>,
    pub cov_55: Option<f64>,
}

impl StateRow {
    fn covariance_entries(&self) -> [Option<f64>; 21] {
        [
            self.cov_00, self.cov_01, self.cov_02, self.cov_03, self.cov_04, self.cov_05,
            self.cov_11, self.cov_12, self.cov_13, self.cov_14, self.cov_15,
            self.cov_22, self.cov_23, self.cov_24, self.cov_25,
            self.cov_33, self.cov_34, self.cov_35,
            self.cov_44, self.cov_45,
            self.cov_55,
        ]
    }

    fn covariance_slots(&mut self) -> [&mut Option<f64>; 21] {
        [
            &mut self.cov_00, &mut self.cov_01, &mut self.cov_02, &mut self.cov_03,
            &mut self.cov_04, &mut self.cov_05,
            &mut self.cov_11, &mut self.cov_12, &mut self.cov_13, &mut self.cov_14,
            &mut self.cov_15,
            &mut self.cov_22, &mut self.cov_23, &mut self.cov_24, &mut self.cov_25,
            &mut self.cov_33, &mut self.cov_34, &mut self.cov_35,
            &mut self.cov_44, &mut self.cov_45,
            &mut self.cov_55,
        ]
    }

    /// Flatten a state into a row.
    pub fn from_state(state: &CartesianState) -> Self {
        let mut row = StateRow {
            epoch_day: state.epoch.days(),
            epoch_frac: state.epoch.fractional_day(),
            scale: state.epoch.scale().to_string(),
            x: state.position.x,
            y: state.position.y,
            z: state.position.z,
            vx: state.velocity.x,
            vy: state.velocity.y,
            vz: state.velocity.z,
            origin: state.origin.to_string(),
            frame: state.frame.to_string(),
            cov_00: None, cov_01: None, cov_02: None, cov_03: None, cov_04: None, cov_05: None,
            cov_11: None, cov_12: None, cov_13: None, cov_14: None, cov_15: None,
            cov_22: None, cov_23: None, cov_24: None, cov_25: None,
            cov_33: None, cov_34: None, cov_35: None,
            cov_44: None, cov_45: None,
            cov_55: None,
        };
        if let Some(cov) = state.covariance {
            for (slot, &(i, j)) in row.covariance_slots().into_iter().zip(COV_INDICES.iter()) {
                *slot = Some(cov[(i, j)]);
            }
        }
        row
    }

    /// Rebuild the state this row was flattened from.
    ///
    /// Errors
    /// ------
    /// * `InvalidTabularField` on an unknown scale/origin/frame code, or when
    ///   only part of the 21 covariance columns is filled.
    pub fn to_state(&self) -> Result<CartesianState, HelioframeError> {
        let scale = TimeScale::from_str(&self.scale)?;
        let origin = Origin::from_str(&self.origin)?;
        let frame = ReferenceFrame::from_str(&self.frame)?;

        let epoch = HighPrecisionTime::new(self.epoch_day, self.epoch_frac, scale);
        let state = CartesianState::new(
            epoch,
            Vector3::new(self.x, self.y, self.z),
            Vector3::new(self.vx, self.vy, self.vz),
            origin,
            frame,
        );

        let entries = self.covariance_entries();
        let filled = entries.iter().filter(|e| e.is_some()).count();
        match filled {
            0 => Ok(state),
            21 => {
                let mut cov = Matrix6::zeros();
                for (entry, &(i, j)) in entries.iter().zip(COV_INDICES.iter()) {
                    let value = entry.expect("all covariance entries checked present");
                    cov[(i, j)] = value;
                    cov[(j, i)] = value;
                }
                state.with_covariance(cov)
            }
            _ => Err(HelioframeError::InvalidTabularField {
                field: "covariance",
                value: format!("{filled} of 21 entries present"),
            }),
        }
    }
}

/// Write states as CSV, one row per state, preserving order.
pub fn write_csv<W: Write>(states: &[CartesianState], writer: W) -> Result<(), HelioframeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for state in states {
        csv_writer.serialize(StateRow::from_state(state))?;
    }
    csv_writer.flush().map_err(|e| HelioframeError::CsvError(e.to_string()))?;
    Ok(())
}

/// Read states back from CSV, preserving row order.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CartesianState>, HelioframeError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut states = Vec::new();
    for row in csv_reader.deserialize::<StateRow>() {
        states.push(row?.to_state()?);
    }
    Ok(states)
}

#[cfg(test)]
mod tabular_test {
    use super::*;
    use crate::time::TimeScale;
    use approx::assert_relative_eq;

    fn sample_state() -> CartesianState {
        CartesianState::new(
            HighPrecisionTime::new(60000, 0.372_915_182, TimeScale::TDB),
            Vector3::new(1.0023, -0.0041, 0.00072),
            Vector3::new(-0.0003, 0.0171, 0.00001),
            Origin::Sun,
            ReferenceFrame::Ecliptic,
        )
    }

    fn sample_covariance() -> Matrix6<f64> {
        let mut cov = Matrix6::zeros();
        for i in 0..6 {
            cov[(i, i)] = 1e-9 * (i + 1) as f64;
            for j in (i + 1)..6 {
                let value = 1e-11 * ((i * 6 + j) as f64);
                cov[(i, j)] = value;
                cov[(j, i)] = value;
            }
        }
        cov
    }

    #[test]
    fn test_row_round_trip_without_covariance() {
        let state = sample_state();
        let row = StateRow::from_state(&state);
        assert_eq!(row.origin, "SUN");
        assert_eq!(row.frame, "ECLIPTIC");
        assert_eq!(row.scale, "TDB");
        assert!(row.cov_00.is_none());

        let back = row.to_state().unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_row_round_trip_with_covariance() {
        let state = sample_state().with_covariance(sample_covariance()).unwrap();
        let back = StateRow::from_state(&state).to_state().unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_partial_covariance_rejected() {
        let state = sample_state().with_covariance(sample_covariance()).unwrap();
        let mut row = StateRow::from_state(&state);
        row.cov_35 = None;
        assert!(matches!(
            row.to_state().unwrap_err(),
            HelioframeError::InvalidTabularField { field: "covariance", .. }
        ));
    }

    #[test]
    fn test_unknown_origin_rejected() {
        let mut row = StateRow::from_state(&sample_state());
        row.origin = "VULCAN".to_string();
        assert!(row.to_state().is_err());
    }

    #[test]
    fn test_csv_round_trip_preserves_order() {
        let first = sample_state();
        let second = CartesianState {
            position: Vector3::new(-2.5, 0.3, 0.9),
            origin: Origin::Jupiter,
            frame: ReferenceFrame::Equatorial,
            ..first.clone()
        };
        let third = first.clone().with_covariance(sample_covariance()).unwrap();
        let states = vec![first, second, third];

        let mut buffer = Vec::new();
        write_csv(&states, &mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("epoch_day,epoch_frac,scale,x,y,z,vx,vy,vz,origin,frame"));

        let back = read_csv(buffer.as_slice()).unwrap();
        assert_eq!(back.len(), 3);
        for (original, restored) in states.iter().zip(back.iter()) {
            assert_eq!(restored.origin, original.origin);
            assert_eq!(restored.frame, original.frame);
            assert_eq!(restored.epoch, original.epoch);
            assert_relative_eq!(
                restored.position,
                original.position,
                max_relative = 1e-15
            );
            assert_eq!(restored.covariance.is_some(), original.covariance.is_some());
        }
    }

    #[test]
    fn test_station_origin_round_trips_through_row() {
        let state = CartesianState {
            origin: Origin::Station(675),
            ..sample_state()
        };
        let back = StateRow::from_state(&state).to_state().unwrap();
        assert_eq!(back.origin, Origin::Station(675));
    }
}
