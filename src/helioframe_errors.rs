use thiserror::Error;

use crate::origin::Origin;
use crate::time::TimeScale;

/// Error type shared by every fallible operation of the crate.
///
/// Each variant is a distinct, catchable failure condition scoped to the state
/// or epoch that raised it. None of them is fatal to the surrounding process;
/// batch operations report them per element.
#[derive(Error, Debug, Clone)]
pub enum HelioframeError {
    #[error("No time-scale data covering MJD {mjd} for {from} -> {to} conversion")]
    UnsupportedScaleConversion {
        mjd: f64,
        from: TimeScale,
        to: TimeScale,
    },

    #[error("Cannot compare epochs expressed in {0} and {1} without conversion")]
    IncompatibleScale(TimeScale, TimeScale),

    #[error("No ephemeris coverage for {origin} at MJD {mjd}")]
    EphemerisUnavailable { origin: Origin, mjd: f64 },

    #[error("Operand frames differ ({0} vs {1}); rotate before shifting origins")]
    FrameMismatch(String, String),

    #[error("Kepler solver did not converge within {iterations} iterations (last step {last_step})")]
    KeplerSolverDivergence { iterations: usize, last_step: f64 },

    #[error("Degenerate element conversion: {0}")]
    DegenerateElementConversion(String),

    #[error("Covariance matrix is not symmetric (max asymmetry {0})")]
    InvalidCovariance(f64),

    #[error("Invalid epoch string: {0}")]
    InvalidEpochString(String),

    #[error("Invalid tabular field `{field}`: {value}")]
    InvalidTabularField { field: &'static str, value: String },

    #[error("CSV error: {0}")]
    CsvError(String),
}

impl From<roots::SearchError> for HelioframeError {
    fn from(_: roots::SearchError) -> Self {
        HelioframeError::KeplerSolverDivergence {
            iterations: 50,
            last_step: f64::NAN,
        }
    }
}

impl From<csv::Error> for HelioframeError {
    fn from(err: csv::Error) -> Self {
        HelioframeError::CsvError(err.to_string())
    }
}

impl PartialEq for HelioframeError {
    fn eq(&self, other: &Self) -> bool {
        use HelioframeError::*;
        match (self, other) {
            (
                UnsupportedScaleConversion {
                    mjd: a,
                    from: f1,
                    to: t1,
                },
                UnsupportedScaleConversion {
                    mjd: b,
                    from: f2,
                    to: t2,
                },
            ) => a == b && f1 == f2 && t1 == t2,
            (IncompatibleScale(a1, b1), IncompatibleScale(a2, b2)) => a1 == a2 && b1 == b2,
            (
                EphemerisUnavailable {
                    origin: o1,
                    mjd: m1,
                },
                EphemerisUnavailable {
                    origin: o2,
                    mjd: m2,
                },
            ) => o1 == o2 && m1 == m2,
            (FrameMismatch(a1, b1), FrameMismatch(a2, b2)) => a1 == a2 && b1 == b2,

            // Numeric payloads of solver failures are not meaningful for equality
            (KeplerSolverDivergence { .. }, KeplerSolverDivergence { .. }) => true,

            (DegenerateElementConversion(a), DegenerateElementConversion(b)) => a == b,
            (InvalidCovariance(_), InvalidCovariance(_)) => true,
            (InvalidEpochString(a), InvalidEpochString(b)) => a == b,
            (
                InvalidTabularField {
                    field: f1,
                    value: v1,
                },
                InvalidTabularField {
                    field: f2,
                    value: v2,
                },
            ) => f1 == f2 && v1 == v2,
            (CsvError(a), CsvError(b)) => a == b,

            _ => false,
        }
    }
}
