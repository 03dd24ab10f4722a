//! # Transformation façade
//!
//! [`Transformer`] wires the frame rotations, origin shifts and element
//! conversions together behind one handle, wrapping the injected ephemeris in
//! a per-batch lookup cache. It owns no mutable state of its own: every
//! operation is a pure function from input state to output state, so a single
//! transformer can serve many threads concurrently.
//!
//! ## Batch semantics
//!
//! [`Transformer::transform_batch`] maps an ordered sequence of states to a
//! parallel ordered sequence of results. The caller chooses the failure
//! policy: [`ErrorPolicy::FailFast`] aborts on the first invalid element,
//! [`ErrorPolicy::Collect`] records per-element errors and keeps going.
//! Either way a failure is scoped to the element that raised it — it never
//! corrupts or blocks the other elements.
use itertools::{Either, Itertools};

use crate::cartesian::CartesianState;
use crate::ephemeris::{CachedEphemeris, Ephemeris};
use crate::helioframe_errors::HelioframeError;
use crate::origin::Origin;
use crate::ref_system::ReferenceFrame;

/// Failure handling mode of batch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first invalid element and surface its error.
    FailFast,
    /// Transform every element, recording per-element errors in place.
    Collect,
}

/// Per-element outcome of a batch transformation, index-parallel with the
/// input sequence.
pub type BatchResult = Vec<Result<CartesianState, HelioframeError>>;

/// Orchestrates frame rotations and origin shifts against one ephemeris.
#[derive(Debug)]
pub struct Transformer<E> {
    ephemeris: CachedEphemeris<E>,
}

impl<E: Ephemeris> Transformer<E> {
    /// Wrap an ephemeris service. Lookups made through this transformer are
    /// memoized per `(body, epoch)`, so batches sharing epochs hit the
    /// underlying service once per body.
    pub fn new(ephemeris: E) -> Self {
        Transformer {
            ephemeris: CachedEphemeris::new(ephemeris),
        }
    }

    /// The cache-wrapped ephemeris handle.
    pub fn ephemeris(&self) -> &CachedEphemeris<E> {
        &self.ephemeris
    }

    /// Re-express `state` in `frame` (pure rotation, infallible).
    pub fn to_frame(&self, state: &CartesianState, frame: ReferenceFrame) -> CartesianState {
        state.rotated_to(frame)
    }

    /// Re-express `state` relative to `origin`.
    ///
    /// The state must already be in the canonical (equatorial) frame; see
    /// [`CartesianState::shift_origin`]. Use [`Transformer::transform`] for
    /// the composed rotate-shift-rotate pipeline.
    pub fn to_origin(
        &self,
        state: &CartesianState,
        origin: Origin,
    ) -> Result<CartesianState, HelioframeError> {
        state.shift_origin(origin, &self.ephemeris)
    }

    /// Full pipeline: rotate into the canonical frame if an origin change is
    /// needed, shift the origin, then rotate into the requested frame.
    pub fn transform(
        &self,
        state: &CartesianState,
        frame: ReferenceFrame,
        origin: Origin,
    ) -> Result<CartesianState, HelioframeError> {
        if origin == state.origin {
            return Ok(state.rotated_to(frame));
        }
        let canonical = state.rotated_to(ReferenceFrame::Equatorial);
        let shifted = canonical.shift_origin(origin, &self.ephemeris)?;
        Ok(shifted.rotated_to(frame))
    }

    /// Transform an ordered sequence of states to the same target frame and
    /// origin.
    ///
    /// Return
    /// ------
    /// * A vector parallel to `states` (same length, same order), each entry
    ///   the transformed state or the error scoped to that element. Under
    ///   [`ErrorPolicy::FailFast`] the first failure is returned as the outer
    ///   error instead.
    pub fn transform_batch(
        &self,
        states: &[CartesianState],
        frame: ReferenceFrame,
        origin: Origin,
        policy: ErrorPolicy,
    ) -> Result<BatchResult, HelioframeError> {
        let mut results = Vec::with_capacity(states.len());
        for state in states {
            match (policy, self.transform(state, frame, origin)) {
                (ErrorPolicy::FailFast, Err(err)) => return Err(err),
                (_, result) => results.push(result),
            }
        }
        Ok(results)
    }
}

/// Split a batch outcome into indexed successes and indexed failures,
/// preserving the original element indices on both sides.
pub fn partition_batch(
    results: BatchResult,
) -> (Vec<(usize, CartesianState)>, Vec<(usize, HelioframeError)>) {
    results
        .into_iter()
        .enumerate()
        .partition_map(|(idx, result)| match result {
            Ok(state) => Either::Left((idx, state)),
            Err(err) => Either::Right((idx, err)),
        })
}
