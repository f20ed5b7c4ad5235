// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! The host facing entry points.

#[cfg(test)]
mod tests;

#[cfg(feature = "native")]
use crate::engine::NativeEngine;
use crate::{
    SkelBridgeError,
    decode::{decode_mesh_data, error_text},
    engine::{ComputeArgs, ResultHandle, SkeletonEngine},
    logger,
    outcome::{BoundaryFailure, EngineOutcome, Outcome},
    request::PolygonRequest,
};
use rayon::prelude::*;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::Instant,
};
use tracing::{debug, info, warn};

/// Extrudes one polygon with the native engine.
#[cfg(feature = "native")]
pub fn extrude_skeleton(request: &PolygonRequest) -> Result<Outcome, SkelBridgeError> {
    extrude_skeleton_with(NativeEngine::get(), request)
}

/// Extrudes one polygon with `engine`.
///
/// Only a caller error, a request with a different number of contour and angle lists, is
/// returned as `Err`, and in that case the engine is never called. Everything that goes wrong
/// at runtime is reported inside the returned [`Outcome`]: invalid contours, engine failures,
/// and failures of the call itself (null result, malformed result, panics).
pub fn extrude_skeleton_with<E: SkeletonEngine + ?Sized>(
    engine: &E,
    request: &PolygonRequest,
) -> Result<Outcome, SkelBridgeError> {
    let input = request.flatten()?;
    if request.verbose {
        info!(
            object_id = request.object_id,
            polygon_id = request.polygon_id,
            contours = input.vertices.count(),
            vertices = input.vertices.flat().len(),
            height = request.height,
            exclude_height = request.exclude_height,
            validate_only = request.validate_only,
            "extruding polygon"
        );
    } else {
        debug!(
            polygon_id = request.polygon_id,
            contours = input.vertices.count(),
            vertices = input.vertices.flat().len(),
            "extruding polygon"
        );
    }
    logger::log_request(request);

    let args = ComputeArgs {
        polygon_id: request.polygon_id,
        height: request.height,
        input: &input,
        exclude_height: request.exclude_height,
        validate_only: request.validate_only,
        verbose: request.verbose,
    };

    let start = Instant::now();
    let outcome = {
        let _serialized = engine.serializer().map(|lock| lock.lock());
        let mut obtained = false;
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            run_engine(engine, &args, &mut obtained)
        }));
        match attempt {
            Ok(Ok(decoded)) => Outcome::from_engine(request.object_id, decoded),
            Ok(Err(failure)) => {
                warn!(polygon_id = request.polygon_id, cause = %failure.cause, "engine call failed");
                Outcome::from_boundary_failure(request, failure)
            }
            Err(payload) => {
                let cause = SkelBridgeError::EnginePanic(panic_message(payload.as_ref()));
                warn!(polygon_id = request.polygon_id, %cause, "engine call panicked");
                // whatever the engine said is gone with the released record
                let native_error = obtained.then_some(None);
                Outcome::from_boundary_failure(
                    request,
                    BoundaryFailure {
                        native_error,
                        cause,
                    },
                )
            }
        }
    };

    if request.verbose {
        info!(
            polygon_id = outcome.polygon_id,
            has_error = outcome.has_error,
            vertices = outcome.vertices.len(),
            faces = outcome.faces.len(),
            ftcs_count = outcome.ftcs_count,
            elapsed = ?start.elapsed(),
            "extrusion done"
        );
    } else {
        debug!(
            polygon_id = outcome.polygon_id,
            has_error = outcome.has_error,
            elapsed = ?start.elapsed(),
            "extrusion done"
        );
    }
    Ok(outcome)
}

/// Extrudes several polygons in parallel.
///
/// Every request is checked before the first engine call, so a caller error anywhere in the
/// batch means no engine call at all. Outcomes are returned in request order.
pub fn extrude_batch<E: SkeletonEngine + ?Sized>(
    engine: &E,
    requests: &[PolygonRequest],
) -> Result<Vec<Outcome>, SkelBridgeError> {
    for request in requests {
        request.check_contract()?;
    }
    requests
        .par_iter()
        .map(|request| extrude_skeleton_with(engine, request))
        .collect()
}

/// Compute, decode, release. The record is released when `handle` goes out of scope, after
/// decoding has copied everything out of it, or during unwinding.
fn run_engine<E: SkeletonEngine + ?Sized>(
    engine: &E,
    args: &ComputeArgs<'_>,
    obtained: &mut bool,
) -> Result<EngineOutcome, BoundaryFailure> {
    let raw = unsafe { engine.compute(args) };
    let handle = unsafe { ResultHandle::new(engine, raw) }.ok_or(BoundaryFailure {
        native_error: None,
        cause: SkelBridgeError::NullResult,
    })?;
    *obtained = true;

    let data = handle.data();
    // Safety: `data` is a live record, it is released only when `handle` is dropped
    match unsafe { decode_mesh_data(data) } {
        Ok(decoded) => Ok(decoded),
        Err(cause) => Err(BoundaryFailure {
            native_error: Some(unsafe { error_text(data) }),
            cause,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
