// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

use super::{extrude_batch, extrude_skeleton_with};
use crate::{
    SkelBridgeError,
    engine::{ComputeArgs, SkeletonEngine, StubEngine},
    ffi::{FFIVector3, MeshData},
    outcome::Outcome,
    request::PolygonRequest,
};
use parking_lot::Mutex;
use std::{
    ffi::CString,
    os::raw::c_int,
    ptr::{self, NonNull},
    sync::atomic::{AtomicUsize, Ordering},
};

fn square() -> Vec<FFIVector3> {
    vec![
        (0.0, 0.0, 0.0).into(),
        (1.0, 0.0, 0.0).into(),
        (1.0, 1.0, 0.0).into(),
        (0.0, 1.0, 0.0).into(),
    ]
}

fn bow_tie() -> Vec<FFIVector3> {
    vec![
        (0.0, 0.0, 0.0).into(),
        (1.0, 1.0, 0.0).into(),
        (1.0, 0.0, 0.0).into(),
        (0.0, 1.0, 0.0).into(),
    ]
}

/// The fields every outcome must have, whatever happened
fn assert_uniform(outcome: &Outcome) {
    assert_eq!(outcome.ftcs_count, outcome.ftcs_vertices_counter.len());
    assert_eq!(outcome.ftcs_count, outcome.ftcs_vertices_description.len());
    assert_eq!(outcome.ftcs_count, outcome.ftcs_vertices_list.len());
    for (counter, list) in outcome
        .ftcs_vertices_counter
        .iter()
        .zip(outcome.ftcs_vertices_list.iter())
    {
        assert_eq!(*counter, list.len());
    }
    if outcome.has_error {
        assert!(outcome.vertices.is_empty());
        assert!(outcome.edges.is_empty());
        assert!(outcome.faces.is_empty());
    } else {
        assert_eq!(None, outcome.str_error);
        assert_eq!(0, outcome.ftcs_count);
    }
    let nn_verts = outcome.vertices.len();
    assert!(outcome.edges.iter().flatten().all(|i| *i < nn_verts));
    assert!(outcome.faces.iter().flatten().all(|i| *i < nn_verts));
}

/// What a misbehaving engine hands back
#[derive(Clone, Copy)]
enum Fault {
    Null,
    Panic,
    NegativeCount,
    IndexOutOfRange,
}

static OUT_OF_RANGE_VERTICES: [FFIVector3; 3] = [
    FFIVector3 { x: 0.0, y: 0.0, z: 0.0 },
    FFIVector3 { x: 1.0, y: 0.0, z: 0.0 },
    FFIVector3 { x: 0.0, y: 1.0, z: 0.0 },
];
static OUT_OF_RANGE_FACES: [[c_int; 3]; 1] = [[0, 1, 10]];

struct FaultyEngine {
    fault: Fault,
    computed: AtomicUsize,
    released: AtomicUsize,
}

impl FaultyEngine {
    fn new(fault: Fault) -> Self {
        Self {
            fault,
            computed: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }
}

impl SkeletonEngine for FaultyEngine {
    unsafe fn compute(&self, args: &ComputeArgs<'_>) -> *mut MeshData {
        let _ = self.computed.fetch_add(1, Ordering::SeqCst);
        let mut md = MeshData::empty(args.polygon_id);
        match self.fault {
            Fault::Null => return ptr::null_mut(),
            Fault::Panic => panic!("engine fault"),
            Fault::NegativeCount => {
                md.nn_verts = -1;
                md.str_error = CString::new("half written record").unwrap().into_raw();
            }
            Fault::IndexOutOfRange => {
                md.nn_verts = 3;
                md.nn_faces = 1;
                md.vertices = OUT_OF_RANGE_VERTICES.as_ptr() as *mut _;
                md.faces = OUT_OF_RANGE_FACES.as_ptr() as *mut _;
            }
        }
        Box::into_raw(Box::new(md))
    }

    unsafe fn release(&self, result: NonNull<MeshData>) {
        let _ = self.released.fetch_add(1, Ordering::SeqCst);
        let md = unsafe { Box::from_raw(result.as_ptr()) };
        if !md.str_error.is_null() {
            drop(unsafe { CString::from_raw(md.str_error) });
        }
    }
}

/// Delegates to the stub engine, with a lock that must be held during every call
#[derive(Default)]
struct SerializedEngine {
    inner: StubEngine,
    lock: Mutex<()>,
    unlocked_calls: AtomicUsize,
}

impl SkeletonEngine for SerializedEngine {
    unsafe fn compute(&self, args: &ComputeArgs<'_>) -> *mut MeshData {
        if !self.lock.is_locked() {
            let _ = self.unlocked_calls.fetch_add(1, Ordering::SeqCst);
        }
        unsafe { self.inner.compute(args) }
    }

    unsafe fn release(&self, result: NonNull<MeshData>) {
        if !self.lock.is_locked() {
            let _ = self.unlocked_calls.fetch_add(1, Ordering::SeqCst);
        }
        unsafe { self.inner.release(result) }
    }

    fn serializer(&self) -> Option<&Mutex<()>> {
        Some(&self.lock)
    }
}

#[test]
fn square_success() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let request = PolygonRequest::new(21, 3, 1.0, vec![square()], vec![vec![0.0; 4]]);
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert_eq!(21, outcome.object_id);
    assert_eq!(3, outcome.polygon_id);
    assert!(!outcome.has_error);
    assert!(!outcome.vertices.is_empty());
    assert!(!outcome.edges.is_empty());
    assert!(!outcome.faces.is_empty());
    assert_eq!(0, outcome.ftcs_count);
    assert_eq!(1, engine.compute_count());
    assert_eq!(1, engine.release_count());
    Ok(())
}

#[test]
fn invalid_contour_validate_only() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let mut request = PolygonRequest::new(0, 6, 1.0, vec![bow_tie()], vec![vec![0.0; 4]]);
    request.validate_only = true;
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert!(outcome.has_error);
    assert!(outcome.str_error.is_some());
    assert_eq!(1, outcome.ftcs_count);
    assert_eq!(vec![4], outcome.ftcs_vertices_counter);
    assert_eq!(vec![bow_tie()], outcome.ftcs_vertices_list);
    assert_eq!(1, engine.release_count());
    Ok(())
}

#[test]
fn valid_contour_validate_only() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let mut request = PolygonRequest::new(0, 6, 1.0, vec![square()], vec![vec![0.0; 4]]);
    request.validate_only = true;
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert!(!outcome.has_error);
    assert!(outcome.vertices.is_empty());
    assert_eq!(0, outcome.ftcs_count);
    Ok(())
}

#[test]
fn opaque_engine_error() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let request = PolygonRequest::new(0, 6, 1.0, vec![square()], vec![vec![0.0; 5]]);
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert!(outcome.has_error);
    assert!(outcome.str_error.is_some());
    assert_eq!(0, outcome.ftcs_count);
    assert_eq!(1, engine.release_count());
    Ok(())
}

#[test]
fn mismatched_lists_never_reach_the_engine() {
    let engine = StubEngine::new();
    let request = PolygonRequest::new(0, 6, 1.0, vec![square(), square()], vec![vec![0.0; 4]]);
    let err = extrude_skeleton_with(&engine, &request).unwrap_err();
    assert!(matches!(err, SkelBridgeError::MismatchedContours(_)));
    assert!(err.to_string().contains("polygon_id 6"), "{err}");
    assert_eq!(0, engine.compute_count());
    assert_eq!(0, engine.release_count());
}

#[test]
fn null_result_becomes_boundary_failure() -> Result<(), SkelBridgeError> {
    let engine = FaultyEngine::new(Fault::Null);
    let request = PolygonRequest::new(1, 7, 1.0, vec![square()], vec![vec![0.0; 4]]);
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert!(outcome.has_error);
    let text = outcome.str_error.clone().unwrap_or_default();
    assert!(text.starts_with("General unexpected exception."), "{text}");
    assert!(text.contains("polygon_id: 7"), "{text}");
    assert_eq!(vec![square()], outcome.ftcs_vertices_list);
    assert_eq!(1, engine.computed.load(Ordering::SeqCst));
    assert_eq!(0, engine.released.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn panic_becomes_boundary_failure() -> Result<(), SkelBridgeError> {
    let engine = FaultyEngine::new(Fault::Panic);
    let request = PolygonRequest::new(1, 7, 1.0, vec![square()], vec![vec![0.0; 4]]);
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert!(outcome.has_error);
    let text = outcome.str_error.clone().unwrap_or_default();
    assert!(text.contains("engine fault"), "{text}");
    assert_eq!(1, outcome.ftcs_count);
    assert_eq!(0, engine.released.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn malformed_record_is_released_once() -> Result<(), SkelBridgeError> {
    let engine = FaultyEngine::new(Fault::NegativeCount);
    let request = PolygonRequest::new(1, 9, 1.0, vec![square()], vec![vec![0.0; 4]]);
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    let text = outcome.str_error.clone().unwrap_or_default();
    assert!(
        text.starts_with("Unexpected exception while calculating data: half written record."),
        "{text}"
    );
    assert!(text.contains("polygon_id: 9"), "{text}");
    assert_eq!(1, engine.released.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn out_of_range_index_is_a_boundary_failure() -> Result<(), SkelBridgeError> {
    let engine = FaultyEngine::new(Fault::IndexOutOfRange);
    let request = PolygonRequest::new(1, 9, 1.0, vec![square()], vec![vec![0.0; 4]]);
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert!(outcome.has_error);
    let text = outcome.str_error.clone().unwrap_or_default();
    assert!(text.contains("No internal addition info."), "{text}");
    assert!(text.contains("references vertex 10"), "{text}");
    assert_eq!(1, engine.released.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn release_count_matches_call_count() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let mut requests = Vec::new();
    for n in 0..12 {
        let contour = if n % 3 == 0 { bow_tie() } else { square() };
        let angles = if n % 4 == 0 { vec![0.0; 3] } else { vec![0.0; 4] };
        let mut request = PolygonRequest::new(n, n, 1.0, vec![contour], vec![angles]);
        request.validate_only = n % 5 == 0;
        requests.push(request);
    }
    for request in requests.iter() {
        let outcome = extrude_skeleton_with(&engine, request)?;
        assert_uniform(&outcome);
    }
    assert_eq!(12, engine.compute_count());
    assert_eq!(12, engine.release_count());
    Ok(())
}

#[test]
fn serialized_engine_holds_its_lock() -> Result<(), SkelBridgeError> {
    let engine = SerializedEngine::default();
    let requests: Vec<_> = (0..8)
        .map(|n| PolygonRequest::new(0, n, 1.0, vec![square()], vec![vec![0.0; 4]]))
        .collect();
    let outcomes = extrude_batch(&engine, &requests)?;
    assert_eq!(8, outcomes.len());
    assert_eq!(0, engine.unlocked_calls.load(Ordering::SeqCst));
    assert_eq!(8, engine.inner.release_count());
    assert!(!engine.lock.is_locked());
    Ok(())
}

#[test]
fn batch_keeps_request_order() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let requests: Vec<_> = (0..20)
        .map(|n| {
            let contour = if n % 2 == 0 { square() } else { bow_tie() };
            PolygonRequest::new(100 + n, n, 1.0, vec![contour], vec![vec![45.0; 4]])
        })
        .collect();
    let outcomes = extrude_batch(&engine, &requests)?;
    for (n, outcome) in outcomes.iter().enumerate() {
        assert_uniform(outcome);
        assert_eq!(n as i32, outcome.polygon_id);
        assert_eq!(100 + n as i32, outcome.object_id);
        assert_eq!(n % 2 == 1, outcome.has_error);
    }
    assert_eq!(20, engine.compute_count());
    assert_eq!(20, engine.release_count());
    Ok(())
}

#[test]
fn batch_with_a_bad_request_makes_no_calls() {
    let engine = StubEngine::new();
    let requests = vec![
        PolygonRequest::new(0, 0, 1.0, vec![square()], vec![vec![0.0; 4]]),
        PolygonRequest::new(0, 1, 1.0, vec![square()], vec![]),
    ];
    assert!(matches!(
        extrude_batch(&engine, &requests),
        Err(SkelBridgeError::MismatchedContours(_))
    ));
    assert_eq!(0, engine.compute_count());
}

#[test]
fn two_contours_round_trip_through_the_engine() -> Result<(), SkelBridgeError> {
    let engine = StubEngine::new();
    let shifted: Vec<FFIVector3> = bow_tie()
        .into_iter()
        .map(|v| FFIVector3::new(v.x + 5.0, v.y, v.z))
        .collect();
    let mut request = PolygonRequest::new(
        0,
        2,
        1.0,
        vec![bow_tie(), square(), shifted.clone()],
        vec![vec![0.0; 4]; 3],
    );
    request.verbose = true;
    let outcome = extrude_skeleton_with(&engine, &request)?;
    assert_uniform(&outcome);
    assert_eq!(2, outcome.ftcs_count);
    assert_eq!(vec![4, 4], outcome.ftcs_vertices_counter);
    assert_eq!(vec![bow_tie(), shifted], outcome.ftcs_vertices_list);
    assert!(outcome.ftcs_vertices_description[0].contains("#0"));
    assert!(outcome.ftcs_vertices_description[1].contains("#2"));
    Ok(())
}
