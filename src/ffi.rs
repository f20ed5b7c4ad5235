// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2023, 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! This module contains the C compatible layout shared with the skeleton engine
mod impls;

use std::{
    os::raw::{c_char, c_int},
    ptr,
};
use vector_traits::glam::Vec2;

/// A simple 3D vector struct for FFI (Foreign Function Interface) usage.
///
/// The layout is identical to `float[3]`, so a `*const FFIVector3` can be handed to the engine
/// wherever it expects a flat array of float triples.
///
/// # Example
///
/// ```
/// use skelbridge::prelude::FFIVector3;
///
/// let vector = FFIVector3 { x: 1.0, y: 2.0, z: 3.0 };
/// let as_array: [f32; 3] = vector.into();
/// assert_eq!(as_array, [1.0, 2.0, 3.0]);
/// ```
#[derive(PartialEq, PartialOrd, Copy, Clone, Default)]
#[repr(C)]
pub struct FFIVector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl FFIVector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// The result record produced by the skeleton engine.
///
/// The record, and every buffer it points to, is owned by the engine. It stays valid until the
/// matching release call and must not be touched after that.
///
/// # Fields
///
/// * `has_error`: `false` means the mesh fields are valid, `true` means the error fields are.
/// * `str_error`: Null terminated error text, may be null.
/// * `polygon_id`: The polygon id echoed back from the request.
/// * `nn_verts`, `nn_edges`, `nn_faces`: Lengths of `vertices`, `edges` and `faces`.
/// * `ftcs_count`: The number of failed contours.
/// * `ftcs_vertices_counter`: `ftcs_count` vertex counts, one per failed contour.
/// * `ftcs_vertices_description`: `ftcs_count` null terminated descriptions.
/// * `ftcs_vertices_list`: All failed contour vertices, concatenated in failed contour order.
#[repr(C)]
#[derive(Debug)]
pub struct MeshData {
    pub has_error: bool,
    pub str_error: *mut c_char,

    pub polygon_id: c_int,

    pub nn_verts: c_int,
    pub nn_edges: c_int,
    pub nn_faces: c_int,
    pub vertices: *mut FFIVector3,
    pub edges: *mut [c_int; 2],
    pub faces: *mut [c_int; 3],

    pub ftcs_count: c_int,
    pub ftcs_vertices_counter: *mut c_int,
    pub ftcs_vertices_description: *mut *mut c_char,
    pub ftcs_vertices_list: *mut FFIVector3,
}

impl MeshData {
    /// A record with zero extent and no error, every pointer null.
    pub fn empty(polygon_id: c_int) -> Self {
        Self {
            has_error: false,
            str_error: ptr::null_mut(),
            polygon_id,
            nn_verts: 0,
            nn_edges: 0,
            nn_faces: 0,
            vertices: ptr::null_mut(),
            edges: ptr::null_mut(),
            faces: ptr::null_mut(),
            ftcs_count: 0,
            ftcs_vertices_counter: ptr::null_mut(),
            ftcs_vertices_description: ptr::null_mut(),
            ftcs_vertices_list: ptr::null_mut(),
        }
    }
}

/// Signature of the engine entry point.
///
/// Argument order: polygon id, height, contour count, contour lengths, angle count,
/// angle lengths, flat vertices, flat angles, `exclude_height`, `validate_only`, `verbose`.
pub type ExtrudeSkeletonFn = unsafe extern "C" fn(
    polygon_id: c_int,
    height: f32,
    contour_count: c_int,
    contour_lengths: *const c_int,
    angle_count: c_int,
    angle_lengths: *const c_int,
    vertices: *const FFIVector3,
    angles: *const f32,
    exclude_height: bool,
    validate_only: bool,
    verbose: bool,
) -> *mut MeshData;

/// Signature of the engine release function.
pub type FreeMeshDataFn = unsafe extern "C" fn(result: *mut MeshData);
