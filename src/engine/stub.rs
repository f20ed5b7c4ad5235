// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! A pure Rust stand-in for the native engine, exported through the same C ABI.
//!
//! It validates contours the way the native engine reports them (failed contours with
//! descriptions) and builds one pyramid per contour instead of a real straight skeleton roof.
//! The bevel angles are checked for count, but otherwise not used.

use super::{ComputeArgs, SkeletonEngine};
use crate::{
    ffi::{FFIVector3, MeshData},
    outcome::{FailedContour, Mesh},
    ragged::split,
};
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::{
    ffi::CString,
    os::raw::{c_char, c_int},
    ptr::{self, NonNull},
    slice,
    sync::atomic::{AtomicUsize, Ordering},
};
use vector_traits::glam::{Vec2, Vec3};

/// An in-process engine, safe to call from several threads at once.
#[derive(Debug, Default)]
pub struct StubEngine {
    computed: AtomicUsize,
    released: AtomicUsize,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compute calls so far
    pub fn compute_count(&self) -> usize {
        self.computed.load(Ordering::SeqCst)
    }

    /// Number of release calls so far
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl SkeletonEngine for StubEngine {
    unsafe fn compute(&self, args: &ComputeArgs<'_>) -> *mut MeshData {
        let _ = self.computed.fetch_add(1, Ordering::SeqCst);
        unsafe { args.invoke(stub_extrude_skeleton) }
    }

    unsafe fn release(&self, result: NonNull<MeshData>) {
        let _ = self.released.fetch_add(1, Ordering::SeqCst);
        unsafe { stub_free_mesh_data(result.as_ptr()) }
    }
}

enum StubReport {
    Mesh(Mesh),
    Failed {
        message: String,
        failed: Vec<FailedContour>,
    },
    Opaque(String),
}

/// Stub implementation of [`ExtrudeSkeletonFn`](crate::ffi::ExtrudeSkeletonFn).
///
/// Never returns null. The record must be released with [`stub_free_mesh_data`].
///
/// # Safety
/// Every pointer must be valid for the number of elements its count (or the sum of the
/// matching lengths) describes. Null is accepted where that number is zero.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn stub_extrude_skeleton(
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
    _verbose: bool,
) -> *mut MeshData {
    let input = unsafe {
        read_ragged(contour_count, contour_lengths, vertices, "contour").and_then(|contours| {
            read_ragged(angle_count, angle_lengths, angles, "angle list")
                .map(|angles| (contours, angles))
        })
    };
    let report = match input {
        Ok((contours, angles)) => {
            stub_extrude(&contours, &angles, height, exclude_height, validate_only)
        }
        Err(message) => StubReport::Opaque(message),
    };
    Box::into_raw(Box::new(into_mesh_data(polygon_id, report)))
}

/// Releases a record returned by [`stub_extrude_skeleton`]. Null is ignored.
///
/// # Safety
/// `result` must come from [`stub_extrude_skeleton`] and must not have been released before.
pub unsafe extern "C" fn stub_free_mesh_data(result: *mut MeshData) {
    if result.is_null() {
        return;
    }
    unsafe {
        let md = Box::from_raw(result);
        free_c_string(md.str_error);
        free_slice(md.vertices, md.nn_verts);
        free_slice(md.edges, md.nn_edges);
        free_slice(md.faces, md.nn_faces);

        let mut list_len: c_int = 0;
        if !md.ftcs_vertices_counter.is_null() {
            for counter in slice::from_raw_parts(md.ftcs_vertices_counter, md.ftcs_count as usize)
            {
                list_len += *counter;
            }
        }
        if !md.ftcs_vertices_description.is_null() {
            for description in
                slice::from_raw_parts(md.ftcs_vertices_description, md.ftcs_count as usize)
            {
                free_c_string(*description);
            }
        }
        free_slice(md.ftcs_vertices_counter, md.ftcs_count);
        free_slice(md.ftcs_vertices_description, md.ftcs_count);
        free_slice(md.ftcs_vertices_list, list_len);
    }
}

/// Reads one ragged input buffer pair back into nested vectors.
unsafe fn read_ragged<T: Clone>(
    count: c_int,
    lengths: *const c_int,
    flat: *const T,
    what: &str,
) -> Result<Vec<Vec<T>>, String> {
    let lengths = unsafe { borrow_slice(lengths, count, what)? };
    let mut total: c_int = 0;
    for length in lengths {
        if *length < 0 {
            return Err(format!("A {what} has a negative length {length}"));
        }
        total = total
            .checked_add(*length)
            .ok_or_else(|| format!("The {what} lengths overflow"))?;
    }
    let flat = unsafe { borrow_slice(flat, total, what)? };
    split(flat, lengths).map_err(|e| e.to_string())
}

unsafe fn borrow_slice<'a, T>(ptr: *const T, count: c_int, what: &str) -> Result<&'a [T], String> {
    match count {
        0 => Ok(&[]),
        n if n < 0 => Err(format!("Negative {what} count {n}")),
        _ if ptr.is_null() => Err(format!("Null {what} buffer with count {count}")),
        n => Ok(unsafe { slice::from_raw_parts(ptr, n as usize) }),
    }
}

fn stub_extrude(
    contours: &[Vec<FFIVector3>],
    angles: &[Vec<f32>],
    height: f32,
    exclude_height: bool,
    validate_only: bool,
) -> StubReport {
    if contours.len() != angles.len() {
        return StubReport::Opaque(format!(
            "Got {} contours but {} angle lists",
            contours.len(),
            angles.len()
        ));
    }
    if contours.is_empty() {
        return StubReport::Opaque("No contours to extrude".to_string());
    }
    if let Some((n, (c, a))) = contours
        .iter()
        .zip(angles.iter())
        .enumerate()
        .find(|(_, (c, a))| c.len() != a.len())
    {
        return StubReport::Opaque(format!(
            "Contour #{n} has {} vertices but {} angles",
            c.len(),
            a.len()
        ));
    }

    let failed: Vec<FailedContour> = contours
        .iter()
        .enumerate()
        .filter_map(|(n, contour)| {
            contour_defect(contour).map(|defect| FailedContour {
                description: format!("Contour #{n} {defect}"),
                vertices: contour.clone(),
            })
        })
        .collect();
    if !failed.is_empty() {
        return StubReport::Failed {
            message: format!(
                "{} of {} contours are not valid for skeleton construction",
                failed.len(),
                contours.len()
            ),
            failed,
        };
    }
    if validate_only {
        return StubReport::Mesh(Mesh::default());
    }
    StubReport::Mesh(pyramids(contours, height, exclude_height))
}

/// Describes why a contour can not be used, or `None` if it can.
fn contour_defect(contour: &[FFIVector3]) -> Option<&'static str> {
    if contour.len() < 3 {
        return Some("has fewer than 3 vertices");
    }
    if !contour.iter().all(|v| v.is_finite()) {
        return Some("contains non finite coordinates");
    }
    let edges: Vec<(Vec2, Vec2)> = contour
        .iter()
        .map(|v| v.xy())
        .circular_tuple_windows::<(_, _)>()
        .collect();
    if edges.iter().any(|(a, b)| a == b) {
        return Some("has duplicate consecutive vertices");
    }
    let last = edges.len() - 1;
    for (i, j) in (0..edges.len()).tuple_combinations::<(_, _)>() {
        // neighbours share a vertex
        if j == i + 1 || (i == 0 && j == last) {
            continue;
        }
        if segments_cross(edges[i], edges[j]) {
            return Some("is self-intersecting");
        }
    }
    None
}

fn segments_cross((a0, a1): (Vec2, Vec2), (b0, b1): (Vec2, Vec2)) -> bool {
    let d0 = (a1 - a0).perp_dot(b0 - a0);
    let d1 = (a1 - a0).perp_dot(b1 - a0);
    let d2 = (b1 - b0).perp_dot(a0 - b0);
    let d3 = (b1 - b0).perp_dot(a1 - b0);
    d0 * d1 < 0.0 && d2 * d3 < 0.0
}

/// One pyramid per contour, apex above the vertex centroid.
///
/// With `exclude_height` the apex is placed at the distance from the centroid to the nearest
/// edge, otherwise at `height`.
fn pyramids(contours: &[Vec<FFIVector3>], height: f32, exclude_height: bool) -> Mesh {
    let mut mesh = Mesh::default();
    let mut seen_edges = FxHashSet::<[usize; 2]>::default();
    for contour in contours {
        let base = mesh.vertices.len();
        let centroid = contour.iter().map(Vec3::from).sum::<Vec3>() / contour.len() as f32;
        let apex_height = if exclude_height {
            contour
                .iter()
                .map(|v| v.xy())
                .circular_tuple_windows::<(_, _)>()
                .map(|(a, b)| distance_to_line(centroid.truncate(), a, b))
                .fold(f32::INFINITY, f32::min)
        } else {
            height
        };
        mesh.vertices.extend_from_slice(contour);
        mesh.vertices
            .push((centroid + Vec3::Z * apex_height).into());
        let apex = mesh.vertices.len() - 1;

        for (i0, i1) in (base..apex).circular_tuple_windows::<(_, _)>() {
            mesh.faces.push([i0, i1, apex]);
            for (e0, e1) in [(i0, i1), (i1, apex)] {
                let key = [e0.min(e1), e0.max(e1)];
                if seen_edges.insert(key) {
                    mesh.edges.push([e0, e1]);
                }
            }
        }
    }
    mesh
}

fn distance_to_line(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.perp_dot(p - a).abs() / d.length()
}

fn into_mesh_data(polygon_id: c_int, report: StubReport) -> MeshData {
    let fits = |len: usize| c_int::try_from(len).is_ok();
    let report = match report {
        StubReport::Mesh(mesh)
            if !fits(mesh.vertices.len()) || !fits(mesh.edges.len()) || !fits(mesh.faces.len()) =>
        {
            StubReport::Opaque("The mesh is too large to return".to_string())
        }
        report => report,
    };

    let mut md = MeshData::empty(polygon_id);
    match report {
        StubReport::Mesh(mesh) => {
            md.nn_verts = mesh.vertices.len() as c_int;
            md.nn_edges = mesh.edges.len() as c_int;
            md.nn_faces = mesh.faces.len() as c_int;
            md.vertices = into_raw_slice(mesh.vertices);
            md.edges = into_raw_slice(
                mesh.edges
                    .into_iter()
                    .map(|e| e.map(|i| i as c_int))
                    .collect(),
            );
            md.faces = into_raw_slice(
                mesh.faces
                    .into_iter()
                    .map(|f| f.map(|i| i as c_int))
                    .collect(),
            );
        }
        StubReport::Failed { message, failed } => {
            md.has_error = true;
            md.str_error = into_c_string(message);
            md.ftcs_count = failed.len() as c_int;
            let mut counters = Vec::with_capacity(failed.len());
            let mut descriptions = Vec::with_capacity(failed.len());
            let mut list = Vec::new();
            for contour in failed {
                counters.push(contour.vertices.len() as c_int);
                descriptions.push(into_c_string(contour.description));
                list.extend(contour.vertices);
            }
            md.ftcs_vertices_counter = into_raw_slice(counters);
            md.ftcs_vertices_description = into_raw_slice(descriptions);
            md.ftcs_vertices_list = into_raw_slice(list);
        }
        StubReport::Opaque(message) => {
            md.has_error = true;
            md.str_error = into_c_string(message);
        }
    }
    md
}

/// Hands the memory of `v` over to the record, null if empty.
fn into_raw_slice<T>(v: Vec<T>) -> *mut T {
    if v.is_empty() {
        return ptr::null_mut();
    }
    Box::into_raw(v.into_boxed_slice()) as *mut T
}

unsafe fn free_slice<T>(ptr: *mut T, len: c_int) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len as usize)) });
    }
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
