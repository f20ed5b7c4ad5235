// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! Turns an engine owned [`MeshData`] record into owned Rust data.
//!
//! Everything is copied out, nothing returned from here points into the record. Counts and
//! indices are checked before they are used, a record that does not add up is reported as
//! [`SkelBridgeError::MalformedResult`].


use crate::{
    SkelBridgeError,
    ffi::MeshData,
    outcome::{EngineOutcome, FailedContour, Mesh},
    ragged::split,
};
use std::{
    ffi::CStr,
    os::raw::{c_char, c_int},
    slice,
};

/// Decodes a result record.
///
/// # Safety
/// `data` must be a live record from the engine: every non null pointer in it must be valid
/// for the number of elements its count describes, and every string must be null terminated.
pub unsafe fn decode_mesh_data(data: &MeshData) -> Result<EngineOutcome, SkelBridgeError> {
    let polygon_id = data.polygon_id;
    if !data.has_error {
        let mesh = unsafe { decode_mesh(data)? };
        return Ok(EngineOutcome::Success { polygon_id, mesh });
    }
    let message = unsafe { error_text(data) };
    if data.ftcs_count == 0 {
        return Ok(EngineOutcome::OpaqueError {
            polygon_id,
            message,
        });
    }
    let failed = unsafe { decode_failed_contours(data)? };
    Ok(EngineOutcome::TopologyError {
        polygon_id,
        message,
        failed,
    })
}

/// The engine's error text, if there is one.
///
/// # Safety
/// `data.str_error` must be null or point to a null terminated string.
pub unsafe fn error_text(data: &MeshData) -> Option<String> {
    unsafe { c_string(data.str_error) }
}

unsafe fn decode_mesh(data: &MeshData) -> Result<Mesh, SkelBridgeError> {
    let vertices = unsafe { foreign_slice(data, data.vertices, data.nn_verts, "vertices")? };
    let edges = unsafe { foreign_slice(data, data.edges, data.nn_edges, "edges")? };
    let faces = unsafe { foreign_slice(data, data.faces, data.nn_faces, "faces")? };

    let mesh = Mesh {
        vertices: vertices.to_vec(),
        edges: edges
            .iter()
            .map(|e| to_indices(e))
            .collect::<Result<_, _>>()?,
        faces: faces
            .iter()
            .map(|f| to_indices(f))
            .collect::<Result<_, _>>()?,
    };
    mesh.validate_indices()?;
    Ok(mesh)
}

unsafe fn decode_failed_contours(data: &MeshData) -> Result<Vec<FailedContour>, SkelBridgeError> {
    let counters = unsafe {
        foreign_slice(
            data,
            data.ftcs_vertices_counter,
            data.ftcs_count,
            "ftcs_vertices_counter",
        )?
    };
    let descriptions = unsafe {
        foreign_slice(
            data,
            data.ftcs_vertices_description,
            data.ftcs_count,
            "ftcs_vertices_description",
        )?
    };
    let mut total: c_int = 0;
    for counter in counters {
        if *counter < 0 {
            return Err(SkelBridgeError::MalformedResult(format!(
                "negative failed contour vertex count {counter}"
            )));
        }
        total = total.checked_add(*counter).ok_or_else(|| {
            SkelBridgeError::MalformedResult("failed contour vertex counts overflow".to_string())
        })?;
    }
    let list = unsafe { foreign_slice(data, data.ftcs_vertices_list, total, "ftcs_vertices_list")? };
    let contours = split(list, counters)
        .map_err(|e| SkelBridgeError::MalformedResult(e.to_string()))?;

    Ok(descriptions
        .iter()
        .zip(contours)
        .map(|(description, vertices)| FailedContour {
            description: unsafe { c_string(*description) }.unwrap_or_default(),
            vertices,
        })
        .collect())
}

/// Borrows one of the record's buffers. The borrow can not outlive `_owner`.
unsafe fn foreign_slice<'a, T>(
    _owner: &'a MeshData,
    ptr: *const T,
    count: c_int,
    what: &str,
) -> Result<&'a [T], SkelBridgeError> {
    match count {
        0 => Ok(&[]),
        n if n < 0 => Err(SkelBridgeError::MalformedResult(format!(
            "negative {what} count {n}"
        ))),
        _ if ptr.is_null() => Err(SkelBridgeError::MalformedResult(format!(
            "null {what} buffer with count {count}"
        ))),
        n => Ok(unsafe { slice::from_raw_parts(ptr, n as usize) }),
    }
}

fn to_indices<const N: usize>(raw: &[c_int; N]) -> Result<[usize; N], SkelBridgeError> {
    let mut rv = [0_usize; N];
    for (dst, src) in rv.iter_mut().zip(raw.iter()) {
        *dst = usize::try_from(*src).map_err(|_| {
            SkelBridgeError::MalformedResult(format!("negative vertex index {src}"))
        })?;
    }
    Ok(rv)
}

unsafe fn c_string(s: *const c_char) -> Option<String> {
    if s.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
    }
}
