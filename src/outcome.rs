// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! Host side results. [`EngineOutcome`] is what a decoded engine result means, [`Outcome`] is the
//! single record shape every call returns.


use crate::{SkelBridgeError, ffi::FFIVector3, request::PolygonRequest};

/// A triangulated roof mesh. Every index in `edges` and `faces` is below `vertices.len()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<FFIVector3>,
    pub edges: Vec<[usize; 2]>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Checks that every edge and face index points at an existing vertex.
    pub fn validate_indices(&self) -> Result<(), SkelBridgeError> {
        let nn_verts = self.vertices.len();
        let bad_edge = self.edges.iter().enumerate().find_map(|(n, e)| {
            e.iter().find(|i| **i >= nn_verts).map(|i| ("edge", n, *i))
        });
        let bad_face = self.faces.iter().enumerate().find_map(|(n, f)| {
            f.iter().find(|i| **i >= nn_verts).map(|i| ("face", n, *i))
        });
        if let Some((what, n, i)) = bad_edge.or(bad_face) {
            return Err(SkelBridgeError::MalformedResult(format!(
                "{what} #{n} references vertex {i}, but there are only {nn_verts} vertices"
            )));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }
}

/// A contour the engine rejected, with the engine's explanation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailedContour {
    pub description: String,
    pub vertices: Vec<FFIVector3>,
}

/// The meaning of one engine result.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// A mesh was built, or the contours passed a validation only run (empty mesh).
    Success { polygon_id: i32, mesh: Mesh },
    /// One or more contours can not be used for skeleton construction.
    TopologyError {
        polygon_id: i32,
        message: Option<String>,
        failed: Vec<FailedContour>,
    },
    /// The engine failed for a reason not tied to a specific contour.
    OpaqueError {
        polygon_id: i32,
        message: Option<String>,
    },
}

impl EngineOutcome {
    pub fn polygon_id(&self) -> i32 {
        match self {
            Self::Success { polygon_id, .. }
            | Self::TopologyError { polygon_id, .. }
            | Self::OpaqueError { polygon_id, .. } => *polygon_id,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success { .. })
    }
}

/// Everything known about a call that went wrong before a usable result could be decoded.
#[derive(Debug)]
pub(crate) struct BoundaryFailure {
    /// `None` if no result handle was obtained, otherwise the engine's own error text, if any.
    pub(crate) native_error: Option<Option<String>>,
    pub(crate) cause: SkelBridgeError,
}

/// The uniform record returned for every call.
///
/// On success the mesh fields are set and the `ftcs_*` fields are empty. On failure the mesh
/// fields are empty and the `ftcs_*` fields describe the failed contours, if the engine
/// reported any. The `ftcs_*` lists are parallel and `ftcs_count` is their length.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub object_id: i32,
    pub polygon_id: i32,
    pub vertices: Vec<FFIVector3>,
    pub edges: Vec<[usize; 2]>,
    pub faces: Vec<[usize; 3]>,
    pub has_error: bool,
    pub str_error: Option<String>,
    pub ftcs_count: usize,
    pub ftcs_vertices_counter: Vec<usize>,
    pub ftcs_vertices_description: Vec<String>,
    pub ftcs_vertices_list: Vec<Vec<FFIVector3>>,
}

impl Outcome {
    /// An outcome with no error and every list empty.
    pub fn new(object_id: i32, polygon_id: i32) -> Self {
        Self {
            object_id,
            polygon_id,
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            has_error: false,
            str_error: None,
            ftcs_count: 0,
            ftcs_vertices_counter: Vec::new(),
            ftcs_vertices_description: Vec::new(),
            ftcs_vertices_list: Vec::new(),
        }
    }

    /// Flattens a decoded engine result into the uniform record.
    pub fn from_engine(object_id: i32, outcome: EngineOutcome) -> Self {
        let mut rv = Self::new(object_id, outcome.polygon_id());
        match outcome {
            EngineOutcome::Success { mesh, .. } => {
                rv.vertices = mesh.vertices;
                rv.edges = mesh.edges;
                rv.faces = mesh.faces;
            }
            EngineOutcome::TopologyError {
                message, failed, ..
            } => {
                rv.has_error = true;
                rv.str_error = message;
                rv.ftcs_count = failed.len();
                for contour in failed {
                    rv.ftcs_vertices_counter.push(contour.vertices.len());
                    rv.ftcs_vertices_description.push(contour.description);
                    rv.ftcs_vertices_list.push(contour.vertices);
                }
            }
            EngineOutcome::OpaqueError { message, .. } => {
                rv.has_error = true;
                rv.str_error = message;
            }
        }
        rv
    }

    /// Synthesizes an outcome for a call that failed at the boundary itself.
    ///
    /// The submitted points are returned as one failed contour, so the caller can still look
    /// at what was sent.
    pub(crate) fn from_boundary_failure(request: &PolygonRequest, failure: BoundaryFailure) -> Self {
        let prefix = match failure.native_error {
            Some(Some(native)) => format!("Unexpected exception while calculating data: {native}."),
            Some(None) => {
                "Unexpected exception while calculating data. No internal addition info."
                    .to_string()
            }
            None => "General unexpected exception.".to_string(),
        };
        let submitted = request.all_vertices();
        let mut rv = Self::new(request.object_id, request.polygon_id);
        rv.has_error = true;
        rv.str_error = Some(format!(
            "{prefix} polygon_id: {}, {}.",
            request.polygon_id, failure.cause
        ));
        rv.ftcs_count = 1;
        rv.ftcs_vertices_counter.push(submitted.len());
        rv.ftcs_vertices_description
            .push("All submitted vertices, no engine diagnostic available".to_string());
        rv.ftcs_vertices_list.push(submitted);
        rv
    }

    /// The failed contours carried by this outcome, zipped back together.
    pub fn failed_contours(&self) -> impl Iterator<Item = FailedContour> + '_ {
        self.ftcs_vertices_description
            .iter()
            .zip(self.ftcs_vertices_list.iter())
            .map(|(description, vertices)| FailedContour {
                description: description.clone(),
                vertices: vertices.clone(),
            })
    }
}
