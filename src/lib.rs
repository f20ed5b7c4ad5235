// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2023, 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

#![deny(
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible,
    non_camel_case_types,
    unused_parens,
    non_upper_case_globals,
    unused_qualifications,
    unused_results,
    unused_imports,
    unused_variables,
    bare_trait_objects,
    ellipsis_inclusive_range_patterns,
    elided_lifetimes_in_paths
)]
#![warn(clippy::explicit_into_iter_loop)]

//! Boundary layer between a host and a native straight skeleton engine.
//!
//! The host hands over closed polygon contours with per edge bevel angles. They are flattened
//! into C compatible buffers, passed to the engine in one foreign call, and the foreign owned
//! result is decoded back into Rust data and released exactly once.
//!
//! Design guideline: every call is stateless and self contained. Nothing returned by the engine
//! outlives the call that produced it, and every runtime failure is reported through the same
//! [`Outcome`](outcome::Outcome) shape.

pub mod decode;
pub mod engine;
pub mod extrude;
pub mod ffi;
pub(crate) mod logger;
pub mod outcome;
pub mod ragged;
pub mod request;

pub mod prelude {
    #[cfg(feature = "native")]
    pub use crate::{engine::NativeEngine, extrude::extrude_skeleton};
    pub use crate::{
        SkelBridgeError,
        engine::{SkeletonEngine, StubEngine},
        extrude::{extrude_batch, extrude_skeleton_with},
        ffi::{FFIVector3, MeshData},
        outcome::{EngineOutcome, FailedContour, Mesh, Outcome},
        ragged::Ragged,
        request::{ConfigType, PolygonRequest},
    };
}

#[derive(thiserror::Error, Debug)]
pub enum SkelBridgeError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Overflow error: {0}")]
    Overflow(String),

    #[error("Vertices and angles do not describe the same contours: {0}")]
    MismatchedContours(String),

    #[error("Invalid input data: {0}")]
    InvalidParameter(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid input data value: {0}")]
    InvalidInputData(String),

    #[error("The engine returned a null result handle")]
    NullResult,

    #[error("Malformed engine result: {0}")]
    MalformedResult(String),

    #[error("The engine panicked: {0}")]
    EnginePanic(String),
}
