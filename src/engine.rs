// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! The seam between this crate and a skeleton engine.
//!
//! An engine is reached through exactly two foreign functions: one that computes a
//! [`MeshData`] record, and one that releases it. [`ResultHandle`] ties the two together so
//! that a record obtained from [`SkeletonEngine::compute`] is released exactly once, on every
//! exit path, and can not be read afterwards.

#[cfg(feature = "native")]
mod native;
mod stub;

#[cfg(feature = "native")]
pub use native::NativeEngine;
pub use stub::{StubEngine, stub_extrude_skeleton, stub_free_mesh_data};

use crate::{
    ffi::{ExtrudeSkeletonFn, MeshData},
    request::FlatInput,
};
use parking_lot::Mutex;
use std::{os::raw::c_int, ptr::NonNull};

/// The arguments of one engine call.
///
/// The flags are named fields, so the order in which they reach the engine is decided in one
/// place ([`ComputeArgs::invoke`]) and not at every call site.
#[derive(Debug, Clone, Copy)]
pub struct ComputeArgs<'a> {
    pub polygon_id: c_int,
    pub height: f32,
    pub input: &'a FlatInput,
    pub exclude_height: bool,
    pub validate_only: bool,
    pub verbose: bool,
}

impl ComputeArgs<'_> {
    /// Calls `entry` with the flat buffers of this request.
    ///
    /// # Safety
    /// `entry` must follow the [`ExtrudeSkeletonFn`] contract. The buffers are only borrowed for
    /// the duration of the call, the engine must not keep pointers into them.
    pub unsafe fn invoke(&self, entry: ExtrudeSkeletonFn) -> *mut MeshData {
        let vertices = &self.input.vertices;
        let angles = &self.input.angles;
        unsafe {
            entry(
                self.polygon_id,
                self.height,
                vertices.count(),
                vertices.lengths().as_ptr(),
                angles.count(),
                angles.lengths().as_ptr(),
                vertices.flat().as_ptr(),
                angles.flat().as_ptr(),
                self.exclude_height,
                self.validate_only,
                self.verbose,
            )
        }
    }
}

/// A skeleton engine reachable through one compute call and one release call.
pub trait SkeletonEngine: Sync {
    /// Runs the engine.
    ///
    /// A well behaved engine never returns null, failures are reported inside the record.
    ///
    /// # Safety
    /// The returned record is owned by the engine. It must be passed to
    /// [`SkeletonEngine::release`] exactly once and not be accessed after that.
    unsafe fn compute(&self, args: &ComputeArgs<'_>) -> *mut MeshData;

    /// Releases a record returned by [`SkeletonEngine::compute`].
    ///
    /// # Safety
    /// `result` must come from `compute` on this engine and must not have been released before.
    unsafe fn release(&self, result: NonNull<MeshData>);

    /// The lock to hold over a compute-decode-release sequence, if the engine is not reentrant.
    fn serializer(&self) -> Option<&Mutex<()>> {
        None
    }
}

/// A borrowed engine result. Released when dropped.
///
/// Reading the record is only possible through a borrow of the handle, so nothing can be read
/// once the handle is gone.
pub struct ResultHandle<'e, E: SkeletonEngine + ?Sized> {
    engine: &'e E,
    result: NonNull<MeshData>,
}

impl<'e, E: SkeletonEngine + ?Sized> ResultHandle<'e, E> {
    /// Takes ownership of a record returned by `engine`. Returns `None` for a null pointer,
    /// there is nothing to release in that case.
    ///
    /// # Safety
    /// `result` must come from `engine.compute()` and must not be released by anyone else.
    pub unsafe fn new(engine: &'e E, result: *mut MeshData) -> Option<Self> {
        NonNull::new(result).map(|result| Self { engine, result })
    }

    /// The record. Valid for as long as the handle is borrowed.
    pub fn data(&self) -> &MeshData {
        // Safety: the engine keeps the record alive until release(), which only happens in drop()
        unsafe { self.result.as_ref() }
    }
}

impl<E: SkeletonEngine + ?Sized> Drop for ResultHandle<'_, E> {
    fn drop(&mut self) {
        // Safety: `result` came from this engine, and drop() runs once
        unsafe { self.engine.release(self.result) }
    }
}
