// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! The native straight skeleton library, linked at build time.

use super::{ComputeArgs, SkeletonEngine};
use crate::ffi::{FFIVector3, MeshData};
use parking_lot::Mutex;
use std::{
    os::raw::c_int,
    ptr::NonNull,
    sync::OnceLock,
};
use tracing::debug;

#[link(name = "ctypes_SVCGAL")]
unsafe extern "C" {
    fn extrude_stright_skeleton(
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

    fn free_mem(result: *mut MeshData);
}

static NATIVE_ENGINE: OnceLock<NativeEngine> = OnceLock::new();

/// The native engine. It is not known to be reentrant, so every compute-decode-release
/// sequence holds `lock`.
#[derive(Debug)]
pub struct NativeEngine {
    lock: Mutex<()>,
}

impl NativeEngine {
    /// The process wide instance, created on first use.
    pub fn get() -> &'static NativeEngine {
        NATIVE_ENGINE.get_or_init(|| {
            debug!("initializing the native skeleton engine");
            NativeEngine {
                lock: Mutex::new(()),
            }
        })
    }
}

impl SkeletonEngine for NativeEngine {
    unsafe fn compute(&self, args: &ComputeArgs<'_>) -> *mut MeshData {
        unsafe { args.invoke(extrude_stright_skeleton) }
    }

    unsafe fn release(&self, result: NonNull<MeshData>) {
        unsafe { free_mem(result.as_ptr()) }
    }

    fn serializer(&self) -> Option<&Mutex<()>> {
        Some(&self.lock)
    }
}
