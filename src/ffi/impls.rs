// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2023, 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! A module containing boilerplate implementations of standard traits such as Default, From etc etc

use super::FFIVector3;
use std::fmt;
use vector_traits::glam::{Vec3, vec3};

impl fmt::Debug for FFIVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn format_float(value: f32) -> String {
            if value.fract() == 0.0 {
                format!("{value:.1}",)
            } else {
                format!("{value}",)
            }
        }

        write!(
            f,
            "({},{},{})",
            format_float(self.x),
            format_float(self.y),
            format_float(self.z)
        )
    }
}

impl fmt::Display for FFIVector3 {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Vec3> for FFIVector3 {
    #[inline(always)]
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<(f32, f32, f32)> for FFIVector3 {
    #[inline(always)]
    fn from(v: (f32, f32, f32)) -> Self {
        Self {
            x: v.0,
            y: v.1,
            z: v.2,
        }
    }
}

impl From<[f32; 3]> for FFIVector3 {
    #[inline(always)]
    fn from(v: [f32; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

impl From<FFIVector3> for Vec3 {
    #[inline(always)]
    fn from(v: FFIVector3) -> Self {
        vec3(v.x, v.y, v.z)
    }
}

impl From<&FFIVector3> for Vec3 {
    #[inline(always)]
    fn from(v: &FFIVector3) -> Self {
        vec3(v.x, v.y, v.z)
    }
}

impl From<FFIVector3> for [f32; 3] {
    #[inline(always)]
    fn from(v: FFIVector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl From<FFIVector3> for (f32, f32, f32) {
    #[inline(always)]
    fn from(v: FFIVector3) -> Self {
        (v.x, v.y, v.z)
    }
}
