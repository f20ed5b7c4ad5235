// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

mod impls;

use crate::{SkelBridgeError, ffi::FFIVector3, ragged::Ragged};
use std::collections::HashMap;

/// String options, as sent by a host UI operator.
pub type ConfigType = HashMap<String, String>;

pub(crate) trait Options {
    /// Will return an option parsed as a `T` or an Err.
    /// If the option is missing `default` is returned, if there is one.
    fn get_mandatory_parsed_option<T: std::str::FromStr>(
        &self,
        key: &str,
        default: Option<T>,
    ) -> Result<T, SkelBridgeError>;

    /// Will return an option parsed as a `T` or None.
    /// If the option is missing None is returned, if it there but if it can't be parsed an error
    /// will be returned.
    fn get_parsed_option<T: std::str::FromStr>(
        &self,
        key: &str,
    ) -> Result<Option<T>, SkelBridgeError>;
}

/// One polygon to extrude: its contours, the per edge angles and the control flags.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRequest {
    pub object_id: i32,
    pub polygon_id: i32,
    pub height: f32,
    /// Closed contours, each an ordered list of points.
    pub contours: Vec<Vec<FFIVector3>>,
    /// Bevel angles in degrees, `angles[c][i]` belongs to the edge starting at `contours[c][i]`.
    pub angles: Vec<Vec<f32>>,
    /// Let the roof reach its natural height instead of cutting it at `height`.
    pub exclude_height: bool,
    /// Only check the contours, do not build a mesh.
    pub validate_only: bool,
    pub verbose: bool,
}

/// The request contours and angles, flattened into engine buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatInput {
    pub vertices: Ragged<FFIVector3>,
    pub angles: Ragged<f32>,
}

impl PolygonRequest {
    pub const OBJECT_ID_TAG: &'static str = "object_id";
    pub const POLYGON_ID_TAG: &'static str = "polygon_id";
    pub const HEIGHT_TAG: &'static str = "height";
    pub const EXCLUDE_HEIGHT_TAG: &'static str = "exclude_height";
    pub const VALIDATE_ONLY_TAG: &'static str = "only_tests_for_valid";
    pub const VERBOSE_TAG: &'static str = "verbose";

    /// A request with every flag cleared.
    pub fn new(
        object_id: i32,
        polygon_id: i32,
        height: f32,
        contours: Vec<Vec<FFIVector3>>,
        angles: Vec<Vec<f32>>,
    ) -> Self {
        Self {
            object_id,
            polygon_id,
            height,
            contours,
            angles,
            exclude_height: false,
            validate_only: false,
            verbose: false,
        }
    }

    /// Builds a request from string options.
    ///
    /// `object_id`, `polygon_id` and `height` are mandatory, the boolean flags default to `false`.
    pub fn from_options(
        config: &ConfigType,
        contours: Vec<Vec<FFIVector3>>,
        angles: Vec<Vec<f32>>,
    ) -> Result<Self, SkelBridgeError> {
        Ok(Self {
            object_id: config.get_mandatory_parsed_option(Self::OBJECT_ID_TAG, None)?,
            polygon_id: config.get_mandatory_parsed_option(Self::POLYGON_ID_TAG, None)?,
            height: config.get_mandatory_parsed_option(Self::HEIGHT_TAG, None)?,
            contours,
            angles,
            exclude_height: config
                .get_parsed_option(Self::EXCLUDE_HEIGHT_TAG)?
                .unwrap_or(false),
            validate_only: config
                .get_parsed_option(Self::VALIDATE_ONLY_TAG)?
                .unwrap_or(false),
            verbose: config.get_parsed_option(Self::VERBOSE_TAG)?.unwrap_or(false),
        })
    }

    /// The total number of submitted points, over all contours.
    pub fn vertex_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// Every submitted point, in contour order.
    pub fn all_vertices(&self) -> Vec<FFIVector3> {
        self.contours.iter().flatten().copied().collect()
    }

    /// Fails if there is not exactly one angle list per contour.
    pub fn check_contract(&self) -> Result<(), SkelBridgeError> {
        if self.contours.len() != self.angles.len() {
            return Err(SkelBridgeError::MismatchedContours(format!(
                "polygon_id {} has {} vertex contours but {} angle lists",
                self.polygon_id,
                self.contours.len(),
                self.angles.len()
            )));
        }
        Ok(())
    }

    /// Flattens contours and angles into engine buffers.
    ///
    /// A request with a different number of contour and angle lists is a caller error, it is
    /// rejected here so the engine is never called with it. Per contour checks are left to the
    /// engine.
    pub fn flatten(&self) -> Result<FlatInput, SkelBridgeError> {
        self.check_contract()?;
        Ok(FlatInput {
            vertices: Ragged::flatten(&self.contours)?,
            angles: Ragged::flatten(&self.angles)?,
        })
    }
}
