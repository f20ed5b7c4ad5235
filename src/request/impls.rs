// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2023, 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! A module containing boilerplate implementations of standard traits such as Default, From etc etc

use super::{ConfigType, Options};
use crate::SkelBridgeError;

impl Options for ConfigType {
    fn get_mandatory_parsed_option<T: std::str::FromStr>(
        &self,
        key: &str,
        default: Option<T>,
    ) -> Result<T, SkelBridgeError> {
        match self.get_parsed_option(key)? {
            Some(val) => Ok(val),
            None => default.ok_or_else(|| {
                SkelBridgeError::MissingParameter(format!(
                    "The mandatory parameter \"{key}\" was missing"
                ))
            }),
        }
    }

    fn get_parsed_option<T: std::str::FromStr>(
        &self,
        key: &str,
    ) -> Result<Option<T>, SkelBridgeError> {
        match self.get(key) {
            // python sends its booleans capitalized
            Some(v) => match v.trim().to_lowercase().parse() {
                Ok(val) => Ok(Some(val)),
                Err(_) => Err(SkelBridgeError::InvalidParameter(format!(
                    "Invalid value for parameter {{\"{key}\"}}: {{\"{v}\"}}"
                ))),
            },
            None => Ok(None),
        }
    }
}
