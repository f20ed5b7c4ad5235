// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.


use crate::{SkelBridgeError, request::PolygonRequest};
use itertools::Itertools;
use std::{
    env, fs,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, warn};

/// Names a directory where every incoming request is dumped. Logging is off when unset.
pub(crate) const DATA_LOGGER_PATH_ENV: &str = "SKELBRIDGE_DATA_LOGGER_PATH";

/// Peeks at an incoming request and writes it to file, if the logger is enabled.
/// Problems are logged and otherwise ignored, they never affect the call.
pub(crate) fn log_request(request: &PolygonRequest) {
    let log_dir = match env::var(DATA_LOGGER_PATH_ENV) {
        Ok(path) => PathBuf::from(path),
        Err(_) => return,
    };
    if let Err(err) = write_request(&log_dir, request) {
        warn!(?log_dir, %err, "could not log the request");
    }
}

/// Writes `request` as `<stem>.txt` (options and angles) and `<stem>.obj` (contours).
/// Returns the common stem, or `None` if `log_dir` is not a writable directory.
pub(crate) fn write_request(
    log_dir: &Path,
    request: &PolygonRequest,
) -> Result<Option<PathBuf>, SkelBridgeError> {
    let metadata = fs::metadata(log_dir)?;
    if !metadata.is_dir() || metadata.permissions().readonly() {
        warn!(
            ?log_dir,
            "the logger path does not exist or is not writable, skipping logging"
        );
        return Ok(None);
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let base_file_name = log_dir.join(format!(
        "{timestamp:x}_{}_{}",
        request.object_id, request.polygon_id
    ));
    {
        let log_file_name = base_file_name.with_extension("txt");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_file_name)?;
        writeln!(file, "{}={}", PolygonRequest::OBJECT_ID_TAG, request.object_id)?;
        writeln!(file, "{}={}", PolygonRequest::POLYGON_ID_TAG, request.polygon_id)?;
        writeln!(file, "{}={}", PolygonRequest::HEIGHT_TAG, request.height)?;
        writeln!(
            file,
            "{}={}",
            PolygonRequest::EXCLUDE_HEIGHT_TAG,
            request.exclude_height
        )?;
        writeln!(
            file,
            "{}={}",
            PolygonRequest::VALIDATE_ONLY_TAG,
            request.validate_only
        )?;
        writeln!(file, "{}={}", PolygonRequest::VERBOSE_TAG, request.verbose)?;
        for (n, angles) in request.angles.iter().enumerate() {
            writeln!(file, "angles[{n}]={}", angles.iter().join(","))?;
        }
        debug!(?log_file_name, "logged request options");
    }
    {
        let obj_file_name = base_file_name.with_extension("obj");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&obj_file_name)?;
        writeln!(file, "o polygon_{}", request.polygon_id)?;
        for v in request.contours.iter().flatten() {
            writeln!(file, "v {} {} {}", v.x, v.y, v.z)?;
        }
        // obj indices are 1-based, every contour is written as a closed line loop
        let mut first = 1_usize;
        for contour in request.contours.iter().filter(|c| !c.is_empty()) {
            let indices = (first..first + contour.len()).chain(std::iter::once(first));
            writeln!(file, "l {}", indices.format(" "))?;
            first += contour.len();
        }
        debug!(?obj_file_name, "logged request contours");
    }
    Ok(Some(base_file_name))
}
