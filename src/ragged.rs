// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 lacklustr@protonmail.com https://github.com/eadf
// This file is part of the skelbridge crate.

//! Ragged arrays: nested, variable length sequences encoded as one flat buffer plus a buffer of
//! lengths. The same encoding is used for the contours sent to the engine and for the failed
//! contours it sends back.


use crate::SkelBridgeError;
use std::os::raw::c_int;

/// A flat buffer plus the length of every original sub sequence, in original order.
///
/// Invariant: `lengths` sums to `flat.len()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ragged<T> {
    flat: Vec<T>,
    lengths: Vec<c_int>,
}

impl<T: Clone> Ragged<T> {
    /// Concatenates `nested` into one buffer. Order is preserved, nothing is deduplicated.
    pub fn flatten<S: AsRef<[T]>>(nested: &[S]) -> Result<Self, SkelBridgeError> {
        let total: usize = nested.iter().map(|s| s.as_ref().len()).sum();
        let _ = to_c_int(total, "total element count")?;
        let _ = to_c_int(nested.len(), "sequence count")?;

        let mut flat = Vec::with_capacity(total);
        let mut lengths = Vec::with_capacity(nested.len());
        for sequence in nested {
            let sequence = sequence.as_ref();
            lengths.push(to_c_int(sequence.len(), "sequence length")?);
            flat.extend_from_slice(sequence);
        }
        Ok(Self { flat, lengths })
    }

    /// Rebuilds the nested structure, the exact inverse of [`Ragged::flatten`].
    pub fn unflatten(&self) -> Result<Vec<Vec<T>>, SkelBridgeError> {
        split(&self.flat, &self.lengths)
    }
}

impl<T> Ragged<T> {
    pub fn flat(&self) -> &[T] {
        &self.flat
    }

    pub fn lengths(&self) -> &[c_int] {
        &self.lengths
    }

    /// Number of sub sequences, as the engine expects it.
    pub fn count(&self) -> c_int {
        // flatten() already checked that this fits
        self.lengths.len() as c_int
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Splits `flat` into sub sequences using a running offset over `lengths`.
///
/// Fails if a length is negative, if the lengths run past the end of `flat`, or if elements
/// are left over once every length has been consumed.
pub fn split<T: Clone>(flat: &[T], lengths: &[c_int]) -> Result<Vec<Vec<T>>, SkelBridgeError> {
    let mut rv = Vec::with_capacity(lengths.len());
    let mut idx = 0_usize;
    for (n, length) in lengths.iter().enumerate() {
        let length = usize::try_from(*length).map_err(|_| {
            SkelBridgeError::InvalidInputData(format!("Sequence #{n} has a negative length {length}"))
        })?;
        let end = idx
            .checked_add(length)
            .filter(|end| *end <= flat.len())
            .ok_or_else(|| {
                SkelBridgeError::InvalidInputData(format!(
                    "Sequence #{n} of length {length} at offset {idx} runs past the end of {} elements",
                    flat.len()
                ))
            })?;
        rv.push(flat[idx..end].to_vec());
        idx = end;
    }
    if idx != flat.len() {
        return Err(SkelBridgeError::InvalidInputData(format!(
            "The lengths sum to {idx} but there are {} elements",
            flat.len()
        )));
    }
    Ok(rv)
}

fn to_c_int(value: usize, what: &str) -> Result<c_int, SkelBridgeError> {
    c_int::try_from(value)
        .map_err(|_| SkelBridgeError::Overflow(format!("The {what} {value} does not fit in a c_int")))
}
