/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error type reported by field reconstruction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::error::Error;
use std::fmt;

/// Errors that can occur while reconstructing a scalar field.
///
/// Every failure carries the context needed to report it without access
/// to the original call site.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconstructionError {
    /// Too few pairwise-distinct anchor positions to fit the system.
    InsufficientSamples { found: usize, required: usize },

    /// The dense solve produced non-finite coefficients or a backward-error
    /// residual too large to trust.
    SingularFit { residual: f64 },

    /// The requested grid resolution is below the supported minimum.
    InvalidResolution { resolution: usize, minimum: usize },

    /// The room envelope has a non-positive dimension.
    EmptyEnvelope { width: f64, length: f64, height: f64 },
}

impl fmt::Display for ReconstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructionError::InsufficientSamples { found, required } => write!(
                f,
                "insufficient samples: found {} distinct positions, need at least {}",
                found, required
            ),
            ReconstructionError::SingularFit { residual } => write!(
                f,
                "singular fit: solve residual {:e} exceeds the trusted tolerance",
                residual
            ),
            ReconstructionError::InvalidResolution {
                resolution,
                minimum,
            } => write!(
                f,
                "invalid resolution: {} is below the minimum of {}",
                resolution, minimum
            ),
            ReconstructionError::EmptyEnvelope {
                width,
                length,
                height,
            } => write!(
                f,
                "empty envelope: dimensions {} x {} x {} must all be positive",
                width, length, height
            ),
        }
    }
}

impl Error for ReconstructionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = ReconstructionError::InsufficientSamples {
            found: 2,
            required: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("2"));
        assert!(msg.contains("4"));

        let err = ReconstructionError::InvalidResolution {
            resolution: 5,
            minimum: 8,
        };
        assert!(err.to_string().contains("below the minimum"));
    }
}
