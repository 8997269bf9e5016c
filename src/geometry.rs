/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the room envelope, sensor sample types, and the fixed 20-sensor layout.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::ReconstructionError;
use faer::Mat;
use serde::{Deserialize, Serialize};

/// A position in meters, room-relative, with the origin at one floor corner.
///
/// `x` runs along the width, `y` along the length, `z` along the height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A single validated sensor reading: where it was taken and what it read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub position: Point3D,
    pub value: f64,
}

impl SensorSample {
    pub fn new(position: Point3D, value: f64) -> Self {
        Self { position, value }
    }
}

/// The rectangular room volume, axis-aligned with the origin at one floor
/// corner.
///
/// Dimensions are in meters and immutable after construction. Construct
/// through [`RoomEnvelope::new`], which rejects non-positive dimensions,
/// or use [`RoomEnvelope::default`] for the reference installation's
/// `3.5 x 3.5 x 3.0` room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomEnvelope {
    width: f64,
    length: f64,
    height: f64,
}

impl RoomEnvelope {
    /// Creates a new envelope, validating that every dimension is positive.
    pub fn new(width: f64, length: f64, height: f64) -> Result<Self, ReconstructionError> {
        if !(width > 0.0 && length > 0.0 && height > 0.0) {
            return Err(ReconstructionError::EmptyEnvelope {
                width,
                length,
                height,
            });
        }

        Ok(Self {
            width,
            length,
            height,
        })
    }

    /// Extent along the x axis, in meters.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Extent along the y axis, in meters.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Extent along the z axis, in meters.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Per-axis extents in axis order `[width, length, height]`.
    pub(crate) fn dimensions(&self) -> [f64; 3] {
        [self.width, self.length, self.height]
    }
}

impl Default for RoomEnvelope {
    /// The reference installation's room: `3.5 x 3.5 x 3.0` meters.
    fn default() -> Self {
        Self {
            width: 3.5,
            length: 3.5,
            height: 3.0,
        }
    }
}

/// Returns the fixed 20-sensor installation layout for the given envelope
/// as a `(20, 3)` position matrix.
///
/// The layout is a pure function of the envelope and the row order is
/// stable across calls:
///
/// - rows 0..12: wall sensors, walls `x = 0`, `x = width`, `y = 0`,
///   `y = length` in that order. Each wall carries two sensors at the
///   wall's quarter-points at quarter height, then one centered sensor at
///   three-quarter height.
/// - rows 12..16: floor sensors at the floor quarter-points.
/// - rows 16..20: ceiling sensors at the ceiling quarter-points.
pub fn sensor_layout(envelope: &RoomEnvelope) -> Mat<f64> {
    let w = envelope.width();
    let l = envelope.length();
    let h = envelope.height();

    let positions: [[f64; 3]; 20] = [
        // Wall x = 0
        [0.0, l / 4.0, h / 4.0],
        [0.0, 3.0 * l / 4.0, h / 4.0],
        [0.0, l / 2.0, 3.0 * h / 4.0],
        // Wall x = width
        [w, l / 4.0, h / 4.0],
        [w, 3.0 * l / 4.0, h / 4.0],
        [w, l / 2.0, 3.0 * h / 4.0],
        // Wall y = 0
        [w / 4.0, 0.0, h / 4.0],
        [3.0 * w / 4.0, 0.0, h / 4.0],
        [w / 2.0, 0.0, 3.0 * h / 4.0],
        // Wall y = length
        [w / 4.0, l, h / 4.0],
        [3.0 * w / 4.0, l, h / 4.0],
        [w / 2.0, l, 3.0 * h / 4.0],
        // Floor
        [w / 4.0, l / 4.0, 0.0],
        [3.0 * w / 4.0, l / 4.0, 0.0],
        [w / 4.0, 3.0 * l / 4.0, 0.0],
        [3.0 * w / 4.0, 3.0 * l / 4.0, 0.0],
        // Ceiling
        [w / 4.0, l / 4.0, h],
        [3.0 * w / 4.0, l / 4.0, h],
        [w / 4.0, 3.0 * l / 4.0, h],
        [3.0 * w / 4.0, 3.0 * l / 4.0, h],
    ];

    Mat::from_fn(positions.len(), 3, |i, j| positions[i][j])
}
