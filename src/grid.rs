/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the regular 3D evaluation lattice spanning the padded room volume.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::geometry::RoomEnvelope;
use faer::Mat;
use serde::{Deserialize, Serialize};

/// A regular evaluation lattice over the padded room volume.
///
/// Each axis carries `resolution` evenly spaced samples spanning
/// `[-margin, dim + margin]`, giving `resolution^3` points in total.
/// Iteration order is fixed: axis 0 (x) varies fastest, then axis 1 (y),
/// then axis 2 (z). Flat indices used throughout the crate refer to this
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid3D {
    resolution: usize,
    margin: f64,
    ranges: [(f64, f64); 3],
}

impl Grid3D {
    /// Creates a grid over the given envelope.
    ///
    /// `resolution` is the number of samples per axis and must be at
    /// least 2 so every axis has a well-defined step.
    pub fn new(envelope: &RoomEnvelope, resolution: usize, margin: f64) -> Self {
        assert!(
            resolution >= 2,
            "Grid resolution must be at least 2, got {}",
            resolution
        );

        let dims = envelope.dimensions();
        let ranges = [
            (-margin, dims[0] + margin),
            (-margin, dims[1] + margin),
            (-margin, dims[2] + margin),
        ];

        Self {
            resolution,
            margin,
            ranges,
        }
    }

    /// Number of samples per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Outward padding beyond the envelope on every axis, in meters.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Total number of lattice points, `resolution^3`.
    pub fn num_points(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    /// Inclusive `(min, max)` range of the given axis.
    pub fn axis_range(&self, axis: usize) -> (f64, f64) {
        self.ranges[axis]
    }

    /// Spacing between adjacent samples along the given axis.
    pub fn step(&self, axis: usize) -> f64 {
        let (start, end) = self.ranges[axis];
        (end - start) / (self.resolution as f64 - 1.0)
    }

    /// Coordinates of the lattice point at the given flat index.
    pub fn point(&self, index: usize) -> [f64; 3] {
        assert!(index < self.num_points(), "Grid index out of range");

        let mut coords = [0.0f64; 3];
        for (axis, coord) in coords.iter_mut().enumerate() {
            let stride = self.resolution.pow(axis as u32);
            let index_in_dim = (index / stride) % self.resolution;
            let (start, _) = self.ranges[axis];
            *coord = start + self.step(axis) * index_in_dim as f64;
        }

        coords
    }

    /// Flat index of the lattice point closest to the given position.
    ///
    /// Positions outside the lattice clamp to the nearest boundary sample.
    pub fn nearest_index(&self, position: &[f64; 3]) -> usize {
        let mut index = 0usize;
        for axis in 0..3 {
            let (start, _) = self.ranges[axis];
            let raw = ((position[axis] - start) / self.step(axis)).round();
            let clamped = raw.clamp(0.0, (self.resolution - 1) as f64) as usize;
            index += clamped * self.resolution.pow(axis as u32);
        }
        index
    }

    /// The dense `(resolution^3, 3)` matrix of lattice points in iteration
    /// order.
    pub fn points(&self) -> Mat<f64> {
        let total_points = self.num_points();

        Mat::from_fn(total_points, 3, |row_idx, col_idx| {
            let stride = self.resolution.pow(col_idx as u32);
            let index_in_dim = (row_idx / stride) % self.resolution;
            let (start, _) = self.ranges[col_idx];
            start + self.step(col_idx) * index_in_dim as f64
        })
    }
}
