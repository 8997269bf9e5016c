/////////////////////////////////////////////////////////////////////////////////////////////
//
// Applies the room-volume validity mask to reconstructed field values on the lattice.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::geometry::RoomEnvelope;
use crate::grid::Grid3D;
use faer::Mat;
use serde::{Deserialize, Serialize};

/// Tolerance around the envelope faces when classifying lattice points.
///
/// Points within this distance of a face still count as inside, so samples
/// sitting exactly on a wall survive floating point noise in the lattice
/// coordinates.
const MASK_TOLERANCE: f64 = 0.01;

/// A reconstructed scalar field over an evaluation lattice.
///
/// Every lattice point carries a value, including the points in the padded
/// margin outside the room. A validity flag records whether the point lies
/// within the room volume (to within [`MASK_TOLERANCE`]); values at
/// invalid points are retained rather than overwritten so callers can still
/// inspect the extrapolated margin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarField {
    grid: Grid3D,
    values: Vec<f64>,
    valid: Vec<bool>,
}

impl ScalarField {
    /// Masks the given lattice values against the room volume.
    ///
    /// `values` must be the `(num_points, 1)` column produced by evaluating
    /// a model on `grid.points()`, in the lattice's iteration order.
    pub(crate) fn masked(grid: Grid3D, values: Mat<f64>, envelope: &RoomEnvelope) -> Self {
        assert_eq!(
            values.nrows(),
            grid.num_points(),
            "Values must cover every lattice point"
        );
        assert_eq!(values.ncols(), 1, "Values must be a single column");

        let dims = envelope.dimensions();
        let num_points = grid.num_points();

        let mut flat_values = Vec::with_capacity(num_points);
        let mut valid = Vec::with_capacity(num_points);

        for idx in 0..num_points {
            let point = grid.point(idx);
            let inside = (0..3).all(|axis| {
                point[axis] >= -MASK_TOLERANCE && point[axis] <= dims[axis] + MASK_TOLERANCE
            });

            flat_values.push(values[(idx, 0)]);
            valid.push(inside);
        }

        Self {
            grid,
            values: flat_values,
            valid,
        }
    }

    /// The evaluation lattice this field is defined over.
    pub fn grid(&self) -> &Grid3D {
        &self.grid
    }

    /// Raw values at every lattice point, valid or not, in lattice order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Per-point validity flags in lattice order.
    pub fn validity(&self) -> &[bool] {
        &self.valid
    }

    /// Number of lattice points inside the room volume.
    pub fn num_valid(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Value at the given flat index, or `None` when the point falls
    /// outside the room volume.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        if self.valid[index] {
            Some(self.values[index])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> ScalarField {
        let envelope = RoomEnvelope::new(3.5, 3.5, 3.0).unwrap();
        let grid = Grid3D::new(&envelope, 8, 0.3);
        let values = Mat::from_fn(grid.num_points(), 1, |i, _| i as f64);
        ScalarField::masked(grid, values, &envelope)
    }

    #[test]
    fn margin_points_are_invalid_but_keep_their_values() {
        let field = field();

        // Index 0 sits at (-0.3, -0.3, -0.3), outside the room.
        assert_eq!(field.value_at(0), None);
        assert_eq!(field.values()[0], 0.0);
        assert!(!field.validity()[0]);
    }

    #[test]
    fn interior_points_are_valid() {
        let field = field();

        let centre = field.grid().nearest_index(&[1.75, 1.75, 1.5]);
        assert!(field.validity()[centre]);
        assert_eq!(field.value_at(centre), Some(field.values()[centre]));
    }

    #[test]
    fn valid_count_matches_flags() {
        let field = field();

        let expected = field.validity().iter().filter(|&&v| v).count();
        assert_eq!(field.num_valid(), expected);
        assert!(field.num_valid() > 0);
        assert!(field.num_valid() < field.grid().num_points());
    }

    #[test]
    fn face_points_within_tolerance_are_valid() {
        // A lattice sized so a sample lands exactly on the floor.
        let envelope = RoomEnvelope::new(3.0, 3.0, 3.0).unwrap();
        let grid = Grid3D::new(&envelope, 13, 0.3);
        let values = Mat::from_fn(grid.num_points(), 1, |_, _| 1.0);
        let field = ScalarField::masked(grid, values, &envelope);

        // Step is 3.6 / 12 = 0.3, so the second sample on each axis sits
        // at 0.0, exactly on the envelope face.
        let on_floor = field.grid().nearest_index(&[1.5, 1.5, 0.0]);
        assert!(field.validity()[on_floor]);
    }
}
