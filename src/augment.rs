/////////////////////////////////////////////////////////////////////////////////////////////
//
// Synthesizes edge, face, and corner boundary anchors around the real sensor samples.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::common;
use crate::geometry::RoomEnvelope;
use faer::Mat;

/// Distance from a face within which a sensor spawns a face anchor.
const FACE_TOLERANCE: f64 = 0.1;

/// Outward displacement of face and corner anchors beyond the envelope.
const ANCHOR_OFFSET: f64 = 0.3;

/// Number of edge anchors produced for any envelope.
pub(crate) const NUM_EDGE_ANCHORS: usize = 12;

/// Number of corner anchors produced for any envelope.
pub(crate) const NUM_CORNER_ANCHORS: usize = 8;

/// Synthesizes boundary anchors around the real samples and returns the
/// combined point set as `(positions, values)` matrices.
///
/// The real samples occupy the leading rows in input order and are never
/// mutated. Three groups of anchors follow:
///
/// 1. **Edge anchors** - the 12 room-edge midpoints (4 vertical edges at
///    half height, 4 floor-edge midpoints, 4 ceiling-edge midpoints), each
///    valued with the arithmetic mean of the 2 nearest real sensors. The
///    distance sort is stable, so exact ties resolve to the lower sensor
///    index. With a single real sensor the mean degrades to that sensor's
///    value.
/// 2. **Face anchors** - one anchor per real sensor per face it sits
///    within 0.1 m of, displaced to exactly 0.3 m beyond that face along
///    that axis and carrying the sensor's value unchanged. The two faces
///    of an axis are mutually exclusive, so each axis contributes at most
///    one anchor per sensor.
/// 3. **Corner anchors** - the 8 envelope corners extended outward by
///    0.3 m on all three axes, each valued with the nearest real sensor's
///    value.
pub fn augment(
    positions: &Mat<f64>,
    values: &Mat<f64>,
    envelope: &RoomEnvelope,
) -> (Mat<f64>, Mat<f64>) {
    let num_real = positions.nrows();

    assert_eq!(positions.ncols(), 3, "Sample positions must be (n, 3)");
    assert_eq!(
        num_real,
        values.nrows(),
        "Positions and values must have the same number of rows"
    );
    assert!(num_real > 0, "At least one real sample is required");

    let mut anchor_positions: Vec<[f64; 3]> = Vec::new();
    let mut anchor_values: Vec<f64> = Vec::new();

    for edge_point in edge_midpoints(envelope) {
        let distances = distances_to(positions, &edge_point);
        let order = common::argsort(&distances);
        let take = order.len().min(2);

        let mean = order[..take]
            .iter()
            .map(|&i| values[(i, 0)])
            .sum::<f64>()
            / take as f64;

        anchor_positions.push(edge_point);
        anchor_values.push(mean);
    }

    let dims = envelope.dimensions();

    for i in 0..num_real {
        let value = values[(i, 0)];

        for axis in 0..3 {
            let coord = positions[(i, axis)];
            let mut anchor = [positions[(i, 0)], positions[(i, 1)], positions[(i, 2)]];

            if coord <= FACE_TOLERANCE {
                anchor[axis] = -ANCHOR_OFFSET;
            } else if coord >= dims[axis] - FACE_TOLERANCE {
                anchor[axis] = dims[axis] + ANCHOR_OFFSET;
            } else {
                continue;
            }

            anchor_positions.push(anchor);
            anchor_values.push(value);
        }
    }

    for corner in extended_corners(envelope) {
        let distances = distances_to(positions, &corner);
        let nearest = common::argmin(&distances);

        anchor_positions.push(corner);
        anchor_values.push(values[(nearest, 0)]);
    }

    let total = num_real + anchor_positions.len();

    let combined_positions = Mat::from_fn(total, 3, |i, j| {
        if i < num_real {
            positions[(i, j)]
        } else {
            anchor_positions[i - num_real][j]
        }
    });

    let combined_values = Mat::from_fn(total, 1, |i, _| {
        if i < num_real {
            values[(i, 0)]
        } else {
            anchor_values[i - num_real]
        }
    });

    (combined_positions, combined_values)
}

/// Midpoints of the 12 room edges: vertical edges at half height, then
/// floor-edge midpoints, then ceiling-edge midpoints.
fn edge_midpoints(envelope: &RoomEnvelope) -> [[f64; 3]; NUM_EDGE_ANCHORS] {
    let w = envelope.width();
    let l = envelope.length();
    let h = envelope.height();

    [
        // Vertical edges
        [0.0, 0.0, h / 2.0],
        [w, 0.0, h / 2.0],
        [0.0, l, h / 2.0],
        [w, l, h / 2.0],
        // Floor edges
        [w / 2.0, 0.0, 0.0],
        [w / 2.0, l, 0.0],
        [0.0, l / 2.0, 0.0],
        [w, l / 2.0, 0.0],
        // Ceiling edges
        [w / 2.0, 0.0, h],
        [w / 2.0, l, h],
        [0.0, l / 2.0, h],
        [w, l / 2.0, h],
    ]
}

/// The 8 envelope corners pushed outward by the anchor offset on every axis.
fn extended_corners(envelope: &RoomEnvelope) -> [[f64; 3]; NUM_CORNER_ANCHORS] {
    let dims = envelope.dimensions();
    let mut corners = [[0.0f64; 3]; NUM_CORNER_ANCHORS];

    for (idx, corner) in corners.iter_mut().enumerate() {
        for axis in 0..3 {
            let high = (idx >> (2 - axis)) & 1 == 1;
            corner[axis] = if high {
                dims[axis] + ANCHOR_OFFSET
            } else {
                -ANCHOR_OFFSET
            };
        }
    }

    corners
}

fn distances_to(positions: &Mat<f64>, point: &[f64; 3]) -> Vec<f64> {
    (0..positions.nrows())
        .map(|i| {
            let mut dist = 0.0;
            for (j, coord) in point.iter().enumerate() {
                let diff = positions[(i, j)] - coord;
                dist += diff * diff;
            }
            dist.sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn envelope() -> RoomEnvelope {
        RoomEnvelope::new(3.5, 3.5, 3.0).unwrap()
    }

    #[test]
    fn real_samples_lead_and_are_untouched() {
        let positions = mat![[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        let values = mat![[20.0], [24.0]];

        let (aug_positions, aug_values) = augment(&positions, &values, &envelope());

        assert!(aug_positions.nrows() > positions.nrows());
        for i in 0..positions.nrows() {
            for j in 0..3 {
                assert_eq!(aug_positions[(i, j)], positions[(i, j)]);
            }
            assert_eq!(aug_values[(i, 0)], values[(i, 0)]);
        }
    }

    #[test]
    fn interior_samples_produce_exactly_edge_and_corner_anchors() {
        // Both samples are farther than the face tolerance from every face,
        // so no face anchors appear.
        let positions = mat![[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        let values = mat![[20.0], [24.0]];

        let (aug_positions, _) = augment(&positions, &values, &envelope());

        assert_eq!(
            aug_positions.nrows(),
            positions.nrows() + NUM_EDGE_ANCHORS + NUM_CORNER_ANCHORS
        );
    }

    #[test]
    fn edge_anchor_takes_mean_of_two_nearest() {
        // Two sensors placed symmetrically around the (0, 0, h/2) vertical
        // edge midpoint; the anchor must average them.
        let positions = mat![[0.5, 0.0, 1.5], [0.0, 0.5, 1.5], [3.0, 3.0, 1.5]];
        let values = mat![[10.0], [30.0], [100.0]];

        let (aug_positions, aug_values) = augment(&positions, &values, &envelope());

        let edge_row = positions.nrows();
        assert_eq!(aug_positions[(edge_row, 0)], 0.0);
        assert_eq!(aug_positions[(edge_row, 1)], 0.0);
        assert_eq!(aug_positions[(edge_row, 2)], 1.5);
        assert!((aug_values[(edge_row, 0)] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn single_sensor_never_divides_by_zero() {
        let positions = mat![[1.75, 1.75, 1.5]];
        let values = mat![[22.5]];

        let (aug_positions, aug_values) = augment(&positions, &values, &envelope());

        // Every anchor can only take the lone sensor's value.
        for i in 0..aug_positions.nrows() {
            assert_eq!(aug_values[(i, 0)], 22.5);
        }
    }

    #[test]
    fn sensor_near_face_spawns_flat_extrapolation_anchor() {
        let positions = mat![[0.05, 1.75, 1.5], [2.0, 2.0, 2.0]];
        let values = mat![[18.0], [25.0]];

        let (aug_positions, aug_values) = augment(&positions, &values, &envelope());

        // Face anchors start right after the 12 edge anchors.
        let face_row = positions.nrows() + NUM_EDGE_ANCHORS;
        assert_eq!(aug_positions[(face_row, 0)], -0.3);
        assert_eq!(aug_positions[(face_row, 1)], 1.75);
        assert_eq!(aug_positions[(face_row, 2)], 1.5);
        assert_eq!(aug_values[(face_row, 0)], 18.0);
    }

    #[test]
    fn sensor_near_three_faces_spawns_three_anchors() {
        let env = envelope();
        let positions = mat![[0.05, 0.05, 2.95], [2.0, 2.0, 1.5]];
        let values = mat![[19.0], [25.0]];

        let (aug_positions, aug_values) = augment(&positions, &values, &env);

        let face_start = positions.nrows() + NUM_EDGE_ANCHORS;
        let num_face = aug_positions.nrows() - positions.nrows() - NUM_EDGE_ANCHORS - NUM_CORNER_ANCHORS;
        assert_eq!(num_face, 3);

        // Axis order is x, then y, then z.
        assert_eq!(aug_positions[(face_start, 0)], -0.3);
        assert_eq!(aug_positions[(face_start + 1, 1)], -0.3);
        assert_eq!(aug_positions[(face_start + 2, 2)], env.height() + 0.3);
        for k in 0..3 {
            assert_eq!(aug_values[(face_start + k, 0)], 19.0);
        }
    }

    #[test]
    fn corner_anchor_takes_nearest_sensor_value() {
        let env = envelope();
        let positions = mat![[0.2, 0.2, 0.2], [3.3, 3.3, 2.8]];
        let values = mat![[15.0], [28.0]];

        let (aug_positions, aug_values) = augment(&positions, &values, &env);

        let corner_start = aug_positions.nrows() - NUM_CORNER_ANCHORS;

        // First corner is (-0.3, -0.3, -0.3), nearest to the first sensor.
        assert_eq!(aug_positions[(corner_start, 0)], -0.3);
        assert_eq!(aug_values[(corner_start, 0)], 15.0);

        // Last corner is (w+0.3, l+0.3, h+0.3), nearest to the second sensor.
        let last = aug_positions.nrows() - 1;
        assert_eq!(aug_positions[(last, 0)], env.width() + 0.3);
        assert_eq!(aug_values[(last, 0)], 28.0);
    }
}
