/////////////////////////////////////////////////////////////////////////////////////////////
//
// Orchestrates field reconstruction from sensor samples to the masked evaluation lattice.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::augment;
use crate::error::ReconstructionError;
use crate::geometry::{RoomEnvelope, SensorSample};
use crate::grid::Grid3D;
use crate::mask::ScalarField;
use crate::progress::{ProgressMsg, ProgressSink};
use crate::rbf::FieldModel;
use crate::reconstruction_config::ReconstructionSettings;
use faer::Mat;
use std::sync::Arc;

/// Smallest supported lattice resolution per axis.
///
/// Below this the lattice undersamples the room badly enough that the
/// masked field is not worth producing.
pub const MIN_RESOLUTION: usize = 8;

/// Reconstructs a masked scalar field from sensor samples using the
/// default [`ReconstructionSettings`].
///
/// See [`reconstruct_field_with`] for the full-control variant.
pub fn reconstruct_field(
    samples: &[SensorSample],
    envelope: &RoomEnvelope,
    resolution: usize,
    margin: f64,
) -> Result<ScalarField, ReconstructionError> {
    reconstruct_field_with(
        samples,
        envelope,
        resolution,
        margin,
        ReconstructionSettings::default(),
        None,
    )
}

/// Reconstructs a masked scalar field from sensor samples.
///
/// The pipeline runs in four steps:
///
/// 1. Boundary anchors are synthesized around the real samples
///    ([`augment`](crate::augment::augment)).
/// 2. A [`FieldModel`] is fitted to the combined anchor set.
/// 3. The model is evaluated over a [`Grid3D`] spanning the envelope
///    padded by `margin` on every axis.
/// 4. Lattice points outside the room volume are flagged invalid in the
///    returned [`ScalarField`].
///
/// ### Errors
/// - [`ReconstructionError::InvalidResolution`] when `resolution` is below
///   [`MIN_RESOLUTION`].
/// - [`ReconstructionError::InsufficientSamples`] when `samples` is empty
///   or the augmented anchor set has too few distinct positions.
/// - [`ReconstructionError::SingularFit`] when the dense solve cannot be
///   trusted.
pub fn reconstruct_field_with(
    samples: &[SensorSample],
    envelope: &RoomEnvelope,
    resolution: usize,
    margin: f64,
    settings: ReconstructionSettings,
    progress: Option<Arc<dyn ProgressSink>>,
) -> Result<ScalarField, ReconstructionError> {
    if resolution < MIN_RESOLUTION {
        return Err(ReconstructionError::InvalidResolution {
            resolution,
            minimum: MIN_RESOLUTION,
        });
    }

    if samples.is_empty() {
        return Err(ReconstructionError::InsufficientSamples {
            found: 0,
            required: 1,
        });
    }

    let positions = Mat::from_fn(samples.len(), 3, |i, j| match j {
        0 => samples[i].position.x,
        1 => samples[i].position.y,
        _ => samples[i].position.z,
    });
    let values = Mat::from_fn(samples.len(), 1, |i, _| samples[i].value);

    let (anchor_positions, anchor_values) = augment::augment(&positions, &values, envelope);

    if let Some(sink) = &progress {
        let num_face = anchor_positions.nrows()
            - samples.len()
            - augment::NUM_EDGE_ANCHORS
            - augment::NUM_CORNER_ANCHORS;

        sink.emit(ProgressMsg::AnchorsAdded {
            num_edge: augment::NUM_EDGE_ANCHORS,
            num_face,
            num_corner: augment::NUM_CORNER_ANCHORS,
        });
    }

    let mut builder = FieldModel::builder(anchor_positions, anchor_values).settings(settings);

    if let Some(sink) = &progress {
        builder = builder.progress_callback(sink.clone());
    }

    let model = builder.build()?;

    let grid = Grid3D::new(envelope, resolution, margin);
    let grid_values = model.evaluate(&grid.points());

    Ok(ScalarField::masked(grid, grid_values, envelope))
}
