/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for room-scale field reconstruction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Room-scale scalar field reconstruction.
//!
//! Environmental monitoring installations measure a room with a small,
//! fixed set of wall, floor, and ceiling sensors. A raw interpolation of
//! those readings behaves badly near the boundary: the field overshoots
//! between sensors and extrapolates wildly in the corners where no sensor
//! sits.
//!
//! This crate reconstructs a dense, physically plausible scalar field
//! (temperature, humidity) from such sparse readings by combining three
//! steps:
//!
//! - **Boundary augmentation** - synthetic anchors at the room's edge
//!   midpoints, beyond faces that have a sensor close by, and outside all
//!   eight corners keep the interpolant tame where real data runs out.
//! - **Quintic RBF interpolation** - a dense radial basis function system
//!   with a polynomial drift term and diagonal smoothing, solved with a
//!   direct LU factorisation. At this anchor count a direct solve is
//!   exact, simple, and fast.
//! - **Volume masking** - the model is evaluated over a regular lattice
//!   padded beyond the room, then every lattice point outside the room
//!   volume is flagged invalid while keeping its extrapolated value.
//!
//! Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear
//! algebra, avoiding complex build dependencies.
//!
//! # Examples
//!
//! ```
//! use roomfield::{reconstruct_field, sensor_layout, Point3D, RoomEnvelope, SensorSample};
//!
//! // The reference installation: a 3.5 x 3.5 x 3.0 m room with the
//! // fixed 20-sensor layout.
//! let envelope = RoomEnvelope::default();
//! let layout = sensor_layout(&envelope);
//!
//! // Pretend every sensor read the same temperature.
//! let samples: Vec<SensorSample> = (0..layout.nrows())
//!     .map(|i| {
//!         SensorSample::new(
//!             Point3D::new(layout[(i, 0)], layout[(i, 1)], layout[(i, 2)]),
//!             21.0,
//!         )
//!     })
//!     .collect();
//!
//! // Reconstruct on a 20^3 lattice padded by 0.3 m on every axis.
//! let field = reconstruct_field(&samples, &envelope, 20, 0.3).unwrap();
//!
//! // A uniform room stays uniform after reconstruction.
//! let centre = field.grid().nearest_index(&[1.75, 1.75, 1.5]);
//! let value = field.value_at(centre).unwrap();
//! assert!((value - 21.0).abs() < 1e-3);
//! ```
pub mod reconstruction_config;

mod common;

mod rbf;

mod augment;

mod polynomials;

mod kernels;

mod geometry;

mod grid;

mod mask;

mod query;

pub mod progress;

pub mod display;

mod error;

pub use {
    augment::augment,
    error::ReconstructionError,
    geometry::{sensor_layout, Point3D, RoomEnvelope, SensorSample},
    grid::Grid3D,
    kernels::{KernelFunction, QuinticKernel},
    mask::ScalarField,
    query::{reconstruct_field, reconstruct_field_with, MIN_RESOLUTION},
    rbf::{Coefficients, FieldModel, FieldModelBuilder, ModelIOError},
};
