/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the field model, dense system assembly and solve, and model persistence.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    common,
    error::ReconstructionError,
    kernels::QuinticKernel,
    polynomials,
    progress::{ProgressMsg, ProgressSink},
    reconstruction_config::ReconstructionSettings,
};

use faer::linalg::solvers::Solve;
use faer::{concat, Mat};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

/// Positions closer than this are treated as the same anchor when counting
/// distinct positions before a fit.
const DISTINCT_TOLERANCE: f64 = 1e-9;

/// Minimum number of pairwise-distinct anchor positions a fit requires.
const MIN_DISTINCT_ANCHORS: usize = 4;

/// Largest relative backward error of the dense solve that is still
/// accepted as a trustworthy fit.
const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Number of target points each worker evaluates between progress updates.
const EVAL_CHUNK_SIZE: usize = 1024;

/// Coefficients of a solved RBF system.
///
/// After fitting, a field model produces a set of coefficients that define
/// the contribution of each basis function. These coefficients are stored
/// in this struct and used during evaluation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Coefficients {
    /// Coefficients associated with the RBF centers (anchor points).
    pub point_coefficients: Mat<f64>,

    /// Coefficients associated with the polynomial drift term, if present.
    ///
    /// This is `None` when no polynomial component was included in the
    /// system, or `Some(matrix)` otherwise.
    pub poly_coefficients: Option<Mat<f64>>,
}

impl Coefficients {
    /// Creates a new [`Coefficients`] instance from the given RBF and
    /// optional polynomial coefficients.
    pub(crate) fn new(point_coefficients: Mat<f64>, poly_coefficients: Option<Mat<f64>>) -> Self {
        Self {
            point_coefficients,
            poly_coefficients,
        }
    }
}

/// Convenience builder for constructing a [`FieldModel`].
///
/// This builder provides an ergonomic way to configure and create a model
/// instance from input data, reconstruction settings, and an optional
/// progress sink. Supplies sensible defaults and allows incremental
/// configuration.
///
/// The builder should be called via the [`FieldModel::builder`] method.
///
/// See [`FieldModel`] for details on each field.
pub struct FieldModelBuilder {
    points: Mat<f64>,
    point_values: Mat<f64>,
    settings: ReconstructionSettings,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl FieldModelBuilder {
    /// Creates a new builder with the required inputs:
    /// - `points`: coordinates of the anchor points.
    /// - `point_values`: corresponding scalar values at each point.
    ///
    /// Default [`ReconstructionSettings`] are used unless overridden.
    fn new(points: Mat<f64>, point_values: Mat<f64>) -> Self {
        Self {
            points,
            point_values,
            settings: ReconstructionSettings::default(),
            progress_callback: None,
        }
    }

    /// Sets custom kernel, smoothing, and drift settings.
    pub fn settings(mut self, settings: ReconstructionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Optional callback for reporting solver progress.
    ///
    /// Skipped during serialization.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Fits the system and returns the solved [`FieldModel`].
    pub fn build(self) -> Result<FieldModel, ReconstructionError> {
        FieldModel::new(
            self.points,
            self.point_values,
            self.settings,
            self.progress_callback,
        )
    }
}

#[doc = include_str!("../docs/field_model.md")]
#[derive(Serialize, Deserialize, Debug)]
pub struct FieldModel {
    /// Coordinates of the anchor points the model was fitted to.
    pub points: Mat<f64>,

    /// Scalar values at each anchor point.
    pub point_values: Mat<f64>,

    /// Solved coefficients for the RBF and polynomial terms.
    pub coefficients: Coefficients,

    /// Kernel, smoothing, and drift configuration used for the fit.
    settings: ReconstructionSettings,

    /// The quintic kernel built from the configured shape parameter.
    kernel: QuinticKernel,

    /// Optional callback for reporting solver progress.
    /// Skipped during serialization.
    #[serde(skip, default)]
    pub(crate) progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl FieldModel {
    /// Creates a new [`FieldModelBuilder`] for the given anchor points and
    /// values.
    ///
    /// This is the way to construct a model.
    pub fn builder(points: Mat<f64>, point_values: Mat<f64>) -> FieldModelBuilder {
        FieldModelBuilder::new(points, point_values)
    }

    fn new(
        points: Mat<f64>,
        point_values: Mat<f64>,
        settings: ReconstructionSettings,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self, ReconstructionError> {
        let solver_start = Instant::now();

        assert_eq!(points.ncols(), 3, "Anchor positions must be (n, 3)");
        assert_eq!(
            points.nrows(),
            point_values.nrows(),
            "Positions and values must have the same number of rows"
        );
        assert_eq!(point_values.ncols(), 1, "Values must be a single column");

        let num_distinct = count_distinct_positions(&points);
        if num_distinct < MIN_DISTINCT_ANCHORS {
            return Err(ReconstructionError::InsufficientSamples {
                found: num_distinct,
                required: MIN_DISTINCT_ANCHORS,
            });
        }

        let kernel = QuinticKernel::new(settings.epsilon);

        let a_matrix =
            common::get_a_matrix_symmetric_solver(&points, &points, &kernel, &settings.smoothing);

        let basis_size = settings.drift.basis_size(points.ncols());

        let lhs: Mat<f64>;
        let rhs: Mat<f64>;

        if basis_size != 0 {
            let poly_matrix =
                polynomials::evaluate_monomials(&points, settings.drift.degree(), basis_size);

            let poly_t = poly_matrix.transpose().to_owned();

            let lhs_zeros = Mat::<f64>::zeros(basis_size, basis_size);

            lhs = concat![[a_matrix, poly_matrix], [poly_t, lhs_zeros]];
            rhs = concat![[&point_values], [Mat::<f64>::zeros(basis_size, 1)]];
        } else {
            lhs = a_matrix;
            rhs = point_values.clone();
        }

        let lu = lhs.partial_piv_lu();

        let all_coefficients = lu.solve(&rhs);

        let finite = (0..all_coefficients.nrows()).all(|i| all_coefficients[(i, 0)].is_finite());
        let residual = solve_residual(&lhs, &all_coefficients, &rhs);

        if !finite || residual > RESIDUAL_TOLERANCE {
            return Err(ReconstructionError::SingularFit { residual });
        }

        let coefficients = if basis_size != 0 {
            let split = all_coefficients.split_at_row(points.nrows());
            Coefficients::new(split.0.to_owned(), Some(split.1.to_owned()))
        } else {
            Coefficients::new(all_coefficients, None)
        };

        let model = Self {
            points,
            point_values,
            coefficients,
            settings,
            kernel,
            progress_callback,
        };

        let solver_duration = solver_start.elapsed();

        if let Some(sink) = &model.progress_callback {
            let msg = format!(
                "Took {:?} to solve the field for {} anchors using the following settings:\n\
                Epsilon: {}, Smoothing: {}, Drift: {:?}",
                solver_duration,
                model.points.nrows(),
                model.settings.epsilon,
                model.settings.smoothing,
                model.settings.drift,
            );

            sink.emit(ProgressMsg::Message { message: msg });
        }

        Ok(model)
    }

    /// The settings the model was fitted with.
    pub fn settings(&self) -> &ReconstructionSettings {
        &self.settings
    }

    /// Evaluates the model at `target_points`.
    ///
    /// Target chunks are evaluated in parallel and each finished chunk
    /// emits an [`ProgressMsg::EvaluationProgress`] event when a progress
    /// sink is attached.
    ///
    /// ### Returns
    /// A `(n_targets x 1)` matrix of interpolated values in target order.
    pub fn evaluate(&self, target_points: &Mat<f64>) -> Mat<f64> {
        assert_eq!(target_points.ncols(), 3, "Target points must be (n, 3)");

        let total = target_points.nrows();
        let evaluated = AtomicUsize::new(0);

        let mut values = vec![0.0f64; total];

        values
            .par_chunks_mut(EVAL_CHUNK_SIZE)
            .enumerate()
            .for_each(|(chunk_idx, chunk)| {
                let offset = chunk_idx * EVAL_CHUNK_SIZE;

                let chunk_targets = target_points.subrows(offset, chunk.len()).to_owned();

                let eval_a_matrix =
                    common::get_a_matrix(&chunk_targets, &self.points, &self.kernel);

                let mut interpolated = eval_a_matrix * &self.coefficients.point_coefficients;

                if let Some(poly) = &self.coefficients.poly_coefficients {
                    let monomials = polynomials::evaluate_monomials(
                        &chunk_targets,
                        self.settings.drift.degree(),
                        poly.nrows(),
                    );

                    interpolated += monomials * poly;
                }

                for (local_idx, value) in chunk.iter_mut().enumerate() {
                    *value = interpolated[(local_idx, 0)];
                }

                if let Some(sink) = &self.progress_callback {
                    let done = evaluated.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
                    sink.emit(ProgressMsg::EvaluationProgress {
                        evaluated: done,
                        total,
                    });
                }
            });

        Mat::from_fn(total, 1, |i, _| values[i])
    }

    /// Evaluates the model **at the original anchor points**.
    ///
    /// Useful for convergence checks and diagnostics.
    ///
    /// - When `add_nugget = true`, the diagonal smoothing term is added
    ///   back so the evaluated values match the anchor values to within
    ///   the solve residual.
    /// - When `add_nugget = false`, you observe the smoothed fit.
    ///
    /// ### Returns
    /// A `(n_anchors x 1)` matrix of values at the anchor sites.
    pub fn evaluate_at_source(&self, add_nugget: bool) -> Mat<f64> {
        let mut values = self.evaluate(&self.points);

        if add_nugget {
            for i in 0..values.nrows() {
                values[(i, 0)] +=
                    self.coefficients.point_coefficients[(i, 0)] * self.settings.smoothing;
            }
        }

        values
    }

    /// Saves the model to a JSON file at `path`.
    ///
    /// The on-disk format is versioned via `JSON_FORMAT_NAME` and `JSON_VERSION`.
    /// Files produced here are intended to be read back with [`FieldModel::load_model`].
    ///
    /// ### Errors
    /// - Returns `ModelIOError::{Create, Serialize, Flush}` on I/O or serialization
    ///   failures.
    ///
    /// ### Example
    /// ```no_run
    /// # use roomfield::FieldModel;
    /// # let model: FieldModel = unimplemented!();
    /// model.save_model("field_model.json")?;
    /// # Ok::<(), roomfield::ModelIOError>(())
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> ModelIOResult<()> {
        let path_ref = path.as_ref();
        let file = File::create(path_ref).map_err(|e| ModelIOError::Create {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        let mut w = BufWriter::new(file);

        let env = JsonEnvelopeRef {
            format: JSON_FORMAT_NAME,
            version: JSON_VERSION,
            model: self,
        };

        serde_json::to_writer_pretty(&mut w, &env).map_err(|e| ModelIOError::Serialize {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        w.flush().map_err(|e| ModelIOError::Flush {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Loads a model previously written by [`FieldModel::save_model`].
    ///
    /// ### Validation
    /// - Fails if `format != JSON_FORMAT_NAME` or `version != JSON_VERSION`.
    ///
    /// ### Errors
    /// - Returns `ModelIOError::{Open, Parse, FormatMismatch, VersionMismatch}` as appropriate.
    ///
    /// ### Example
    /// ```no_run
    /// # use roomfield::FieldModel;
    /// let model = FieldModel::load_model("field_model.json", None)?;
    /// # Ok::<(), roomfield::ModelIOError>(())
    /// ```
    pub fn load_model<P: AsRef<Path>>(
        path: P,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> ModelIOResult<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|e| ModelIOError::Open {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        let reader = BufReader::new(file);

        let env: JsonEnvelopeOwned<Self> =
            serde_json::from_reader(reader).map_err(|e| ModelIOError::Parse {
                path: path_ref.to_path_buf(),
                source: e,
            })?;

        if env.format != JSON_FORMAT_NAME {
            return Err(ModelIOError::FormatMismatch {
                path: path_ref.to_path_buf(),
                found: env.format,
                expected: JSON_FORMAT_NAME,
            });
        }

        if env.version != JSON_VERSION {
            return Err(ModelIOError::VersionMismatch {
                path: path_ref.to_path_buf(),
                found: env.version,
                expected: JSON_VERSION,
            });
        }

        let mut model = env.model;
        model.progress_callback = progress_callback;

        Ok(model)
    }
}

/// Number of pairwise-distinct positions, counted greedily in row order.
fn count_distinct_positions(points: &Mat<f64>) -> usize {
    let mut representatives: Vec<usize> = Vec::new();

    for i in 0..points.nrows() {
        let is_new = representatives
            .iter()
            .all(|&r| common::get_distance(points.row(i), points.row(r)) > DISTINCT_TOLERANCE);

        if is_new {
            representatives.push(i);
        }
    }

    representatives.len()
}

/// Relative backward error of a solve, `max|Ax - b| / max|b|`.
///
/// Falls back to the absolute error when the right-hand side is all zeros.
fn solve_residual(lhs: &Mat<f64>, solution: &Mat<f64>, rhs: &Mat<f64>) -> f64 {
    let reconstructed = lhs * solution;

    let mut max_err = 0.0f64;
    let mut max_rhs = 0.0f64;

    for i in 0..rhs.nrows() {
        max_err = max_err.max((reconstructed[(i, 0)] - rhs[(i, 0)]).abs());
        max_rhs = max_rhs.max(rhs[(i, 0)].abs());
    }

    if max_rhs > 0.0 {
        max_err / max_rhs
    } else {
        max_err
    }
}

const JSON_FORMAT_NAME: &str = "roomfield.json";
const JSON_VERSION: u32 = 1;

/// Borrowing envelope for SAVE (no clone of the model).
#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: &'a T,
}

/// Owning envelope for LOAD (generic over the concrete model).
#[derive(Serialize, Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

type ModelIOResult<T> = std::result::Result<T, ModelIOError>;

/// Errors that can occur when saving or loading a [`FieldModel`].
///
/// This is the error type returned by [`FieldModel::save_model`] and
/// [`FieldModel::load_model`], wrapping lower-level I/O and JSON
/// serialization issues as well as format/version validation failures.
#[derive(Debug)]
pub enum ModelIOError {
    /// Failed to create the target file before writing a model.
    Create { path: PathBuf, source: io::Error },
    /// Failed to open an existing model file for reading.
    Open { path: PathBuf, source: io::Error },
    /// Low-level write error while streaming the model to disk.
    Write { path: PathBuf, source: io::Error },
    /// Failed to flush buffered output when finishing a write.
    Flush { path: PathBuf, source: io::Error },
    /// Error serializing the in-memory model to JSON.
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Error parsing JSON when reading a model from disk.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The JSON `format` field does not match the expected model format.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },
    /// The JSON `version` field does not match the supported version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for ModelIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIOError::Create { path, source } => {
                write!(f, "creating {}: {}", path.display(), source)
            }
            ModelIOError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            ModelIOError::Write { path, source } => {
                write!(f, "writing {}: {}", path.display(), source)
            }
            ModelIOError::Flush { path, source } => {
                write!(f, "flushing {}: {}", path.display(), source)
            }
            ModelIOError::Serialize { path, source } => {
                write!(f, "serializing JSON to {}: {}", path.display(), source)
            }
            ModelIOError::Parse { path, source } => {
                write!(f, "parsing JSON in {}: {}", path.display(), source)
            }
            ModelIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
        }
    }
}

impl Error for ModelIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelIOError::Create { source, .. }
            | ModelIOError::Open { source, .. }
            | ModelIOError::Write { source, .. }
            | ModelIOError::Flush { source, .. } => Some(source),
            ModelIOError::Serialize { source, .. } | ModelIOError::Parse { source, .. } => {
                Some(source)
            }
            ModelIOError::FormatMismatch { .. } | ModelIOError::VersionMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconstruction_config::Drift;
    use faer::mat;

    fn anchors() -> (Mat<f64>, Mat<f64>) {
        let points = mat![
            [0.1, 0.2, 0.3],
            [2.9, 0.4, 0.5],
            [0.6, 3.1, 0.7],
            [0.8, 0.9, 2.7],
            [2.3, 2.6, 2.1],
        ];
        let values = mat![[18.0], [21.5], [19.2], [23.0], [20.4]];
        (points, values)
    }

    #[test]
    fn exact_fit_reproduces_anchor_values() {
        let (points, values) = anchors();

        let settings = ReconstructionSettings::builder().smoothing(0.0).build();
        let model = FieldModel::builder(points, values.clone())
            .settings(settings)
            .build()
            .unwrap();

        let fitted = model.evaluate(&model.points);

        for i in 0..values.nrows() {
            assert!((fitted[(i, 0)] - values[(i, 0)]).abs() < 1e-6);
        }
    }

    #[test]
    fn smoothed_fit_recovers_anchors_with_nugget_restored() {
        let (points, values) = anchors();

        let model = FieldModel::builder(points, values.clone()).build().unwrap();

        let fitted = model.evaluate_at_source(true);

        for i in 0..values.nrows() {
            assert!((fitted[(i, 0)] - values[(i, 0)]).abs() < 1e-6);
        }
    }

    #[test]
    fn constant_field_survives_smoothing() {
        let (points, _) = anchors();
        let values = Mat::from_fn(points.nrows(), 1, |_, _| 21.0);

        let model = FieldModel::builder(points, values).build().unwrap();

        let targets = mat![[1.5, 1.5, 1.5], [0.0, 0.0, 0.0], [3.0, 3.0, 3.0]];
        let interpolated = model.evaluate(&targets);

        for i in 0..targets.nrows() {
            assert!((interpolated[(i, 0)] - 21.0).abs() < 1e-9);
        }
    }

    #[test]
    fn linear_drift_reproduces_linear_field() {
        let (points, _) = anchors();
        let values = Mat::from_fn(points.nrows(), 1, |i, _| {
            1.0 + 2.0 * points[(i, 0)] - 0.5 * points[(i, 2)]
        });

        let settings = ReconstructionSettings::builder()
            .drift(Drift::Linear)
            .build();
        let model = FieldModel::builder(points, values)
            .settings(settings)
            .build()
            .unwrap();

        let targets = mat![[1.0, 2.0, 1.0], [2.5, 0.5, 2.0]];
        let interpolated = model.evaluate(&targets);

        for i in 0..targets.nrows() {
            let expected = 1.0 + 2.0 * targets[(i, 0)] - 0.5 * targets[(i, 2)];
            assert!((interpolated[(i, 0)] - expected).abs() < 1e-8);
        }
    }

    #[test]
    fn near_duplicate_positions_count_once() {
        let points = mat![
            [0.1, 0.2, 0.3],
            [0.1, 0.2, 0.3 + 1e-12],
            [2.9, 0.4, 0.5],
            [0.6, 3.1, 0.7],
        ];

        assert_eq!(count_distinct_positions(&points), 3);
    }

    #[test]
    fn too_few_distinct_anchors_is_rejected() {
        let points = mat![
            [0.1, 0.2, 0.3],
            [0.1, 0.2, 0.3],
            [2.9, 0.4, 0.5],
            [0.6, 3.1, 0.7],
        ];
        let values = Mat::from_fn(points.nrows(), 1, |_, _| 20.0);

        let err = FieldModel::builder(points, values).build().unwrap_err();

        assert_eq!(
            err,
            ReconstructionError::InsufficientSamples {
                found: 3,
                required: 4,
            }
        );
    }

    #[test]
    fn duplicate_rows_without_smoothing_are_singular() {
        // Four distinct positions pass the sample check, but the repeated
        // row makes the unsmoothed system rank deficient.
        let points = mat![
            [0.1, 0.2, 0.3],
            [0.1, 0.2, 0.3],
            [2.9, 0.4, 0.5],
            [0.6, 3.1, 0.7],
            [0.8, 0.9, 2.7],
        ];
        let values = Mat::from_fn(points.nrows(), 1, |i, _| 18.0 + i as f64);

        let settings = ReconstructionSettings::builder().smoothing(0.0).build();
        let err = FieldModel::builder(points, values)
            .settings(settings)
            .build()
            .unwrap_err();

        assert!(matches!(err, ReconstructionError::SingularFit { .. }));
    }

    #[test]
    fn save_load_round_trip_preserves_evaluation() {
        let (points, values) = anchors();
        let model = FieldModel::builder(points, values).build().unwrap();

        let targets = mat![[1.5, 1.5, 1.5], [0.2, 3.0, 2.4]];
        let before = model.evaluate(&targets);

        let path = std::env::temp_dir().join("roomfield_model_round_trip.json");
        model.save_model(&path).unwrap();

        let loaded = FieldModel::load_model(&path, None).unwrap();
        let after = loaded.evaluate(&targets);

        for i in 0..targets.nrows() {
            assert!((before[(i, 0)] - after[(i, 0)]).abs() < 1e-12);
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_rejects_foreign_format() {
        let path = std::env::temp_dir().join("roomfield_model_bad_format.json");
        std::fs::write(&path, r#"{"format": "other.json", "version": 1}"#).unwrap();

        let err = FieldModel::load_model(&path, None).unwrap_err();

        // A foreign format either fails validation or fails to parse as a
        // model, depending on the missing fields.
        assert!(matches!(
            err,
            ModelIOError::FormatMismatch { .. } | ModelIOError::Parse { .. }
        ));

        std::fs::remove_file(&path).unwrap();
    }
}
