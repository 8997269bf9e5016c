/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for matrices, distances, and kernel matrix assembly.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::kernels::KernelFunction;
use faer::{Mat, RowRef};

/// Returns the indices that would sort the input slice.
///
/// The underlying sort is stable, so elements that compare equal keep
/// their original relative order.
#[inline(always)]
pub(crate) fn argsort<T: PartialOrd>(data: &[T]) -> Vec<usize> {
    let mut indices = (0..data.len()).collect::<Vec<_>>();
    indices.sort_by(|&i, &j| {
        data[i]
            .partial_cmp(&data[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

/// Returns the index of the minimum value. The first index wins on exact ties.
#[inline(always)]
pub(crate) fn argmin<T: Copy + PartialOrd>(data: &[T]) -> usize {
    assert!(!data.is_empty(), "Data slice cannot be empty");

    let mut min_index = 0;
    let mut min_value = data[0];

    for (idx, &value) in data.iter().enumerate().skip(1) {
        if value < min_value {
            min_value = value;
            min_index = idx;
        }
    }

    min_index
}

/// Calculates the euclidean distance between two points.
#[inline(always)]
pub(crate) fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist.sqrt()
}

/// Builds a dense kernel matrix between target and source point sets.
#[inline(always)]
pub(crate) fn get_a_matrix<K>(
    target_points: &Mat<f64>,
    source_points: &Mat<f64>,
    kernel_function: &K,
) -> Mat<f64>
where
    K: KernelFunction,
{
    let m = target_points.nrows();
    let n = source_points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(m, n);

    for j in 0..n {
        let source = source_points.row(j);

        for i in 0..m {
            let target = target_points.row(i);

            a_matrix[(i, j)] = kernel_function.evaluate(target, source);
        }
    }

    a_matrix
}

/// Builds a symmetric kernel matrix for the solver, adding a nugget on the diagonal.
#[inline(always)]
pub(crate) fn get_a_matrix_symmetric_solver<K>(
    target_points: &Mat<f64>,
    source_points: &Mat<f64>,
    kernel_function: &K,
    nugget: &f64,
) -> Mat<f64>
where
    K: KernelFunction,
{
    let m = target_points.nrows();
    let n = source_points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(m, n);

    for j in 0..n {
        let source_row = source_points.row(j);

        for i in j..m {
            let target_row = target_points.row(i);
            let mut k_val = kernel_function.evaluate(target_row, source_row);

            // Add nugget to the diagonal
            if i == j {
                k_val += nugget;
            }

            // Write both symmetric entries
            a_matrix[(i, j)] = k_val;
            a_matrix[(j, i)] = k_val;
        }
    }

    a_matrix
}
