/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the monomial basis used for drift terms in the RBF system.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;

/// Evaluates the monomial drift basis at each point.
///
/// Returns an `(n, basis_size)` matrix. Column 0 is the constant term;
/// for `degree >= 1` the following columns are the point coordinates.
pub(crate) fn evaluate_monomials(points: &Mat<f64>, degree: i32, basis_size: usize) -> Mat<f64> {
    let (n, d) = points.shape();
    let mut monomials = Mat::<f64>::zeros(n, basis_size);

    // constant column
    monomials.col_mut(0).fill(1.0);

    // linear columns
    if degree >= 1 {
        monomials.subcols_mut(1, d).copy_from(&points.as_ref());
    }

    monomials
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn run_case(points: Mat<f64>, degree: i32, expected: Mat<f64>) {
        let basis_size = expected.ncols();
        let monomials = evaluate_monomials(&points, degree, basis_size);

        assert_eq!(monomials.nrows(), expected.nrows());
        for i in 0..expected.nrows() {
            for j in 0..expected.ncols() {
                assert!((monomials[(i, j)] - expected[(i, j)]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn monomials_constant_3d() {
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        // Basis: [1]
        let expected = mat![[1.0], [1.0]];
        run_case(points, 0, expected);
    }

    #[test]
    fn monomials_linear_3d() {
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        // Basis: [1, x, y, z]
        let expected = mat![[1.0, 1.0, 2.0, 3.0], [1.0, 4.0, 5.0, 6.0]];
        run_case(points, 1, expected);
    }
}
