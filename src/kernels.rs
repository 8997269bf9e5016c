/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the quintic RBF kernel and the kernel evaluation trait.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::common;
use faer::RowRef;
use serde::{Deserialize, Serialize};

/// Evaluates a radial kernel between a target and a source point.
pub trait KernelFunction {
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64;
}

/// Quintic RBF kernel with `phi(r) = (r / epsilon)^5`.
///
/// The shape parameter `epsilon` rescales the radius before the quintic
/// power is applied. Smaller values sharpen the response around each
/// anchor; larger values flatten it. The kernel is conditionally positive
/// definite, so a low-degree drift term is normally appended to the system
/// (see [`Drift`](crate::reconstruction_config::Drift)).
#[derive(Clone, Debug, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuinticKernel {
    epsilon: f64,
}

impl QuinticKernel {
    /// Creates a quintic kernel with the given shape parameter.
    pub fn new(epsilon: f64) -> Self {
        assert!(
            epsilon > 0.0,
            "Kernel shape parameter must be positive, got {}",
            epsilon
        );
        Self { epsilon }
    }

    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        (r / self.epsilon).powi(5)
    }
}

impl KernelFunction for QuinticKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        let r = common::get_distance(target, source);
        self.phi(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn phi_unscaled_is_fifth_power() {
        let kernel = QuinticKernel::new(1.0);
        assert_eq!(kernel.phi(0.0), 0.0);
        assert_eq!(kernel.phi(1.0), 1.0);
        assert_eq!(kernel.phi(2.0), 32.0);
    }

    #[test]
    fn phi_shape_parameter_rescales_radius() {
        let kernel = QuinticKernel::new(0.8);
        // (1.6 / 0.8)^5 = 2^5
        assert!((kernel.phi(1.6) - 32.0).abs() < 1e-12);
        // phi(epsilon) = 1 by construction
        assert!((kernel.phi(0.8) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn evaluate_uses_euclidean_distance() {
        let points = mat![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]];
        let kernel = QuinticKernel::new(1.0);
        let value = kernel.evaluate(points.row(0), points.row(1));
        assert!((value - 5.0f64.powi(5)).abs() < 1e-9);
    }

    #[test]
    #[should_panic]
    fn zero_epsilon_is_rejected() {
        QuinticKernel::new(0.0);
    }
}
