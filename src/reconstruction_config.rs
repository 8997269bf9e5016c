/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies kernel shape, smoothing, and drift options for configuring field reconstruction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies kernel shape, smoothing, and drift options for configuring field reconstruction.
use serde::{Deserialize, Serialize};

#[doc = include_str!("../docs/drift.md")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Drift {
    None,
    Constant,
    Linear,
}

impl Drift {
    /// Degree of the monomial basis, `-1` when no drift is appended.
    pub(crate) fn degree(&self) -> i32 {
        match self {
            Drift::None => -1,
            Drift::Constant => 0,
            Drift::Linear => 1,
        }
    }

    /// Number of monomial basis columns appended to the system for the
    /// given spatial dimensionality.
    pub(crate) fn basis_size(&self, dimensions: usize) -> usize {
        let degree = self.degree();
        if degree < 0 {
            return 0;
        }

        let k = (degree + 1) as usize;
        match dimensions {
            1 => k,
            2 => k * (k + 1) / 2,
            3 => k * (k + 1) * (k + 2) / 6,
            _ => panic!("Unsupported number of dimensions: {}", dimensions),
        }
    }
}

impl Default for Drift {
    fn default() -> Self {
        Drift::Constant
    }
}

#[doc = include_str!("../docs/reconstruction_settings.md")]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReconstructionSettings {
    /// Shape parameter of the quintic kernel. The radius is divided by
    /// this value before the quintic power is applied.
    pub epsilon: f64,

    /// Smoothing parameter added to the system diagonal. A value of `0.0`
    /// enforces an exact fit to all anchor values. Larger values soften
    /// the fit and keep the solve stable for near-duplicate anchors.
    pub smoothing: f64,

    /// The polynomial drift term appended to the RBF system.
    pub drift: Drift,
}

impl ReconstructionSettings {
    /// Returns a new [`ReconstructionSettingsBuilder`] with the default
    /// parameters of the reference installation.
    pub fn builder() -> ReconstructionSettingsBuilder {
        ReconstructionSettingsBuilder::new()
    }
}

impl Default for ReconstructionSettings {
    fn default() -> Self {
        ReconstructionSettingsBuilder::new().build()
    }
}

/// A convenience builder for constructing a [`ReconstructionSettings`]
/// instance.
///
/// The builder should be called via the [`ReconstructionSettings::builder`]
/// method. See [`ReconstructionSettings`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionSettingsBuilder {
    pub epsilon: f64,
    pub smoothing: f64,
    pub drift: Drift,
}

impl ReconstructionSettingsBuilder {
    /// Creates a new builder with the default parameters.
    fn new() -> Self {
        Self {
            epsilon: 0.8,
            smoothing: 0.05,
            drift: Drift::Constant,
        }
    }

    /// Sets the kernel shape parameter.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the smoothing value added to the system diagonal.
    pub fn smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the drift term.
    pub fn drift(mut self, drift: Drift) -> Self {
        self.drift = drift;
        self
    }

    /// Builds and returns a [`ReconstructionSettings`] instance.
    pub fn build(self) -> ReconstructionSettings {
        ReconstructionSettings {
            epsilon: self.epsilon,
            smoothing: self.smoothing,
            drift: self.drift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_installation() {
        let settings = ReconstructionSettings::default();
        assert_eq!(settings.epsilon, 0.8);
        assert_eq!(settings.smoothing, 0.05);
        assert_eq!(settings.drift, Drift::Constant);
    }

    #[test]
    fn builder_overrides_fields() {
        let settings = ReconstructionSettings::builder()
            .epsilon(1.5)
            .smoothing(0.0)
            .drift(Drift::Linear)
            .build();

        assert_eq!(settings.epsilon, 1.5);
        assert_eq!(settings.smoothing, 0.0);
        assert_eq!(settings.drift, Drift::Linear);
    }

    #[test]
    fn basis_sizes_in_three_dimensions() {
        assert_eq!(Drift::None.basis_size(3), 0);
        assert_eq!(Drift::Constant.basis_size(3), 1);
        assert_eq!(Drift::Linear.basis_size(3), 4);
    }
}
