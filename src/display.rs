/////////////////////////////////////////////////////////////////////////////////////////////
//
// Maps field kinds to the visualization profiles used when rendering reconstructions.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// The physical quantity a reconstructed field represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
}

/// Rendering hints for a field kind: the clamp range of the color axis,
/// the color scale name, and whether the scale runs reversed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayProfile {
    /// Inclusive `(min, max)` range the color axis is clamped to.
    pub value_range: (f64, f64),
    /// Name of the color scale.
    pub color_scale: &'static str,
    /// Whether the color scale runs from high to low.
    pub reversed: bool,
}

impl FieldKind {
    /// The rendering profile for this field kind.
    pub fn profile(&self) -> DisplayProfile {
        match self {
            FieldKind::Temperature => DisplayProfile {
                value_range: (-40.0, 150.0),
                color_scale: "jet",
                reversed: false,
            },
            FieldKind::Humidity => DisplayProfile {
                value_range: (0.0, 100.0),
                color_scale: "Blues",
                reversed: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_profile_spans_the_sensor_range() {
        let profile = FieldKind::Temperature.profile();
        assert_eq!(profile.value_range, (-40.0, 150.0));
        assert_eq!(profile.color_scale, "jet");
        assert!(!profile.reversed);
    }

    #[test]
    fn humidity_profile_is_reversed_blues() {
        let profile = FieldKind::Humidity.profile();
        assert_eq!(profile.value_range, (0.0, 100.0));
        assert_eq!(profile.color_scale, "Blues");
        assert!(profile.reversed);
    }
}
