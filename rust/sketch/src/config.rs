// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sketch planning configuration.
//!
//! Defaults match the values used for gauging reports. Any field can be
//! overridden from `HULL_SKETCH_*` environment variables or a JSON payload.

use hull_sketch_geometry::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which band receives a point lying exactly on a shared band plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Band `i` covers `(min_i, max_i]`; the lower band keeps boundary points.
    LowerInclusive,
    /// Band `i` covers `(min_i, max_i)`; boundary points join no band.
    Exclusive,
}

/// Which side of a symmetric split is mirrored onto the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSide {
    /// The side with fewer points is mirrored onto the fuller side.
    Fewer,
    /// The side with more points is mirrored onto the sparser side.
    More,
}

/// Narrowest band width accepted by [`SketchConfig::validate`].
pub const MIN_BAND_WIDTH: f64 = 1e-3;

/// Options handed to the averaging collaborator during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AverageOptions {
    /// Average thickness gaugings; when off each point is kept as measured.
    pub average: bool,
    /// Also average gaugings taken on stiffeners.
    pub average_on_stiffeners: bool,
    /// Convergence tolerance of the averaging iterations.
    pub convergence_tolerance: f64,
    /// Length along a stiffener within which gaugings are grouped.
    pub stiffener_grouping_length: f64,
}

impl Default for AverageOptions {
    fn default() -> Self {
        Self {
            average: true,
            average_on_stiffeners: false,
            convergence_tolerance: 0.5,
            stiffener_grouping_length: 3.0,
        }
    }
}

impl AverageOptions {
    /// Convergence tolerance in effect; zero when averaging is off.
    pub fn effective_tolerance(&self) -> f64 {
        if self.average {
            self.convergence_tolerance
        } else {
            0.0
        }
    }
}

/// Sketch planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Nominal band width along the longitudinal axis.
    pub band_width: f64,
    /// Extents are padded by twice this value on each side.
    pub boundary_epsilon: f64,
    /// Maximum angle (degrees) between a patch normal and a band normal.
    pub angle_tolerance_deg: f64,
    /// Tolerance of the point-on-surface lookup for mirrored points.
    pub surface_tolerance: f64,
    /// Padding of the generic-section box as a fraction of the dominant size.
    pub generic_padding_ratio: f64,
    /// Pixels added around the highlighted region.
    pub highlight_expansion: i32,
    /// Outline thickness of the highlighted region in pixels.
    pub outline_width: i32,
    /// Principal axis along which bands are laid out.
    pub longitudinal_axis: Axis,
    /// Normal axis of the plane between mirrored sections.
    pub symmetry_axis: Axis,
    pub boundary_policy: BoundaryPolicy,
    pub source_side: SourceSide,
    /// Prefix of converted campaign and report names.
    pub converted_name_prefix: String,
    pub averaging: AverageOptions,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            band_width: 40.0,
            boundary_epsilon: 1e-6,
            angle_tolerance_deg: 1.0,
            surface_tolerance: 0.01,
            generic_padding_ratio: 0.1,
            highlight_expansion: 50,
            outline_width: 3,
            longitudinal_axis: Axis::X,
            symmetry_axis: Axis::Y,
            boundary_policy: BoundaryPolicy::LowerInclusive,
            source_side: SourceSide::Fewer,
            converted_name_prefix: "Average".into(),
            averaging: AverageOptions::default(),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_axis(name: &str, default: Axis) -> Axis {
    match std::env::var(name).ok().as_deref().map(str::trim) {
        Some("X") | Some("x") => Axis::X,
        Some("Y") | Some("y") => Axis::Y,
        Some("Z") | Some("z") => Axis::Z,
        _ => default,
    }
}

impl SketchConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            band_width: env_or("HULL_SKETCH_BAND_WIDTH", defaults.band_width),
            boundary_epsilon: env_or("HULL_SKETCH_BOUNDARY_EPSILON", defaults.boundary_epsilon),
            angle_tolerance_deg: env_or("HULL_SKETCH_ANGLE_TOLERANCE_DEG", defaults.angle_tolerance_deg),
            surface_tolerance: env_or("HULL_SKETCH_SURFACE_TOLERANCE", defaults.surface_tolerance),
            generic_padding_ratio: env_or(
                "HULL_SKETCH_GENERIC_PADDING_RATIO",
                defaults.generic_padding_ratio,
            ),
            highlight_expansion: env_or("HULL_SKETCH_HIGHLIGHT_EXPANSION", defaults.highlight_expansion),
            outline_width: env_or("HULL_SKETCH_OUTLINE_WIDTH", defaults.outline_width),
            longitudinal_axis: env_axis("HULL_SKETCH_LONGITUDINAL_AXIS", defaults.longitudinal_axis),
            symmetry_axis: env_axis("HULL_SKETCH_SYMMETRY_AXIS", defaults.symmetry_axis),
            boundary_policy: match std::env::var("HULL_SKETCH_BOUNDARY_POLICY").as_deref() {
                Ok("exclusive") => BoundaryPolicy::Exclusive,
                Ok("lower-inclusive") => BoundaryPolicy::LowerInclusive,
                _ => defaults.boundary_policy,
            },
            source_side: match std::env::var("HULL_SKETCH_SOURCE_SIDE").as_deref() {
                Ok("more") => SourceSide::More,
                Ok("fewer") => SourceSide::Fewer,
                _ => defaults.source_side,
            },
            converted_name_prefix: std::env::var("HULL_SKETCH_NAME_PREFIX")
                .unwrap_or(defaults.converted_name_prefix),
            averaging: AverageOptions {
                average: env_or("HULL_SKETCH_AVERAGE", defaults.averaging.average),
                average_on_stiffeners: env_or(
                    "HULL_SKETCH_AVERAGE_ON_STIFFENERS",
                    defaults.averaging.average_on_stiffeners,
                ),
                convergence_tolerance: env_or(
                    "HULL_SKETCH_AVERAGE_TOLERANCE",
                    defaults.averaging.convergence_tolerance,
                ),
                stiffener_grouping_length: env_or(
                    "HULL_SKETCH_STIFFENER_GROUPING_LENGTH",
                    defaults.averaging.stiffener_grouping_length,
                ),
            },
        }
    }

    /// Parse a JSON payload; missing fields keep their defaults.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the planner and converter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.band_width.is_finite() && self.band_width >= MIN_BAND_WIDTH) {
            return Err(Error::InvalidInput(format!(
                "band width must be at least {MIN_BAND_WIDTH}, got {}",
                self.band_width
            )));
        }
        for (name, value) in [
            ("boundary epsilon", self.boundary_epsilon),
            ("angle tolerance", self.angle_tolerance_deg),
            ("surface tolerance", self.surface_tolerance),
            ("generic padding ratio", self.generic_padding_ratio),
            ("average convergence tolerance", self.averaging.convergence_tolerance),
        ] {
            non_negative(name, value)?;
        }
        let grouping = self.averaging.stiffener_grouping_length;
        if !(grouping.is_finite() && grouping > 0.0) {
            return Err(Error::InvalidInput(format!(
                "stiffener grouping length must be positive, got {grouping}"
            )));
        }
        if self.longitudinal_axis == self.symmetry_axis {
            return Err(Error::InvalidInput(format!(
                "longitudinal and symmetry axes are both {}",
                self.symmetry_axis
            )));
        }
        Ok(())
    }

    /// Angle tolerance in radians.
    pub fn angle_tolerance_rad(&self) -> f64 {
        self.angle_tolerance_deg.to_radians()
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SketchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.band_width, 40.0);
        assert_eq!(config.boundary_policy, BoundaryPolicy::LowerInclusive);
        assert_eq!(config.source_side, SourceSide::Fewer);
    }

    #[test]
    fn json_overrides_and_defaults() {
        let config = SketchConfig::from_json(
            r#"{ "band_width": 25.0, "boundary_policy": "Exclusive", "symmetry_axis": "Z" }"#,
        )
        .unwrap();

        assert_eq!(config.band_width, 25.0);
        assert_eq!(config.boundary_policy, BoundaryPolicy::Exclusive);
        assert_eq!(config.symmetry_axis, Axis::Z);
        assert_eq!(config.angle_tolerance_deg, 1.0);
        assert_eq!(config.converted_name_prefix, "Average");
    }

    #[test]
    fn json_rejects_bad_values() {
        assert!(matches!(
            SketchConfig::from_json(r#"{ "band_width": 0.0 }"#),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            SketchConfig::from_json(r#"{ "longitudinal_axis": "Y" }"#),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            SketchConfig::from_json("not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        fn with(edit: impl FnOnce(&mut SketchConfig)) -> Result<()> {
            let mut config = SketchConfig::default();
            edit(&mut config);
            config.validate()
        }

        assert!(with(|c| c.band_width = 1e-18).is_err());
        assert!(with(|c| c.band_width = MIN_BAND_WIDTH).is_ok());
        assert!(with(|c| c.generic_padding_ratio = -0.1).is_err());
        assert!(with(|c| c.generic_padding_ratio = f64::NAN).is_err());
        assert!(with(|c| c.generic_padding_ratio = 0.0).is_ok());
        assert!(with(|c| c.surface_tolerance = -0.01).is_err());
        assert!(with(|c| c.surface_tolerance = f64::INFINITY).is_err());
        assert!(with(|c| c.averaging.convergence_tolerance = -0.5).is_err());
        assert!(with(|c| c.averaging.stiffener_grouping_length = 0.0).is_err());
    }

    #[test]
    fn averaging_options_from_json() {
        let config = SketchConfig::from_json(
            r#"{ "averaging": { "average": false, "stiffener_grouping_length": 2.0 } }"#,
        )
        .unwrap();

        assert!(!config.averaging.average);
        assert!(!config.averaging.average_on_stiffeners);
        assert_eq!(config.averaging.stiffener_grouping_length, 2.0);
        assert_eq!(config.averaging.convergence_tolerance, 0.5);
        assert_eq!(config.averaging.effective_tolerance(), 0.0);
        assert_eq!(AverageOptions::default().effective_tolerance(), 0.5);
    }
}
