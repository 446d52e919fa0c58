//! Grinding parameters: raw tool/process inputs and the geometry derived
//! from them.
//!
//! The stone is modelled as a disc of radius `r` tilted by the grind angle.
//! Cutting `grind_depth` into the surface along that tilt removes a circular
//! segment of chord height `h = depth / sin(angle)`; the chord length of that
//! segment is the widest strip the stone can take in one stroke.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GrindError, Result};

/// Stepover selector, as a fraction of the maximum grind width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceResolution {
    /// 90% of the grind width.
    Low,
    /// 60% of the grind width.
    #[default]
    Medium,
    /// 25% of the grind width.
    High,
    /// User-supplied percentage of the grind width.
    Custom {
        /// Percent of the maximum grind width (0, ∞).
        percent: f64,
    },
}

impl SurfaceResolution {
    /// Fraction of the maximum grind width used as stepover.
    pub fn fraction(self) -> Result<f64> {
        match self {
            SurfaceResolution::Low => Ok(0.9),
            SurfaceResolution::Medium => Ok(0.6),
            SurfaceResolution::High => Ok(0.25),
            SurfaceResolution::Custom { percent } => {
                if !(percent.is_finite() && percent > 0.0) {
                    return Err(GrindError::invalid(
                        "surface_resolution.percent",
                        percent,
                        "must be a positive percentage",
                    ));
                }
                Ok(percent / 100.0)
            }
        }
    }
}

/// Band half-width selector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToleranceResolution {
    /// 0.25 units.
    Low,
    /// 0.1 units.
    #[default]
    Medium,
    /// 0.01 units.
    High,
    /// User-supplied tolerance.
    Custom {
        /// Band half-width in cloud units.
        value: f64,
    },
}

impl ToleranceResolution {
    /// Band half-width in cloud units.
    pub fn value(self) -> Result<f64> {
        match self {
            ToleranceResolution::Low => Ok(0.25),
            ToleranceResolution::Medium => Ok(0.1),
            ToleranceResolution::High => Ok(0.01),
            ToleranceResolution::Custom { value } => {
                if !(value.is_finite() && value > 0.0) {
                    return Err(GrindError::invalid(
                        "tolerance_resolution.value",
                        value,
                        "must be positive",
                    ));
                }
                Ok(value)
            }
        }
    }
}

/// How much of the computed instep is trimmed off the scan boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstepOption {
    /// Trim the full instep.
    #[default]
    NoInstep,
    /// Trim a percentage of the instep.
    Custom {
        /// Percent of the instep, `>= 0`.
        percent: f64,
    },
}

impl InstepOption {
    /// Multiplier applied to the instep.
    pub fn factor(self) -> Result<f64> {
        match self {
            InstepOption::NoInstep => Ok(1.0),
            InstepOption::Custom { percent } => {
                if !(percent.is_finite() && percent >= 0.0) {
                    return Err(GrindError::invalid(
                        "instep_option.percent",
                        percent,
                        "must be a non-negative percentage",
                    ));
                }
                Ok(percent / 100.0)
            }
        }
    }
}

/// Raw tool and process inputs, as entered by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrindInputs {
    /// Stone (tool contact) diameter.
    pub stone_diameter: f64,
    /// Desired cut depth.
    pub grind_depth: f64,
    /// Tool tilt in degrees, exclusive range (0, 90).
    pub grind_angle_degrees: f64,
    /// Stepover selector.
    pub surface_resolution: SurfaceResolution,
    /// Band tolerance selector.
    pub tolerance_resolution: ToleranceResolution,
    /// Boundary line offset, as a percent of stepover.
    pub initial_stepover_factor: f64,
    /// Neighborhood radius for normal estimation.
    pub region_size: f64,
    /// Target cumulative offset depth.
    pub anomaly_height: f64,
    /// Also generate lines banded along the secondary axis.
    pub cross_cut_enabled: bool,
    /// Edge trim selector.
    pub instep_option: InstepOption,
    /// Neighbor cap for the local plane fit.
    pub max_neighbors: usize,
    /// Quantum used to group cross-axis values when averaging bands.
    /// `0` groups by exact equality.
    pub cross_snap: f64,
    /// Upper bound on the number of offset passes.
    pub max_passes: usize,
}

impl Default for GrindInputs {
    fn default() -> Self {
        Self {
            stone_diameter: 1.0,
            grind_depth: 0.1,
            grind_angle_degrees: 30.0,
            surface_resolution: SurfaceResolution::Medium,
            tolerance_resolution: ToleranceResolution::Medium,
            initial_stepover_factor: 50.0,
            region_size: 0.25,
            anomaly_height: 0.2,
            cross_cut_enabled: false,
            instep_option: InstepOption::NoInstep,
            max_neighbors: 30,
            cross_snap: 1e-6,
            max_passes: 10_000,
        }
    }
}

impl GrindInputs {
    /// Validate the inputs and derive the full parameter set.
    pub fn derive(&self) -> Result<GrindParameters> {
        derive_parameters(self)
    }
}

/// Geometric constants derived from the tool inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedParameters {
    /// `grind_depth / sin(angle)`.
    pub chord_height: f64,
    /// Half the stone diameter.
    pub stone_radius: f64,
    /// Distance from the stone center to the chord.
    pub distance_from_center: f64,
    /// Chord length of the contact segment.
    pub max_grind_width: f64,
    /// Spacing between adjacent toolpath lines.
    pub stepover: f64,
    /// Band half-width.
    pub tolerance: f64,
    /// Offset of the boundary lines from the cloud extremes.
    pub initial_stepover: f64,
    /// `stone_radius * cos(angle)`.
    pub instep: f64,
    /// Instep scaled by the instep option; the margin actually trimmed.
    pub edge_margin: f64,
    /// Normal displacement added per pass, `stone_radius * sin(angle)`.
    pub z_offset: f64,
}

impl fmt::Display for DerivedParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chord height:          {:.4}", self.chord_height)?;
        writeln!(f, "Stone radius:          {:.4}", self.stone_radius)?;
        writeln!(f, "Distance from center:  {:.4}", self.distance_from_center)?;
        writeln!(f, "Maximum grind width:   {:.4}", self.max_grind_width)?;
        writeln!(f, "Stepover:              {:.4}", self.stepover)?;
        writeln!(f, "Tolerance:             {:.4}", self.tolerance)?;
        writeln!(f, "Initial stepover:      {:.4}", self.initial_stepover)?;
        writeln!(f, "Instep:                {:.4}", self.instep)?;
        writeln!(f, "Edge margin:           {:.4}", self.edge_margin)?;
        write!(f, "Z offset per pass:     {:.4}", self.z_offset)
    }
}

/// Validated raw inputs together with the derived geometry.
///
/// Only obtainable through [`derive_parameters`], so every instance has
/// passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrindParameters {
    /// Stone diameter.
    pub stone_diameter: f64,
    /// Cut depth.
    pub grind_depth: f64,
    /// Tool tilt in degrees.
    pub grind_angle_degrees: f64,
    /// Boundary line offset as a fraction of stepover.
    pub initial_stepover_fraction: f64,
    /// Normal estimation radius.
    pub region_size: f64,
    /// Target cumulative offset depth.
    pub anomaly_height: f64,
    /// Generate cross-cut lines.
    pub cross_cut_enabled: bool,
    /// Neighbor cap for the plane fit.
    pub max_neighbors: usize,
    /// Cross-axis grouping quantum.
    pub cross_snap: f64,
    /// Pass budget.
    pub max_passes: usize,
    /// Derived geometry.
    pub derived: DerivedParameters,
}

impl GrindParameters {
    /// Spacing between adjacent lines.
    pub fn stepover(&self) -> f64 {
        self.derived.stepover
    }

    /// Band half-width.
    pub fn tolerance(&self) -> f64 {
        self.derived.tolerance
    }

    /// Per-pass normal displacement.
    pub fn z_offset(&self) -> f64 {
        self.derived.z_offset
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GrindError::invalid(name, value, "must be positive"))
    }
}

/// Validate raw inputs and derive stepover, tolerance, instep and per-pass
/// offset.
pub fn derive_parameters(inputs: &GrindInputs) -> Result<GrindParameters> {
    require_positive("stone_diameter", inputs.stone_diameter)?;
    require_positive("grind_depth", inputs.grind_depth)?;
    let angle = inputs.grind_angle_degrees;
    if !(angle.is_finite() && angle > 0.0 && angle < 90.0) {
        return Err(GrindError::invalid(
            "grind_angle_degrees",
            angle,
            "must lie strictly between 0 and 90 degrees",
        ));
    }
    require_positive("region_size", inputs.region_size)?;
    require_positive("anomaly_height", inputs.anomaly_height)?;
    let factor = inputs.initial_stepover_factor;
    if !(factor.is_finite() && factor >= 0.0) {
        return Err(GrindError::invalid(
            "initial_stepover_factor",
            factor,
            "must be a non-negative percentage",
        ));
    }
    if inputs.max_neighbors < 3 {
        return Err(GrindError::invalid(
            "max_neighbors",
            inputs.max_neighbors as f64,
            "a plane fit needs at least 3 neighbors",
        ));
    }
    if !(inputs.cross_snap.is_finite() && inputs.cross_snap >= 0.0) {
        return Err(GrindError::invalid(
            "cross_snap",
            inputs.cross_snap,
            "must be zero or positive",
        ));
    }
    if inputs.max_passes == 0 {
        return Err(GrindError::invalid("max_passes", 0.0, "must be at least 1"));
    }

    let (sin_a, cos_a) = angle.to_radians().sin_cos();
    let chord_height = inputs.grind_depth / sin_a;
    let stone_radius = inputs.stone_diameter / 2.0;
    let distance_from_center = stone_radius - chord_height;
    // Equality leaves a zero-width contact and therefore a zero stepover.
    if distance_from_center.abs() >= stone_radius {
        return Err(GrindError::GeometryOutOfRange {
            chord_height,
            stone_radius,
        });
    }
    let max_grind_width =
        2.0 * (stone_radius * stone_radius - distance_from_center * distance_from_center).sqrt();

    let stepover = inputs.surface_resolution.fraction()? * max_grind_width;
    let tolerance = inputs.tolerance_resolution.value()?;
    let initial_stepover_fraction = factor / 100.0;
    let initial_stepover = initial_stepover_fraction * stepover;
    let instep = stone_radius * cos_a;
    let edge_margin = instep * inputs.instep_option.factor()?;
    let z_offset = stone_radius * sin_a;

    let derived = DerivedParameters {
        chord_height,
        stone_radius,
        distance_from_center,
        max_grind_width,
        stepover,
        tolerance,
        initial_stepover,
        instep,
        edge_margin,
        z_offset,
    };
    tracing::debug!(
        chord_height,
        max_grind_width,
        stepover,
        tolerance,
        z_offset,
        "Derived grind parameters"
    );

    Ok(GrindParameters {
        stone_diameter: inputs.stone_diameter,
        grind_depth: inputs.grind_depth,
        grind_angle_degrees: angle,
        initial_stepover_fraction,
        region_size: inputs.region_size,
        anomaly_height: inputs.anomaly_height,
        cross_cut_enabled: inputs.cross_cut_enabled,
        max_neighbors: inputs.max_neighbors,
        cross_snap: inputs.cross_snap,
        max_passes: inputs.max_passes,
        derived,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_scenario() {
        let params = GrindInputs::default().derive().unwrap();
        let d = params.derived;
        assert_relative_eq!(d.chord_height, 0.2, epsilon = 1e-12);
        assert_relative_eq!(d.stone_radius, 0.5, epsilon = 1e-12);
        assert_relative_eq!(d.distance_from_center, 0.3, epsilon = 1e-12);
        assert_relative_eq!(d.max_grind_width, 0.8, epsilon = 1e-12);
        assert_relative_eq!(d.stepover, 0.48, epsilon = 1e-12);
        assert_relative_eq!(d.tolerance, 0.1, epsilon = 1e-12);
        assert_relative_eq!(d.z_offset, 0.25, epsilon = 1e-12);
        assert_relative_eq!(d.instep, 0.5 * 3f64.sqrt() / 2.0, epsilon = 1e-12);
        assert_relative_eq!(d.initial_stepover, 0.24, epsilon = 1e-12);
        assert_relative_eq!(d.edge_margin, d.instep, epsilon = 1e-12);
    }

    #[test]
    fn test_resolution_fractions() {
        let base = GrindInputs::default();
        let width = base.derive().unwrap().derived.max_grind_width;
        for (res, frac) in [
            (SurfaceResolution::Low, 0.9),
            (SurfaceResolution::High, 0.25),
            (SurfaceResolution::Custom { percent: 40.0 }, 0.4),
        ] {
            let inputs = GrindInputs {
                surface_resolution: res,
                ..base.clone()
            };
            let stepover = inputs.derive().unwrap().stepover();
            assert_relative_eq!(stepover, frac * width, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tolerance_selectors() {
        assert_relative_eq!(ToleranceResolution::Low.value().unwrap(), 0.25);
        assert_relative_eq!(ToleranceResolution::High.value().unwrap(), 0.01);
        assert_relative_eq!(
            ToleranceResolution::Custom { value: 0.05 }.value().unwrap(),
            0.05
        );
        assert!(ToleranceResolution::Custom { value: 0.0 }.value().is_err());
    }

    #[test]
    fn test_custom_instep_scales_margin() {
        let inputs = GrindInputs {
            instep_option: InstepOption::Custom { percent: 50.0 },
            ..Default::default()
        };
        let d = inputs.derive().unwrap().derived;
        assert_relative_eq!(d.edge_margin, d.instep * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        for inputs in [
            GrindInputs {
                stone_diameter: 0.0,
                ..Default::default()
            },
            GrindInputs {
                grind_depth: -0.1,
                ..Default::default()
            },
            GrindInputs {
                anomaly_height: 0.0,
                ..Default::default()
            },
            GrindInputs {
                region_size: f64::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                inputs.derive(),
                Err(GrindError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_angle_outside_open_interval() {
        for angle in [0.0, 90.0, -10.0, 120.0] {
            let inputs = GrindInputs {
                grind_angle_degrees: angle,
                ..Default::default()
            };
            match inputs.derive() {
                Err(GrindError::InvalidParameter { name, .. }) => {
                    assert_eq!(name, "grind_angle_degrees")
                }
                other => panic!("expected InvalidParameter, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_geometry_out_of_range() {
        // chord height 0.6 / sin(30) = 1.2 > diameter 1.0
        let inputs = GrindInputs {
            grind_depth: 0.6,
            ..Default::default()
        };
        assert!(matches!(
            inputs.derive(),
            Err(GrindError::GeometryOutOfRange { .. })
        ));
    }

    #[test]
    fn test_valid_inputs_never_produce_nan() {
        for depth in [0.01, 0.1, 0.2, 0.24] {
            for angle in [10.0, 30.0, 60.0, 89.0] {
                let inputs = GrindInputs {
                    grind_depth: depth,
                    grind_angle_degrees: angle,
                    ..Default::default()
                };
                match inputs.derive() {
                    Ok(p) => {
                        assert!(p.derived.max_grind_width > 0.0);
                        assert!(p.stepover() > 0.0);
                        assert!(p.z_offset() > 0.0);
                    }
                    Err(GrindError::GeometryOutOfRange { .. }) => {}
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
    }

    #[test]
    fn test_inputs_serialization() {
        let inputs = GrindInputs {
            surface_resolution: SurfaceResolution::Custom { percent: 35.0 },
            instep_option: InstepOption::Custom { percent: 80.0 },
            cross_cut_enabled: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&inputs).unwrap();
        assert!(json.contains("Custom"));
        let parsed: GrindInputs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inputs);
    }

    #[test]
    fn test_partial_inputs_use_defaults() {
        let parsed: GrindInputs =
            serde_json::from_str(r#"{"stone_diameter": 2.0, "grind_angle_degrees": 45.0}"#)
                .unwrap();
        assert_relative_eq!(parsed.stone_diameter, 2.0);
        assert_eq!(parsed.max_neighbors, 30);
        assert_eq!(parsed.surface_resolution, SurfaceResolution::Medium);
    }
}
