use crate::foundation::error::{CalibError, CalibResult};
use crate::foundation::math::{quarter_turn_x, quarter_turn_x_inv, quarter_turn_x_mat};
use serde::{Deserialize, Serialize};

pub use glam::{DMat3, DVec3};

/// Linear unit of a DNA document's translations and vertex positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationUnit {
    /// Centimeters (the MetaHuman default).
    #[default]
    Centimeters,
    /// Meters.
    Meters,
}

impl TranslationUnit {
    /// Multiplier taking document units to scene meters.
    pub fn linear_modifier(self) -> f64 {
        match self {
            Self::Centimeters => 0.01,
            Self::Meters => 1.0,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Centimeters => 0,
            Self::Meters => 1,
        }
    }

    pub(crate) fn from_u8(v: u8) -> CalibResult<Self> {
        match v {
            0 => Ok(Self::Centimeters),
            1 => Ok(Self::Meters),
            other => Err(CalibError::format(format!(
                "unknown translation unit tag {other}"
            ))),
        }
    }
}

/// Angular unit of a DNA document's joint rotations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationUnit {
    /// Degrees (the MetaHuman default).
    #[default]
    Degrees,
    /// Radians.
    Radians,
}

impl RotationUnit {
    /// Multiplier taking document angles to degrees.
    pub fn to_degrees_factor(self) -> f64 {
        match self {
            Self::Degrees => 1.0,
            Self::Radians => 180.0 / std::f64::consts::PI,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Degrees => 0,
            Self::Radians => 1,
        }
    }

    pub(crate) fn from_u8(v: u8) -> CalibResult<Self> {
        match v {
            0 => Ok(Self::Degrees),
            1 => Ok(Self::Radians),
            other => Err(CalibError::format(format!("unknown rotation unit tag {other}"))),
        }
    }
}

/// Up axis of the live scene. DNA documents are always Y-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpAxis {
    /// Same axes as the document; no rotation applied.
    YUp,
    /// Z-up scene; converted with an exact quarter turn about X.
    #[default]
    ZUp,
}

/// Axis and unit conversion between a DNA document and the live scene.
///
/// `scene = quarter_turn(dna * linear_modifier)` for points. The inverse is applied at every
/// sample point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConvention {
    /// Up axis of the live scene.
    pub up_axis: UpAxis,
    /// Multiplier from document units to scene units, must be finite and > 0.
    pub linear_modifier: f64,
}

impl Default for SceneConvention {
    fn default() -> Self {
        Self::for_unit(TranslationUnit::default())
    }
}

impl SceneConvention {
    /// Create a validated convention.
    pub fn new(up_axis: UpAxis, linear_modifier: f64) -> CalibResult<Self> {
        let c = Self {
            up_axis,
            linear_modifier,
        };
        c.validate()?;
        Ok(c)
    }

    /// No axis change, no scaling.
    pub fn identity() -> Self {
        Self {
            up_axis: UpAxis::YUp,
            linear_modifier: 1.0,
        }
    }

    /// Z-up scene in meters for a document stored in `unit`.
    pub fn for_unit(unit: TranslationUnit) -> Self {
        Self {
            up_axis: UpAxis::ZUp,
            linear_modifier: unit.linear_modifier(),
        }
    }

    pub fn validate(&self) -> CalibResult<()> {
        if !self.linear_modifier.is_finite() || self.linear_modifier <= 0.0 {
            return Err(CalibError::config(format!(
                "linear_modifier must be finite and > 0, got {}",
                self.linear_modifier
            )));
        }
        Ok(())
    }

    /// Rotate a document-axis vector into scene axes (no scaling).
    pub fn axis_to_scene(self, v: DVec3) -> DVec3 {
        match self.up_axis {
            UpAxis::YUp => v,
            UpAxis::ZUp => quarter_turn_x(v),
        }
    }

    /// Rotate a scene-axis vector into document axes (no scaling).
    pub fn axis_from_scene(self, v: DVec3) -> DVec3 {
        match self.up_axis {
            UpAxis::YUp => v,
            UpAxis::ZUp => quarter_turn_x_inv(v),
        }
    }

    /// Rotation taking document axes to scene axes.
    pub fn basis_to_scene(self) -> DMat3 {
        match self.up_axis {
            UpAxis::YUp => DMat3::IDENTITY,
            UpAxis::ZUp => quarter_turn_x_mat(),
        }
    }

    /// Document point to scene point.
    pub fn point_to_scene(self, p: DVec3) -> DVec3 {
        self.axis_to_scene(p * self.linear_modifier)
    }

    /// Scene point to document point.
    pub fn point_from_scene(self, p: DVec3) -> DVec3 {
        self.axis_from_scene(p) / self.linear_modifier
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
