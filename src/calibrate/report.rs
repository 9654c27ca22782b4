use serde::Serialize;
use std::fmt;

/// Remediation a host can offer for a failed validation. The host maps it to its own command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixAction {
    /// Revert the mesh to the DNA vertex layout.
    RestoreTopology { mesh: String },
    /// Add a basis shape key built from the current mesh.
    AddBasisShapeKey { mesh: String },
    /// Assign or import the rig the DNA joints belong to.
    AssignRig,
    /// Select or import the meshes to calibrate.
    SelectMeshes,
}

/// A per-item condition that skipped part of the calibration without aborting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationWarning {
    MissingSceneMesh { mesh: String },
    NoShapeKeys { mesh: String },
    ShapeKeyNameTooLong { mesh: String, shape_key: String, max_len: usize },
    MissingShapeKey { mesh: String, shape_key: String },
    UnmappedBone { bone: String },
    MissingRig,
    SideDataExport { message: String },
}

impl fmt::Display for CalibrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSceneMesh { mesh } => {
                write!(f, "mesh object '{mesh}' not found; shape keys skipped")
            }
            Self::NoShapeKeys { mesh } => write!(f, "mesh object '{mesh}' has no shape keys"),
            Self::ShapeKeyNameTooLong {
                mesh,
                shape_key,
                max_len,
            } => write!(
                f,
                "shape key '{shape_key}' on '{mesh}' exceeds {max_len} characters; skipped"
            ),
            Self::MissingShapeKey { mesh, shape_key } => {
                write!(f, "shape key '{shape_key}' not found on '{mesh}'; skipped")
            }
            Self::UnmappedBone { bone } => {
                write!(f, "bone '{bone}' has no DNA joint; ignored")
            }
            Self::MissingRig => write!(f, "no rig in the scene; bones skipped"),
            Self::SideDataExport { message } => write!(f, "side data export failed: {message}"),
        }
    }
}

/// Counts of what a run actually changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CalibrationStats {
    pub meshes_calibrated: usize,
    pub vertices_changed: usize,
    pub targets_rewritten: usize,
    /// Largest sparse-set size written to any target.
    pub largest_target: usize,
    pub joint_translations_changed: usize,
    pub joint_rotations_changed: usize,
}

/// Result of [`crate::calibrate::Calibrator::run`].
///
/// A validation failure is a report with `success == false`, not an error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub success: bool,
    pub title: String,
    pub message: String,
    pub fix: Option<FixAction>,
    pub warnings: Vec<CalibrationWarning>,
    pub stats: CalibrationStats,
}

impl CalibrationReport {
    pub(crate) fn succeeded(warnings: Vec<CalibrationWarning>, stats: CalibrationStats) -> Self {
        Self {
            success: true,
            title: "Success".to_string(),
            message: "Calibration successful.".to_string(),
            fix: None,
            warnings,
            stats,
        }
    }
}
