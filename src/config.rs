use crate::foundation::core::SceneConvention;
use crate::foundation::error::{CalibError, CalibResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Which MetaHuman component a DNA file describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    #[default]
    Head,
    Body,
}

/// Significance thresholds. A live value replaces the stored one only when the difference
/// is strictly greater than its threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Vertex positions, document units.
    pub vertex_epsilon: f64,
    /// Shape-key deltas, scene units, measured before the linear modifier is removed.
    pub shape_key_delta: f64,
    /// Joint translations, document units.
    pub joint_translation: f64,
    /// Joint rotations, degrees.
    pub joint_rotation: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            vertex_epsilon: 1e-6,
            shape_key_delta: 1e-4,
            joint_translation: 1e-3,
            joint_rotation: 1e-3,
        }
    }
}

/// Pre-flight checks run by the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationChecks {
    pub vertex_counts: bool,
    pub basis_shape_keys: bool,
    pub rig_present: bool,
}

impl Default for ValidationChecks {
    fn default() -> Self {
        Self {
            vertex_counts: true,
            basis_shape_keys: true,
            rig_present: true,
        }
    }
}

/// Options controlling a calibration run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub include_meshes: bool,
    pub include_shape_keys: bool,
    pub include_bones: bool,
    pub component: Component,
    /// Live objects are named `{instance}_{dna name}`; `None` means unprefixed.
    pub instance_name: Option<String>,
    /// Scene axis/unit convention. `None` derives it from the document's translation unit.
    pub convention: Option<SceneConvention>,
    pub thresholds: Thresholds,
    /// Rotations are calibrated only for joints whose name starts with this prefix.
    pub facial_bone_prefix: String,
    /// Auxiliary scene bones with no DNA joint; never sampled.
    pub ignored_bones: Vec<String>,
    pub basis_shape_key: String,
    /// Longest `{mesh}__{channel}` shape-key name the scene accepts.
    pub shape_key_name_max_len: usize,
    pub checks: ValidationChecks,
    /// Reconcile meshes on a rayon pool. Writes stay on the calling thread.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            include_meshes: true,
            include_shape_keys: true,
            include_bones: true,
            component: Component::Head,
            instance_name: None,
            convention: None,
            thresholds: Thresholds::default(),
            facial_bone_prefix: "FACIAL_".to_string(),
            ignored_bones: Vec::new(),
            basis_shape_key: "Basis".to_string(),
            shape_key_name_max_len: 63,
            checks: ValidationChecks::default(),
            parallel: false,
            threads: None,
        }
    }
}

impl CalibrationConfig {
    /// Parse a config from a JSON reader; missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> CalibResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CalibError::config(format!("parse calibration config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CalibResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CalibError::config(format!("open calibration config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> CalibResult<()> {
        if let Some(c) = &self.convention {
            c.validate()?;
        }
        let t = &self.thresholds;
        for (name, v) in [
            ("vertex_epsilon", t.vertex_epsilon),
            ("shape_key_delta", t.shape_key_delta),
            ("joint_translation", t.joint_translation),
            ("joint_rotation", t.joint_rotation),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CalibError::config(format!(
                    "threshold {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if self.basis_shape_key.is_empty() {
            return Err(CalibError::config("basis_shape_key must not be empty"));
        }
        if self.threads == Some(0) {
            return Err(CalibError::config("threads must be > 0 when set"));
        }
        Ok(())
    }

    /// The instance prefix including its trailing underscore, or `""`.
    pub fn object_prefix(&self) -> String {
        match &self.instance_name {
            Some(name) if !name.is_empty() => format!("{name}_"),
            _ => String::new(),
        }
    }

    /// Scene object name of a DNA mesh.
    pub fn scene_mesh_name(&self, dna_mesh_name: &str) -> String {
        format!("{}{dna_mesh_name}", self.object_prefix())
    }

    /// Scene shape-key name for a channel on a mesh.
    pub fn shape_key_name(&self, dna_mesh_name: &str, channel_name: &str) -> String {
        format!("{dna_mesh_name}__{channel_name}")
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
