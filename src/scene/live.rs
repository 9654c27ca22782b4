use crate::foundation::core::DVec3;
use crate::foundation::error::{CalibError, CalibResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Read-only view of the scene objects a calibration run consumes.
pub trait SceneSource {
    fn meshes(&self) -> &[LiveMesh];

    fn mesh(&self, name: &str) -> Option<&LiveMesh> {
        self.meshes().iter().find(|m| m.name == name)
    }

    fn rig(&self) -> Option<&LiveRig>;
}

/// Absolute positions of one shape key, one row per mesh vertex.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveShapeKey {
    pub name: String,
    pub positions: Vec<DVec3>,
}

/// A mesh object as it currently exists in the scene, in scene axes and units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveMesh {
    pub name: String,
    pub positions: Vec<DVec3>,
    #[serde(default)]
    pub shape_keys: Vec<LiveShapeKey>,
}

impl LiveMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn shape_key(&self, name: &str) -> Option<&LiveShapeKey> {
        self.shape_keys.iter().find(|k| k.name == name)
    }
}

/// Rest pose of one bone in rig space.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveBone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Bone head, scene axes and units.
    pub head: DVec3,
    /// Rig-space orientation, intrinsic X->Y->Z Euler degrees.
    pub rotation_deg: DVec3,
}

/// An armature object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveRig {
    pub name: String,
    pub bones: Vec<LiveBone>,
}

impl LiveRig {
    pub fn bone(&self, name: &str) -> Option<&LiveBone> {
        self.bones.iter().find(|b| b.name == name)
    }
}

/// Serialized scene state: the meshes and the (optional) rig of one character instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub meshes: Vec<LiveMesh>,
    #[serde(default)]
    pub rig: Option<LiveRig>,
}

impl SceneSource for SceneSnapshot {
    fn meshes(&self) -> &[LiveMesh] {
        &self.meshes
    }

    fn rig(&self) -> Option<&LiveRig> {
        self.rig.as_ref()
    }
}

impl SceneSnapshot {
    pub fn from_reader<R: std::io::Read>(r: R) -> CalibResult<Self> {
        let snap: Self = serde_json::from_reader(r)
            .map_err(|e| CalibError::scene(format!("parse scene snapshot JSON: {e}")))?;
        snap.validate()?;
        Ok(snap)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CalibResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CalibError::scene(format!("open scene snapshot '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> CalibResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let f = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)
            .map_err(|e| CalibError::scene(format!("write scene snapshot: {e}")))
    }

    /// Structural checks that make a snapshot meaningless to sample: duplicate object
    /// names, shape keys whose length differs from their mesh, non-finite coordinates.
    pub fn validate(&self) -> CalibResult<()> {
        let mut names = HashSet::new();
        for mesh in &self.meshes {
            if !names.insert(mesh.name.as_str()) {
                return Err(CalibError::scene(format!("duplicate mesh '{}'", mesh.name)));
            }
            if !mesh.positions.iter().all(|p| p.is_finite()) {
                return Err(CalibError::scene(format!(
                    "mesh '{}' has non-finite positions",
                    mesh.name
                )));
            }
            for key in &mesh.shape_keys {
                if key.positions.len() != mesh.positions.len() {
                    return Err(CalibError::scene(format!(
                        "shape key '{}' on mesh '{}' has {} positions, mesh has {}",
                        key.name,
                        mesh.name,
                        key.positions.len(),
                        mesh.positions.len()
                    )));
                }
            }
        }
        if let Some(rig) = &self.rig {
            let mut bones = HashSet::new();
            for b in &rig.bones {
                if !bones.insert(b.name.as_str()) {
                    return Err(CalibError::scene(format!(
                        "duplicate bone '{}' in rig '{}'",
                        b.name, rig.name
                    )));
                }
                if !b.head.is_finite() || !b.rotation_deg.is_finite() {
                    return Err(CalibError::scene(format!(
                        "bone '{}' has a non-finite transform",
                        b.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut LiveMesh> {
        self.meshes.iter_mut().find(|m| m.name == name)
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut LiveBone> {
        self.rig
            .as_mut()?
            .bones
            .iter_mut()
            .find(|b| b.name == name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/live.rs"]
mod tests;
