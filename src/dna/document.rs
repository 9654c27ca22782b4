use crate::foundation::core::{DVec3, RotationUnit, TranslationUnit};
use crate::foundation::error::{CalibError, CalibResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Parallel X/Y/Z component arrays, the layout DNA uses for positions, deltas and joint
/// transforms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3Array {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub zs: Vec<f32>,
}

impl Vector3Array {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            xs: Vec::with_capacity(n),
            ys: Vec::with_capacity(n),
            zs: Vec::with_capacity(n),
        }
    }

    pub fn from_rows(rows: &[[f32; 3]]) -> Self {
        let mut out = Self::with_capacity(rows.len());
        for r in rows {
            out.push(*r);
        }
        out
    }

    pub fn push(&mut self, r: [f32; 3]) {
        self.xs.push(r[0]);
        self.ys.push(r[1]);
        self.zs.push(r[2]);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// `true` when all three component arrays have the same length.
    pub fn is_parallel(&self) -> bool {
        self.xs.len() == self.ys.len() && self.xs.len() == self.zs.len()
    }

    pub fn get(&self, i: usize) -> Option<DVec3> {
        Some(DVec3::new(
            f64::from(*self.xs.get(i)?),
            f64::from(*self.ys.get(i)?),
            f64::from(*self.zs.get(i)?),
        ))
    }

    pub fn rows(&self) -> Vec<[f32; 3]> {
        (0..self.len())
            .map(|i| [self.xs[i], self.ys[i], self.zs[i]])
            .collect()
    }
}

/// Document-wide metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub translation_unit: TranslationUnit,
    pub rotation_unit: RotationUnit,
    pub lod_count: u16,
}

/// Joint and naming tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub joint_names: Vec<String>,
    /// Parent joint index per joint; a root joint is its own parent.
    pub joint_parents: Vec<u16>,
    pub neutral_joint_translations: Vector3Array,
    /// Parent-local rotations, intrinsic X->Y->Z, in the descriptor's rotation unit.
    pub neutral_joint_rotations: Vector3Array,
    pub blend_shape_channel_names: Vec<String>,
    pub mesh_names: Vec<String>,
    pub lod_mesh_indices: Vec<Vec<u16>>,
    pub lod_blend_shape_channel_indices: Vec<Vec<u16>>,
}

/// Sparse per-vertex deltas of one blend-shape channel on one mesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendShapeTarget {
    pub channel_index: u16,
    pub vertex_indices: Vec<u32>,
    pub deltas: Vector3Array,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub positions: Vector3Array,
    pub blend_shape_targets: Vec<BlendShapeTarget>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub meshes: Vec<Mesh>,
}

/// The calibration-relevant subset of a DNA rig description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DnaDocument {
    pub descriptor: Descriptor,
    pub definition: Definition,
    pub geometry: Geometry,
}

/// Every structural violation found by [`DnaDocument::check`].
#[derive(Debug, Clone)]
pub struct StructureErrors {
    pub errors: Vec<String>,
}

impl fmt::Display for StructureErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for StructureErrors {}

impl DnaDocument {
    pub fn mesh_index(&self, name: &str) -> Option<u16> {
        self.definition
            .mesh_names
            .iter()
            .position(|n| n == name)
            .map(|i| i as u16)
    }

    pub fn joint_index(&self, name: &str) -> Option<u16> {
        self.definition
            .joint_names
            .iter()
            .position(|n| n == name)
            .map(|i| i as u16)
    }

    /// Validate the invariants the rig runtime relies on.
    pub fn check(&self) -> Result<(), StructureErrors> {
        let mut errors = Vec::new();
        let def = &self.definition;

        let joint_count = def.joint_names.len();
        if joint_count > usize::from(u16::MAX) {
            errors.push(format!("joint count {joint_count} exceeds u16 range"));
        }
        let mut seen = HashSet::with_capacity(joint_count);
        for name in &def.joint_names {
            if !seen.insert(name.as_str()) {
                errors.push(format!("duplicate joint name '{name}'"));
            }
        }
        if def.joint_parents.len() != joint_count {
            errors.push(format!(
                "joint parents has {} entries, expected {joint_count}",
                def.joint_parents.len()
            ));
        }
        for (i, &p) in def.joint_parents.iter().enumerate() {
            if usize::from(p) >= joint_count {
                errors.push(format!("joint {i} parent index {p} out of range"));
            }
        }
        for (label, arr) in [
            ("neutral joint translations", &def.neutral_joint_translations),
            ("neutral joint rotations", &def.neutral_joint_rotations),
        ] {
            if !arr.is_parallel() || arr.len() != joint_count {
                errors.push(format!(
                    "{label} must hold {joint_count} parallel rows (x={}, y={}, z={})",
                    arr.xs.len(),
                    arr.ys.len(),
                    arr.zs.len()
                ));
            }
        }

        let mesh_count = def.mesh_names.len();
        if self.geometry.meshes.len() != mesh_count {
            errors.push(format!(
                "geometry has {} meshes, definition names {mesh_count}",
                self.geometry.meshes.len()
            ));
        }
        let channel_count = def.blend_shape_channel_names.len();

        let lods = usize::from(self.descriptor.lod_count);
        if def.lod_mesh_indices.len() != lods || def.lod_blend_shape_channel_indices.len() != lods
        {
            errors.push(format!(
                "descriptor declares {lods} LODs, definition maps {} mesh and {} channel LODs",
                def.lod_mesh_indices.len(),
                def.lod_blend_shape_channel_indices.len()
            ));
        }
        for (lod, indices) in def.lod_mesh_indices.iter().enumerate() {
            for &m in indices {
                if usize::from(m) >= mesh_count {
                    errors.push(format!("LOD {lod} mesh index {m} out of range"));
                }
            }
        }
        for (lod, indices) in def.lod_blend_shape_channel_indices.iter().enumerate() {
            for &c in indices {
                if usize::from(c) >= channel_count {
                    errors.push(format!("LOD {lod} channel index {c} out of range"));
                }
            }
        }

        for (mi, mesh) in self.geometry.meshes.iter().enumerate() {
            if !mesh.positions.is_parallel() {
                errors.push(format!("mesh {mi} positions are not parallel arrays"));
            }
            let vertex_count = mesh.positions.len();
            for (ti, target) in mesh.blend_shape_targets.iter().enumerate() {
                if usize::from(target.channel_index) >= channel_count {
                    errors.push(format!(
                        "mesh {mi} target {ti} channel index {} out of range",
                        target.channel_index
                    ));
                }
                if !target.deltas.is_parallel()
                    || target.deltas.len() != target.vertex_indices.len()
                {
                    errors.push(format!(
                        "mesh {mi} target {ti} has {} vertex indices but {} deltas",
                        target.vertex_indices.len(),
                        target.deltas.len()
                    ));
                }
                let mut seen = HashSet::with_capacity(target.vertex_indices.len());
                for &v in &target.vertex_indices {
                    if v as usize >= vertex_count {
                        errors.push(format!(
                            "mesh {mi} target {ti} vertex index {v} out of range ({vertex_count} vertices)"
                        ));
                    }
                    if !seen.insert(v) {
                        errors.push(format!("mesh {mi} target {ti} repeats vertex index {v}"));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StructureErrors { errors })
        }
    }

    /// [`Self::check`] mapped into the crate error type.
    pub fn ensure_valid(&self) -> CalibResult<()> {
        self.check()
            .map_err(|e| CalibError::format(format!("structurally invalid DNA document: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/document.rs"]
mod tests;
