//! Diffing live scene data against the stored document.
//!
//! Every function here is pure: it takes owned or borrowed baselines and returns the rows the
//! writer should receive. Stored rows are copied bit for bit unless the live value differs by
//! strictly more than the threshold.

use crate::config::CalibrationConfig;
use crate::dna::document::Vector3Array;
use crate::dna::reader::DnaReader;
use crate::foundation::core::{DVec3, SceneConvention};
use crate::foundation::math::{euler_angle_between_deg, exceeds};
use crate::scene::sampler::SampledBones;
use std::collections::HashMap;

fn to_row(v: DVec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Full position rows for one mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexUpdate {
    pub rows: Vec<[f32; 3]>,
    pub changed: usize,
}

/// Merge sampled positions (document units) into the stored ones.
///
/// `indices[k]` names the vertex `live[k]` belongs to. Indices outside the stored mesh are
/// ignored.
pub fn reconcile_vertex_positions(
    stored: &Vector3Array,
    indices: &[usize],
    live: &[DVec3],
    epsilon: f64,
) -> VertexUpdate {
    let mut rows = stored.rows();
    let mut changed = 0;
    for (&i, &p) in indices.iter().zip(live) {
        let Some(old) = stored.get(i) else {
            continue;
        };
        if exceeds(p, old, epsilon) {
            rows[i] = to_row(p);
            changed += 1;
        }
    }
    VertexUpdate { rows, changed }
}

/// Replacement sparse set for one blend-shape target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetUpdate {
    pub target_index: u16,
    pub vertex_indices: Vec<u32>,
    pub deltas: Vec<[f32; 3]>,
}

impl TargetUpdate {
    pub fn len(&self) -> usize {
        self.vertex_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }
}

/// Rebuild a target from absolute shape-key and basis positions (scene axes and units).
///
/// Each delta is turned back into document axes, kept only when its length exceeds
/// `threshold` (scene units), then divided by the linear modifier. Vertices at or below the
/// threshold are left out entirely.
pub fn reconcile_target_deltas(
    target_index: u16,
    basis: &[DVec3],
    shape_key: &[DVec3],
    vertex_count: usize,
    convention: SceneConvention,
    threshold: f64,
) -> TargetUpdate {
    let n = vertex_count.min(basis.len()).min(shape_key.len());
    let mut out = TargetUpdate {
        target_index,
        ..Default::default()
    };
    for (v, (&key, &base)) in shape_key.iter().zip(basis).take(n).enumerate() {
        let delta = convention.axis_from_scene(key - base);
        if delta.length() > threshold {
            out.vertex_indices.push(v as u32);
            out.deltas.push(to_row(delta / convention.linear_modifier));
        }
    }
    out
}

/// Stored joint table, detached from the reader so it can cross threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointBaseline {
    pub names: Vec<String>,
    pub translations: Vector3Array,
    pub rotations: Vector3Array,
    /// Multiplier from stored rotation units to degrees.
    pub to_degrees: f64,
}

impl JointBaseline {
    pub fn from_reader(reader: &dyn DnaReader) -> Self {
        let names = (0..reader.joint_count())
            .map(|j| reader.joint_name(j).to_string())
            .collect();
        Self {
            names,
            translations: Vector3Array {
                xs: reader.neutral_joint_translation_xs().to_vec(),
                ys: reader.neutral_joint_translation_ys().to_vec(),
                zs: reader.neutral_joint_translation_zs().to_vec(),
            },
            rotations: Vector3Array {
                xs: reader.neutral_joint_rotation_xs().to_vec(),
                ys: reader.neutral_joint_rotation_ys().to_vec(),
                zs: reader.neutral_joint_rotation_zs().to_vec(),
            },
            to_degrees: reader.rotation_unit().to_degrees_factor(),
        }
    }
}

/// Full joint rows plus what changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointUpdate {
    pub translations: Vec<[f32; 3]>,
    pub rotations: Vec<[f32; 3]>,
    pub translations_changed: usize,
    pub rotations_changed: usize,
    /// Sampled bones with no joint of the same name.
    pub unmapped: Vec<String>,
}

/// Merge sampled bone transforms into the stored joint table.
///
/// Translations are updated for every mapped joint. Rotations are updated only for joints
/// named with `config.facial_bone_prefix`; other joints keep their stored rotation whatever
/// the live pose says. A rotation counts as changed when the turn between the stored and the
/// live orientation exceeds the threshold, so an equivalent Euler triple is never rewritten.
pub fn reconcile_joints(
    baseline: &JointBaseline,
    bones: &SampledBones,
    config: &CalibrationConfig,
) -> JointUpdate {
    let lookup: HashMap<&str, usize> = baseline
        .names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();
    let t = &config.thresholds;

    let mut out = JointUpdate {
        translations: baseline.translations.rows(),
        rotations: baseline.rotations.rows(),
        ..Default::default()
    };

    let sampled = bones
        .names
        .iter()
        .zip(&bones.translations)
        .zip(&bones.rotations);
    for ((name, &translation), &rotation_deg) in sampled {
        if config.ignored_bones.iter().any(|n| n == name) {
            continue;
        }
        let Some(&j) = lookup.get(name.as_str()) else {
            tracing::warn!(bone = %name, "no DNA joint found for bone; ignored from calibration");
            out.unmapped.push(name.clone());
            continue;
        };

        if let Some(stored) = baseline.translations.get(j)
            && exceeds(translation, stored, t.joint_translation)
        {
            out.translations[j] = to_row(translation);
            out.translations_changed += 1;
        }

        if !name.starts_with(config.facial_bone_prefix.as_str()) {
            continue;
        }
        if let Some(stored) = baseline.rotations.get(j)
            && euler_angle_between_deg(stored * baseline.to_degrees, rotation_deg)
                > t.joint_rotation
        {
            out.rotations[j] = to_row(rotation_deg / baseline.to_degrees);
            out.rotations_changed += 1;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/calibrate/reconcile.rs"]
mod tests;
