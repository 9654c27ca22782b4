use crate::foundation::core::{DMat3, DVec3, SceneConvention};
use crate::foundation::math::{euler_xyz_deg_to_mat3, mat3_to_euler_xyz_deg};
use crate::scene::live::{LiveMesh, LiveRig};
use std::collections::HashMap;

/// Parent-local joint transforms sampled from a rig, in document axes and units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledBones {
    pub names: Vec<String>,
    pub translations: Vec<DVec3>,
    /// Intrinsic X->Y->Z Euler degrees.
    pub rotations: Vec<DVec3>,
}

impl SampledBones {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Vertex indices and positions of `mesh`, converted into document axes and units.
pub fn sample_vertices(mesh: &LiveMesh, convention: SceneConvention) -> (Vec<usize>, Vec<DVec3>) {
    let positions: Vec<DVec3> = mesh
        .positions
        .iter()
        .map(|&p| convention.point_from_scene(p))
        .collect();
    ((0..positions.len()).collect(), positions)
}

/// Rest-pose transforms of every bone of `rig` not listed in `ignored`, relative to its parent.
///
/// A bone without a parent, or whose parent is not in the rig, keeps its rig-space transform.
pub fn sample_bone_transforms(
    rig: &LiveRig,
    ignored: &[String],
    convention: SceneConvention,
) -> SampledBones {
    let from_scene = convention.basis_to_scene().transpose();
    let world: HashMap<&str, (DMat3, DVec3)> = rig
        .bones
        .iter()
        .map(|b| {
            let r = from_scene * euler_xyz_deg_to_mat3(b.rotation_deg);
            (b.name.as_str(), (r, convention.point_from_scene(b.head)))
        })
        .collect();

    let mut out = SampledBones::default();
    for bone in &rig.bones {
        if ignored.iter().any(|n| *n == bone.name) {
            continue;
        }
        let Some(&(r, t)) = world.get(bone.name.as_str()) else {
            continue;
        };
        let parent = bone
            .parent
            .as_deref()
            .and_then(|p| world.get(p))
            .copied();
        let (local_r, local_t) = match parent {
            Some((pr, pt)) => {
                let inv = pr.transpose();
                (inv * r, inv * (t - pt))
            }
            None => (r, t),
        };
        out.names.push(bone.name.clone());
        out.translations.push(local_t);
        out.rotations.push(mat3_to_euler_xyz_deg(local_r));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sampler.rs"]
mod tests;
