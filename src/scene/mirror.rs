use crate::dna::reader::DnaReader;
use crate::foundation::core::{DMat3, DVec3, SceneConvention};
use crate::foundation::error::{CalibError, CalibResult};
use crate::foundation::math::{euler_xyz_deg_to_mat3, mat3_to_euler_xyz_deg, row};
use crate::scene::live::{LiveBone, LiveMesh, LiveRig, LiveShapeKey, SceneSnapshot};

/// World rotation and translation of every joint, in document axes and units.
///
/// Parents are resolved in dependency order, so the joint table does not need to be sorted.
pub(crate) fn joint_world_transforms(reader: &dyn DnaReader) -> CalibResult<Vec<(DMat3, DVec3)>> {
    let n = usize::from(reader.joint_count());
    let (txs, tys, tzs) = (
        reader.neutral_joint_translation_xs(),
        reader.neutral_joint_translation_ys(),
        reader.neutral_joint_translation_zs(),
    );
    let (rxs, rys, rzs) = (
        reader.neutral_joint_rotation_xs(),
        reader.neutral_joint_rotation_ys(),
        reader.neutral_joint_rotation_zs(),
    );
    for len in [txs.len(), tys.len(), tzs.len(), rxs.len(), rys.len(), rzs.len()] {
        if len != n {
            return Err(CalibError::format(format!(
                "joint transform arrays have {len} rows for {n} joints"
            )));
        }
    }
    let to_deg = reader.rotation_unit().to_degrees_factor();

    let mut world: Vec<Option<(DMat3, DVec3)>> = vec![None; n];
    let mut resolved = 0;
    while resolved < n {
        let before = resolved;
        for j in 0..n {
            if world[j].is_some() {
                continue;
            }
            let local_r = euler_xyz_deg_to_mat3(row(rxs, rys, rzs, j) * to_deg);
            let local_t = row(txs, tys, tzs, j);
            let parent = usize::from(reader.joint_parent_index(j as u16));
            let transform = if parent == j {
                (local_r, local_t)
            } else {
                match world.get(parent).copied().flatten() {
                    Some((pr, pt)) => (pr * local_r, pt + pr * local_t),
                    None => continue,
                }
            };
            world[j] = Some(transform);
            resolved += 1;
        }
        if resolved == before {
            return Err(CalibError::format(
                "joint hierarchy has a cycle or a parent out of range",
            ));
        }
    }
    Ok(world.into_iter().flatten().collect())
}

/// Build the scene a fresh import of `reader` would produce: one mesh object per DNA mesh with a
/// basis key plus one absolute shape key per blend-shape target, and one rig with a bone per
/// joint.
pub fn mirror_document(
    reader: &dyn DnaReader,
    convention: SceneConvention,
    instance: Option<&str>,
) -> CalibResult<SceneSnapshot> {
    convention.validate()?;
    let prefix = match instance {
        Some(name) if !name.is_empty() => format!("{name}_"),
        _ => String::new(),
    };

    let mut meshes = Vec::with_capacity(usize::from(reader.mesh_count()));
    for m in 0..reader.mesh_count() {
        let dna_name = reader.mesh_name(m);
        let (xs, ys, zs) = (
            reader.vertex_position_xs(m),
            reader.vertex_position_ys(m),
            reader.vertex_position_zs(m),
        );
        let n = xs.len().min(ys.len()).min(zs.len());
        let basis: Vec<DVec3> = (0..n)
            .map(|i| convention.point_to_scene(row(xs, ys, zs, i)))
            .collect();

        let mut shape_keys = Vec::with_capacity(usize::from(reader.blend_shape_target_count(m)) + 1);
        shape_keys.push(LiveShapeKey {
            name: "Basis".to_string(),
            positions: basis.clone(),
        });
        for t in 0..reader.blend_shape_target_count(m) {
            let channel = reader.blend_shape_channel_name(reader.blend_shape_channel_index(m, t));
            let (dxs, dys, dzs) = (
                reader.blend_shape_target_delta_xs(m, t),
                reader.blend_shape_target_delta_ys(m, t),
                reader.blend_shape_target_delta_zs(m, t),
            );
            let rows = dxs.len().min(dys.len()).min(dzs.len());
            let mut positions = basis.clone();
            for (k, &v) in reader
                .blend_shape_target_vertex_indices(m, t)
                .iter()
                .take(rows)
                .enumerate()
            {
                let delta = row(dxs, dys, dzs, k) * convention.linear_modifier;
                if let Some(p) = positions.get_mut(v as usize) {
                    *p += convention.axis_to_scene(delta);
                }
            }
            shape_keys.push(LiveShapeKey {
                name: format!("{dna_name}__{channel}"),
                positions,
            });
        }

        meshes.push(LiveMesh {
            name: format!("{prefix}{dna_name}"),
            positions: basis,
            shape_keys,
        });
    }

    let rig = if reader.joint_count() == 0 {
        None
    } else {
        let world = joint_world_transforms(reader)?;
        let basis = convention.basis_to_scene();
        let bones = world
            .iter()
            .enumerate()
            .map(|(j, (r, t))| {
                let parent = usize::from(reader.joint_parent_index(j as u16));
                LiveBone {
                    name: reader.joint_name(j as u16).to_string(),
                    parent: (parent != j).then(|| reader.joint_name(parent as u16).to_string()),
                    head: convention.point_to_scene(*t),
                    rotation_deg: mat3_to_euler_xyz_deg(basis * *r),
                }
            })
            .collect();
        Some(LiveRig {
            name: format!("{prefix}rig"),
            bones,
        })
    };

    tracing::debug!(
        meshes = meshes.len(),
        bones = rig.as_ref().map_or(0, |r| r.bones.len()),
        "mirrored DNA into scene snapshot"
    );
    Ok(SceneSnapshot { meshes, rig })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mirror.rs"]
mod tests;
