use crate::dna::document::{BlendShapeTarget, DnaDocument, Vector3Array};
use crate::foundation::core::{RotationUnit, TranslationUnit};

/// Read-only accessors over a DNA document.
///
/// Out-of-range indices yield empty views (`""`, `&[]`, `0`) rather than panicking.
pub trait DnaReader {
    fn name(&self) -> &str;
    fn translation_unit(&self) -> TranslationUnit;
    fn rotation_unit(&self) -> RotationUnit;

    fn lod_count(&self) -> u16;
    fn mesh_indices_for_lod(&self, lod_index: u16) -> &[u16];
    fn blend_shape_channel_indices_for_lod(&self, lod_index: u16) -> &[u16];

    fn mesh_count(&self) -> u16;
    fn mesh_name(&self, mesh_index: u16) -> &str;
    fn vertex_position_count(&self, mesh_index: u16) -> u32;
    fn vertex_position_xs(&self, mesh_index: u16) -> &[f32];
    fn vertex_position_ys(&self, mesh_index: u16) -> &[f32];
    fn vertex_position_zs(&self, mesh_index: u16) -> &[f32];

    fn joint_count(&self) -> u16;
    fn joint_name(&self, joint_index: u16) -> &str;
    fn joint_parent_index(&self, joint_index: u16) -> u16;
    fn neutral_joint_translation_xs(&self) -> &[f32];
    fn neutral_joint_translation_ys(&self) -> &[f32];
    fn neutral_joint_translation_zs(&self) -> &[f32];
    fn neutral_joint_rotation_xs(&self) -> &[f32];
    fn neutral_joint_rotation_ys(&self) -> &[f32];
    fn neutral_joint_rotation_zs(&self) -> &[f32];

    fn blend_shape_channel_count(&self) -> u16;
    fn blend_shape_channel_name(&self, channel_index: u16) -> &str;
    fn blend_shape_target_count(&self, mesh_index: u16) -> u16;
    fn blend_shape_channel_index(&self, mesh_index: u16, target_index: u16) -> u16;
    fn blend_shape_target_vertex_indices(&self, mesh_index: u16, target_index: u16) -> &[u32];
    fn blend_shape_target_delta_xs(&self, mesh_index: u16, target_index: u16) -> &[f32];
    fn blend_shape_target_delta_ys(&self, mesh_index: u16, target_index: u16) -> &[f32];
    fn blend_shape_target_delta_zs(&self, mesh_index: u16, target_index: u16) -> &[f32];
}

fn str_at(v: &[String], i: u16) -> &str {
    v.get(usize::from(i)).map(String::as_str).unwrap_or("")
}

fn slice_at<T>(v: &[Vec<T>], i: u16) -> &[T] {
    v.get(usize::from(i)).map(Vec::as_slice).unwrap_or(&[])
}

impl DnaDocument {
    fn positions(&self, mesh_index: u16) -> Option<&Vector3Array> {
        self.geometry
            .meshes
            .get(usize::from(mesh_index))
            .map(|m| &m.positions)
    }

    fn target(&self, mesh_index: u16, target_index: u16) -> Option<&BlendShapeTarget> {
        self.geometry
            .meshes
            .get(usize::from(mesh_index))?
            .blend_shape_targets
            .get(usize::from(target_index))
    }
}

impl DnaReader for DnaDocument {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn translation_unit(&self) -> TranslationUnit {
        self.descriptor.translation_unit
    }

    fn rotation_unit(&self) -> RotationUnit {
        self.descriptor.rotation_unit
    }

    fn lod_count(&self) -> u16 {
        self.descriptor.lod_count
    }

    fn mesh_indices_for_lod(&self, lod_index: u16) -> &[u16] {
        slice_at(&self.definition.lod_mesh_indices, lod_index)
    }

    fn blend_shape_channel_indices_for_lod(&self, lod_index: u16) -> &[u16] {
        slice_at(&self.definition.lod_blend_shape_channel_indices, lod_index)
    }

    fn mesh_count(&self) -> u16 {
        self.definition.mesh_names.len() as u16
    }

    fn mesh_name(&self, mesh_index: u16) -> &str {
        str_at(&self.definition.mesh_names, mesh_index)
    }

    fn vertex_position_count(&self, mesh_index: u16) -> u32 {
        self.positions(mesh_index).map_or(0, |p| p.len() as u32)
    }

    fn vertex_position_xs(&self, mesh_index: u16) -> &[f32] {
        self.positions(mesh_index).map(|p| p.xs.as_slice())
            .unwrap_or_default()
    }

    fn vertex_position_ys(&self, mesh_index: u16) -> &[f32] {
        self.positions(mesh_index).map(|p| p.ys.as_slice())
            .unwrap_or_default()
    }

    fn vertex_position_zs(&self, mesh_index: u16) -> &[f32] {
        self.positions(mesh_index).map(|p| p.zs.as_slice())
            .unwrap_or_default()
    }

    fn joint_count(&self) -> u16 {
        self.definition.joint_names.len() as u16
    }

    fn joint_name(&self, joint_index: u16) -> &str {
        str_at(&self.definition.joint_names, joint_index)
    }

    fn joint_parent_index(&self, joint_index: u16) -> u16 {
        self.definition
            .joint_parents
            .get(usize::from(joint_index))
            .copied()
            .unwrap_or(joint_index)
    }

    fn neutral_joint_translation_xs(&self) -> &[f32] {
        &self.definition.neutral_joint_translations.xs
    }

    fn neutral_joint_translation_ys(&self) -> &[f32] {
        &self.definition.neutral_joint_translations.ys
    }

    fn neutral_joint_translation_zs(&self) -> &[f32] {
        &self.definition.neutral_joint_translations.zs
    }

    fn neutral_joint_rotation_xs(&self) -> &[f32] {
        &self.definition.neutral_joint_rotations.xs
    }

    fn neutral_joint_rotation_ys(&self) -> &[f32] {
        &self.definition.neutral_joint_rotations.ys
    }

    fn neutral_joint_rotation_zs(&self) -> &[f32] {
        &self.definition.neutral_joint_rotations.zs
    }

    fn blend_shape_channel_count(&self) -> u16 {
        self.definition.blend_shape_channel_names.len() as u16
    }

    fn blend_shape_channel_name(&self, channel_index: u16) -> &str {
        str_at(&self.definition.blend_shape_channel_names, channel_index)
    }

    fn blend_shape_target_count(&self, mesh_index: u16) -> u16 {
        self.geometry
            .meshes
            .get(usize::from(mesh_index))
            .map_or(0, |m| m.blend_shape_targets.len() as u16)
    }

    fn blend_shape_channel_index(&self, mesh_index: u16, target_index: u16) -> u16 {
        self.target(mesh_index, target_index)
            .map_or(0, |t| t.channel_index)
    }

    fn blend_shape_target_vertex_indices(&self, mesh_index: u16, target_index: u16) -> &[u32] {
        self.target(mesh_index, target_index)
            .map(|t| t.vertex_indices.as_slice())
            .unwrap_or_default()
    }

    fn blend_shape_target_delta_xs(&self, mesh_index: u16, target_index: u16) -> &[f32] {
        self.target(mesh_index, target_index)
            .map(|t| t.deltas.xs.as_slice())
            .unwrap_or_default()
    }

    fn blend_shape_target_delta_ys(&self, mesh_index: u16, target_index: u16) -> &[f32] {
        self.target(mesh_index, target_index)
            .map(|t| t.deltas.ys.as_slice())
            .unwrap_or_default()
    }

    fn blend_shape_target_delta_zs(&self, mesh_index: u16, target_index: u16) -> &[f32] {
        self.target(mesh_index, target_index)
            .map(|t| t.deltas.zs.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/reader.rs"]
mod tests;
