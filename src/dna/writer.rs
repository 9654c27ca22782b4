use crate::dna::document::{DnaDocument, Vector3Array};
use crate::dna::reader::DnaReader;
use crate::foundation::error::{CalibError, CalibResult};

/// Outcome of the most recent writer commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Nothing failed (also the state before any `write()`).
    #[default]
    Ok,
    /// The last commit failed; the target path must not be trusted.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl Status {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Ok => "",
            Self::Error { message } => message,
        }
    }
}

/// Mutators over a DNA document, committed only by [`DnaWriter::write`].
///
/// Setters reject indices outside the existing document: calibration never adds meshes,
/// targets or joints.
pub trait DnaWriter {
    fn set_vertex_positions(&mut self, mesh_index: u16, positions: &[[f32; 3]])
    -> CalibResult<()>;
    fn set_blend_shape_target_vertex_indices(
        &mut self,
        mesh_index: u16,
        target_index: u16,
        vertex_indices: &[u32],
    ) -> CalibResult<()>;
    fn set_blend_shape_target_deltas(
        &mut self,
        mesh_index: u16,
        target_index: u16,
        deltas: &[[f32; 3]],
    ) -> CalibResult<()>;
    fn set_neutral_joint_translations(&mut self, rows: &[[f32; 3]]) -> CalibResult<()>;
    fn set_neutral_joint_rotations(&mut self, rows: &[[f32; 3]]) -> CalibResult<()>;

    /// Persist the whole document to the writer's target. The outcome lands in [`Self::status`].
    fn write(&mut self);

    fn status(&self) -> &Status;
}

/// A single exclusively-owned document handle exposing both halves.
pub trait DnaIo: DnaReader + DnaWriter {}

impl<T: DnaReader + DnaWriter> DnaIo for T {}

impl DnaDocument {
    pub(crate) fn apply_vertex_positions(
        &mut self,
        mesh_index: u16,
        positions: &[[f32; 3]],
    ) -> CalibResult<()> {
        let mesh = self
            .geometry
            .meshes
            .get_mut(usize::from(mesh_index))
            .ok_or_else(|| CalibError::format(format!("mesh index {mesh_index} out of range")))?;
        if positions.len() != mesh.positions.len() {
            return Err(CalibError::format(format!(
                "mesh {mesh_index} has {} vertices, got {} positions",
                mesh.positions.len(),
                positions.len()
            )));
        }
        mesh.positions = Vector3Array::from_rows(positions);
        Ok(())
    }

    pub(crate) fn apply_target_vertex_indices(
        &mut self,
        mesh_index: u16,
        target_index: u16,
        vertex_indices: &[u32],
    ) -> CalibResult<()> {
        let target = self
            .geometry
            .meshes
            .get_mut(usize::from(mesh_index))
            .and_then(|m| m.blend_shape_targets.get_mut(usize::from(target_index)))
            .ok_or_else(|| {
                CalibError::format(format!(
                    "blend shape target {target_index} of mesh {mesh_index} out of range"
                ))
            })?;
        target.vertex_indices = vertex_indices.to_vec();
        Ok(())
    }

    pub(crate) fn apply_target_deltas(
        &mut self,
        mesh_index: u16,
        target_index: u16,
        deltas: &[[f32; 3]],
    ) -> CalibResult<()> {
        let target = self
            .geometry
            .meshes
            .get_mut(usize::from(mesh_index))
            .and_then(|m| m.blend_shape_targets.get_mut(usize::from(target_index)))
            .ok_or_else(|| {
                CalibError::format(format!(
                    "blend shape target {target_index} of mesh {mesh_index} out of range"
                ))
            })?;
        target.deltas = Vector3Array::from_rows(deltas);
        Ok(())
    }

    pub(crate) fn apply_joint_rows(
        &mut self,
        rows: &[[f32; 3]],
        rotations: bool,
    ) -> CalibResult<()> {
        let joint_count = self.definition.joint_names.len();
        if rows.len() != joint_count {
            return Err(CalibError::format(format!(
                "expected {joint_count} joint rows, got {}",
                rows.len()
            )));
        }
        let dst = if rotations {
            &mut self.definition.neutral_joint_rotations
        } else {
            &mut self.definition.neutral_joint_translations
        };
        *dst = Vector3Array::from_rows(rows);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/writer.rs"]
mod tests;
