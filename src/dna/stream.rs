use crate::dna::binary::BinaryCodec;
use crate::dna::document::DnaDocument;
use crate::dna::json::JsonCodec;
use crate::dna::reader::DnaReader;
use crate::dna::writer::{DnaWriter, Status};
use crate::foundation::core::{RotationUnit, TranslationUnit};
use crate::foundation::error::{CalibError, CalibResult};
use std::path::{Path, PathBuf};

/// One on-disk encoding of a [`DnaDocument`].
pub trait DnaCodec {
    fn decode(&self, bytes: &[u8]) -> CalibResult<DnaDocument>;
    fn encode(&self, doc: &DnaDocument) -> CalibResult<Vec<u8>>;
}

/// On-disk encoding, selected from the file extension unless given explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// `.dna`
    Binary,
    /// `.json`
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> CalibResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("dna") => Ok(Self::Binary),
            Some("json") => Ok(Self::Json),
            _ => Err(CalibError::format(format!(
                "invalid DNA file extension for '{}': must be .dna or .json",
                path.display()
            ))),
        }
    }

    pub fn codec(self) -> &'static dyn DnaCodec {
        match self {
            Self::Binary => &BinaryCodec,
            Self::Json => &JsonCodec,
        }
    }
}

/// Exclusively-owned DNA document handle: the read half and the write half of one
/// calibration run.
///
/// Nothing reaches disk until [`DnaWriter::write`], which always rewrites the entire
/// document through a sibling temporary file and a rename.
#[derive(Debug)]
pub struct DnaStream {
    doc: DnaDocument,
    target: PathBuf,
    format: FileFormat,
    status: Status,
}

impl DnaStream {
    /// Read a document, using the extension to pick the codec. The stream targets `path`.
    pub fn open(path: impl AsRef<Path>) -> CalibResult<Self> {
        let path = path.as_ref();
        Self::open_with_format(path, FileFormat::from_path(path)?)
    }

    pub fn open_with_format(path: impl AsRef<Path>, format: FileFormat) -> CalibResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CalibError::format(format!("file '{}' does not exist", path.display()))
            } else {
                CalibError::Io(e)
            }
        })?;
        let doc = format
            .codec()
            .decode(&bytes)
            .and_then(|doc| doc.ensure_valid().map(|()| doc))
            .map_err(|e| CalibError::format(format!("error loading DNA '{}': {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            meshes = doc.definition.mesh_names.len(),
            joints = doc.definition.joint_names.len(),
            "loaded DNA"
        );
        Ok(Self {
            doc,
            target: path.to_path_buf(),
            format,
            status: Status::Ok,
        })
    }

    /// Wrap an in-memory document that will be written to `target`.
    pub fn from_document(doc: DnaDocument, target: impl Into<PathBuf>) -> CalibResult<Self> {
        let target = target.into();
        let format = FileFormat::from_path(&target)?;
        Ok(Self {
            doc,
            target,
            format,
            status: Status::Ok,
        })
    }

    /// Point subsequent writes at `target`; the codec follows its extension.
    pub fn retarget(&mut self, target: impl Into<PathBuf>) -> CalibResult<()> {
        let target = target.into();
        self.format = FileFormat::from_path(&target)?;
        self.target = target;
        Ok(())
    }

    pub fn target_path(&self) -> &Path {
        &self.target
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn document(&self) -> &DnaDocument {
        &self.doc
    }

    pub fn into_document(self) -> DnaDocument {
        self.doc
    }

    fn commit(&self) -> CalibResult<()> {
        self.doc.ensure_valid()?;
        let bytes = self.format.codec().encode(&self.doc)?;

        if let Some(parent) = self.target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file_name = self
            .target
            .file_name()
            .ok_or_else(|| {
                CalibError::format(format!(
                    "target '{}' has no file name",
                    self.target.display()
                ))
            })?
            .to_string_lossy();
        let tmp = self
            .target
            .with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

        let res = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, &self.target));
        if res.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        res?;
        Ok(())
    }
}

impl DnaWriter for DnaStream {
    fn set_vertex_positions(
        &mut self,
        mesh_index: u16,
        positions: &[[f32; 3]],
    ) -> CalibResult<()> {
        self.doc.apply_vertex_positions(mesh_index, positions)
    }

    fn set_blend_shape_target_vertex_indices(
        &mut self,
        mesh_index: u16,
        target_index: u16,
        vertex_indices: &[u32],
    ) -> CalibResult<()> {
        self.doc
            .apply_target_vertex_indices(mesh_index, target_index, vertex_indices)
    }

    fn set_blend_shape_target_deltas(
        &mut self,
        mesh_index: u16,
        target_index: u16,
        deltas: &[[f32; 3]],
    ) -> CalibResult<()> {
        self.doc
            .apply_target_deltas(mesh_index, target_index, deltas)
    }

    fn set_neutral_joint_translations(&mut self, rows: &[[f32; 3]]) -> CalibResult<()> {
        self.doc.apply_joint_rows(rows, false)
    }

    fn set_neutral_joint_rotations(&mut self, rows: &[[f32; 3]]) -> CalibResult<()> {
        self.doc.apply_joint_rows(rows, true)
    }

    fn write(&mut self) {
        self.status = match self.commit() {
            Ok(()) => Status::Ok,
            Err(e) => {
                tracing::error!(path = %self.target.display(), "DNA write failed: {e}");
                Status::error(e.to_string())
            }
        };
    }

    fn status(&self) -> &Status {
        &self.status
    }
}

impl DnaReader for DnaStream {
    fn name(&self) -> &str {
        self.doc.name()
    }

    fn translation_unit(&self) -> TranslationUnit {
        self.doc.translation_unit()
    }

    fn rotation_unit(&self) -> RotationUnit {
        self.doc.rotation_unit()
    }

    fn lod_count(&self) -> u16 {
        self.doc.lod_count()
    }

    fn mesh_indices_for_lod(&self, lod_index: u16) -> &[u16] {
        self.doc.mesh_indices_for_lod(lod_index)
    }

    fn blend_shape_channel_indices_for_lod(&self, lod_index: u16) -> &[u16] {
        self.doc.blend_shape_channel_indices_for_lod(lod_index)
    }

    fn mesh_count(&self) -> u16 {
        self.doc.mesh_count()
    }

    fn mesh_name(&self, mesh_index: u16) -> &str {
        self.doc.mesh_name(mesh_index)
    }

    fn vertex_position_count(&self, mesh_index: u16) -> u32 {
        self.doc.vertex_position_count(mesh_index)
    }

    fn vertex_position_xs(&self, mesh_index: u16) -> &[f32] {
        self.doc.vertex_position_xs(mesh_index)
    }

    fn vertex_position_ys(&self, mesh_index: u16) -> &[f32] {
        self.doc.vertex_position_ys(mesh_index)
    }

    fn vertex_position_zs(&self, mesh_index: u16) -> &[f32] {
        self.doc.vertex_position_zs(mesh_index)
    }

    fn joint_count(&self) -> u16 {
        self.doc.joint_count()
    }

    fn joint_name(&self, joint_index: u16) -> &str {
        self.doc.joint_name(joint_index)
    }

    fn joint_parent_index(&self, joint_index: u16) -> u16 {
        self.doc.joint_parent_index(joint_index)
    }

    fn neutral_joint_translation_xs(&self) -> &[f32] {
        self.doc.neutral_joint_translation_xs()
    }

    fn neutral_joint_translation_ys(&self) -> &[f32] {
        self.doc.neutral_joint_translation_ys()
    }

    fn neutral_joint_translation_zs(&self) -> &[f32] {
        self.doc.neutral_joint_translation_zs()
    }

    fn neutral_joint_rotation_xs(&self) -> &[f32] {
        self.doc.neutral_joint_rotation_xs()
    }

    fn neutral_joint_rotation_ys(&self) -> &[f32] {
        self.doc.neutral_joint_rotation_ys()
    }

    fn neutral_joint_rotation_zs(&self) -> &[f32] {
        self.doc.neutral_joint_rotation_zs()
    }

    fn blend_shape_channel_count(&self) -> u16 {
        self.doc.blend_shape_channel_count()
    }

    fn blend_shape_channel_name(&self, channel_index: u16) -> &str {
        self.doc.blend_shape_channel_name(channel_index)
    }

    fn blend_shape_target_count(&self, mesh_index: u16) -> u16 {
        self.doc.blend_shape_target_count(mesh_index)
    }

    fn blend_shape_channel_index(&self, mesh_index: u16, target_index: u16) -> u16 {
        self.doc.blend_shape_channel_index(mesh_index, target_index)
    }

    fn blend_shape_target_vertex_indices(&self, mesh_index: u16, target_index: u16) -> &[u32] {
        self.doc
            .blend_shape_target_vertex_indices(mesh_index, target_index)
    }

    fn blend_shape_target_delta_xs(&self, mesh_index: u16, target_index: u16) -> &[f32] {
        self.doc.blend_shape_target_delta_xs(mesh_index, target_index)
    }

    fn blend_shape_target_delta_ys(&self, mesh_index: u16, target_index: u16) -> &[f32] {
        self.doc.blend_shape_target_delta_ys(mesh_index, target_index)
    }

    fn blend_shape_target_delta_zs(&self, mesh_index: u16, target_index: u16) -> &[f32] {
        self.doc.blend_shape_target_delta_zs(mesh_index, target_index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/stream.rs"]
mod tests;
