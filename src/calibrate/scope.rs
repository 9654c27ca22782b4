use crate::config::CalibrationConfig;
use crate::dna::reader::DnaReader;
use crate::scene::live::SceneSource;
use std::collections::HashSet;

/// A DNA mesh that has a live counterpart in the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopedMesh {
    pub mesh_index: u16,
    /// First LOD listing this mesh.
    pub lod: u16,
    pub dna_name: String,
    pub scene_name: String,
}

/// Meshes taking part in a run, in LOD order. A mesh shared by several LODs appears once.
pub fn export_scope(
    reader: &dyn DnaReader,
    scene: &dyn SceneSource,
    config: &CalibrationConfig,
) -> Vec<ScopedMesh> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for lod in 0..reader.lod_count() {
        for &mesh_index in reader.mesh_indices_for_lod(lod) {
            if !seen.insert(mesh_index) {
                continue;
            }
            let dna_name = reader.mesh_name(mesh_index);
            let scene_name = config.scene_mesh_name(dna_name);
            if scene.mesh(&scene_name).is_none() {
                tracing::debug!(mesh = %scene_name, "no scene object for DNA mesh; not in scope");
                continue;
            }
            out.push(ScopedMesh {
                mesh_index,
                lod,
                dna_name: dna_name.to_string(),
                scene_name,
            });
        }
    }
    out
}
