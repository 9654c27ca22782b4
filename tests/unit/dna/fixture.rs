use crate::dna::document::{
    BlendShapeTarget, Definition, Descriptor, DnaDocument, Geometry, Mesh, Vector3Array,
};

/// One head mesh (4 vertices, 1 target with 1 active delta) and 2 joints.
pub(crate) fn sample_document() -> DnaDocument {
    DnaDocument {
        descriptor: Descriptor {
            name: "ada_head".to_string(),
            lod_count: 1,
            ..Default::default()
        },
        definition: Definition {
            joint_names: vec!["FACIAL_C_FacialRoot".to_string(), "FACIAL_C_Jaw".to_string()],
            joint_parents: vec![0, 0],
            neutral_joint_translations: Vector3Array::from_rows(&[
                [0.0, 160.0, 0.0],
                [0.0, -5.0, 3.0],
            ]),
            neutral_joint_rotations: Vector3Array::from_rows(&[[0.0; 3], [10.0, 0.0, 0.0]]),
            blend_shape_channel_names: vec!["jaw_open".to_string()],
            mesh_names: vec!["head_lod0_mesh".to_string()],
            lod_mesh_indices: vec![vec![0]],
            lod_blend_shape_channel_indices: vec![vec![0]],
        },
        geometry: Geometry {
            meshes: vec![Mesh {
                positions: Vector3Array::from_rows(&[
                    [0.0, 150.0, 0.0],
                    [2.0, 150.0, 0.0],
                    [2.0, 152.0, 0.0],
                    [0.0, 152.0, 0.0],
                ]),
                blend_shape_targets: vec![BlendShapeTarget {
                    channel_index: 0,
                    vertex_indices: vec![1],
                    deltas: Vector3Array::from_rows(&[[0.0, -0.5, 0.0]]),
                }],
            }],
        },
    }
}

/// Scratch directory under `target/` for tests that touch disk.
pub(crate) fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::path::PathBuf::from("target").join("unit").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
