use super::*;

fn sample() -> DnaDocument {
    DnaDocument {
        descriptor: Descriptor {
            name: "ada_head".to_string(),
            lod_count: 1,
            ..Default::default()
        },
        definition: Definition {
            joint_names: vec!["root".to_string(), "FACIAL_C_Jaw".to_string()],
            joint_parents: vec![0, 0],
            neutral_joint_translations: Vector3Array::from_rows(&[[0.0; 3], [0.0, 150.0, 2.0]]),
            neutral_joint_rotations: Vector3Array::from_rows(&[[0.0; 3], [0.0; 3]]),
            blend_shape_channel_names: vec!["jaw_open".to_string()],
            mesh_names: vec!["head_lod0_mesh".to_string()],
            lod_mesh_indices: vec![vec![0]],
            lod_blend_shape_channel_indices: vec![vec![0]],
        },
        geometry: Geometry {
            meshes: vec![Mesh {
                positions: Vector3Array::from_rows(&[
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ]),
                blend_shape_targets: vec![BlendShapeTarget {
                    channel_index: 0,
                    vertex_indices: vec![2],
                    deltas: Vector3Array::from_rows(&[[0.0, -0.5, 0.0]]),
                }],
            }],
        },
    }
}

#[test]
fn well_formed_document_passes_check() {
    sample().check().unwrap();
    sample().ensure_valid().unwrap();
}

#[test]
fn lookups_by_name() {
    let doc = sample();
    assert_eq!(doc.mesh_index("head_lod0_mesh"), Some(0));
    assert_eq!(doc.joint_index("FACIAL_C_Jaw"), Some(1));
    assert_eq!(doc.joint_index("spine_01"), None);
}

#[test]
fn duplicate_joint_names_are_rejected() {
    let mut doc = sample();
    doc.definition.joint_names[1] = "root".to_string();
    let err = doc.check().unwrap_err();
    assert!(err.to_string().contains("duplicate joint name 'root'"));
}

#[test]
fn target_indices_must_be_in_range_and_unique() {
    let mut doc = sample();
    let target = &mut doc.geometry.meshes[0].blend_shape_targets[0];
    target.vertex_indices = vec![9, 9];
    target.deltas = Vector3Array::from_rows(&[[0.0; 3], [0.0; 3]]);
    let err = doc.check().unwrap_err();
    assert!(err.errors.iter().any(|e| e.contains("out of range")));
    assert!(err.errors.iter().any(|e| e.contains("repeats vertex index 9")));
}

#[test]
fn delta_count_must_match_vertex_indices() {
    let mut doc = sample();
    doc.geometry.meshes[0].blend_shape_targets[0]
        .vertex_indices
        .push(3);
    assert!(doc.check().is_err());
}

#[test]
fn lod_tables_must_match_descriptor() {
    let mut doc = sample();
    doc.descriptor.lod_count = 2;
    let err = doc.ensure_valid().unwrap_err();
    assert!(err.to_string().contains("declares 2 LODs"));
}

#[test]
fn vector3_array_rows_round_trip() {
    let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let arr = Vector3Array::from_rows(&rows);
    assert_eq!(arr.rows(), rows.to_vec());
    assert_eq!(arr.get(1), Some(DVec3::new(4.0, 5.0, 6.0)));
    assert_eq!(arr.get(2), None);
}
