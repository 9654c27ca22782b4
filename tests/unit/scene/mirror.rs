use super::*;
use crate::dna::fixture::sample_document;
use crate::foundation::core::UpAxis;

fn close(a: DVec3, b: DVec3) -> bool {
    (a - b).length() < 1e-9
}

#[test]
fn meshes_are_prefixed_rotated_and_scaled() {
    let doc = sample_document();
    let snap = mirror_document(&doc, SceneConvention::default(), Some("ada")).unwrap();
    assert_eq!(snap.meshes.len(), 1);
    let mesh = &snap.meshes[0];
    assert_eq!(mesh.name, "ada_head_lod0_mesh");
    // (2, 152, 0) cm, Y-up -> (0.02, 0, 1.52) m, Z-up
    assert!(close(mesh.positions[2], DVec3::new(0.02, 0.0, 1.52)));
}

#[test]
fn shape_keys_hold_absolute_positions() {
    let doc = sample_document();
    let snap = mirror_document(&doc, SceneConvention::default(), None).unwrap();
    let mesh = &snap.meshes[0];
    let names: Vec<&str> = mesh.shape_keys.iter().map(|k| k.name.as_str()).collect();
    assert_eq!(names, ["Basis", "head_lod0_mesh__jaw_open"]);

    let key = &mesh.shape_keys[1];
    assert!(close(key.positions[0], mesh.positions[0]));
    // delta (0, -0.5, 0) cm on vertex 1 -> (0, 0, -0.005) m
    assert!(close(
        key.positions[1] - mesh.positions[1],
        DVec3::new(0.0, 0.0, -0.005)
    ));
}

#[test]
fn rig_mirrors_joint_hierarchy_in_world_space() {
    let doc = sample_document();
    let snap = mirror_document(&doc, SceneConvention::identity(), Some("ada")).unwrap();
    let rig = snap.rig.unwrap();
    assert_eq!(rig.name, "ada_rig");
    let root = rig.bone("FACIAL_C_FacialRoot").unwrap();
    let jaw = rig.bone("FACIAL_C_Jaw").unwrap();
    assert_eq!(root.parent, None);
    assert_eq!(jaw.parent.as_deref(), Some("FACIAL_C_FacialRoot"));
    assert!(close(jaw.head, DVec3::new(0.0, 155.0, 3.0)));
    assert!(close(jaw.rotation_deg, DVec3::new(10.0, 0.0, 0.0)));
}

#[test]
fn z_up_rig_rotation_includes_the_quarter_turn() {
    let doc = sample_document();
    let convention = SceneConvention::new(UpAxis::ZUp, 0.01).unwrap();
    let snap = mirror_document(&doc, convention, None).unwrap();
    let root = snap.rig.unwrap().bones[0].clone();
    assert!(close(root.rotation_deg, DVec3::new(90.0, 0.0, 0.0)));
    assert!(close(root.head, DVec3::new(0.0, 0.0, 1.6)));
}

#[test]
fn unordered_parents_resolve() {
    let mut doc = sample_document();
    // child listed first
    doc.definition.joint_names.reverse();
    doc.definition.joint_parents = vec![1, 1];
    let t = &mut doc.definition.neutral_joint_translations;
    t.xs.reverse();
    t.ys.reverse();
    t.zs.reverse();
    let r = &mut doc.definition.neutral_joint_rotations;
    r.xs.reverse();
    r.ys.reverse();
    r.zs.reverse();

    let world = joint_world_transforms(&doc).unwrap();
    assert!(close(world[0].1, DVec3::new(0.0, 155.0, 3.0)));
}

#[test]
fn joint_cycle_is_rejected() {
    let mut doc = sample_document();
    doc.definition.joint_parents = vec![1, 0];
    let err = joint_world_transforms(&doc).unwrap_err();
    assert!(err.to_string().contains("cycle"));
}
