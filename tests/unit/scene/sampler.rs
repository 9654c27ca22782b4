use super::*;
use crate::dna::fixture::sample_document;
use crate::scene::live::LiveBone;
use crate::scene::mirror::mirror_document;

fn close(a: DVec3, b: DVec3) -> bool {
    (a - b).length() < 1e-9
}

#[test]
fn vertices_come_back_in_document_units() {
    let doc = sample_document();
    let convention = SceneConvention::default();
    let snap = mirror_document(&doc, convention, None).unwrap();
    let (indices, positions) = sample_vertices(&snap.meshes[0], convention);
    assert_eq!(indices, [0, 1, 2, 3]);
    assert!(close(positions[2], DVec3::new(2.0, 152.0, 0.0)));
}

#[test]
fn bones_round_trip_to_local_joint_transforms() {
    let doc = sample_document();
    let convention = SceneConvention::default();
    let snap = mirror_document(&doc, convention, None).unwrap();
    let bones = sample_bone_transforms(snap.rig.as_ref().unwrap(), &[], convention);
    assert_eq!(bones.names, ["FACIAL_C_FacialRoot", "FACIAL_C_Jaw"]);
    assert!(close(bones.translations[0], DVec3::new(0.0, 160.0, 0.0)));
    assert!(close(bones.translations[1], DVec3::new(0.0, -5.0, 3.0)));
    assert!(close(bones.rotations[0], DVec3::ZERO));
    assert!(close(bones.rotations[1], DVec3::new(10.0, 0.0, 0.0)));
}

#[test]
fn ignored_bones_are_not_sampled() {
    let doc = sample_document();
    let convention = SceneConvention::default();
    let mut snap = mirror_document(&doc, convention, None).unwrap();
    let rig = snap.rig.as_mut().unwrap();
    rig.bones.push(LiveBone {
        name: "root_helper".to_string(),
        parent: None,
        head: DVec3::ZERO,
        rotation_deg: DVec3::ZERO,
    });
    let bones = sample_bone_transforms(rig, &["root_helper".to_string()], convention);
    assert_eq!(bones.len(), 2);
    assert!(!bones.names.iter().any(|n| n == "root_helper"));
}

#[test]
fn sampling_leaves_the_scene_untouched() {
    let doc = sample_document();
    let convention = SceneConvention::default();
    let snap = mirror_document(&doc, convention, None).unwrap();
    let before = snap.clone();
    let _ = sample_vertices(&snap.meshes[0], convention);
    let _ = sample_bone_transforms(snap.rig.as_ref().unwrap(), &[], convention);
    assert_eq!(snap, before);
}
