use super::*;
use crate::dna::fixture::sample_document;

#[test]
fn indexed_accessors_follow_the_document() {
    let doc = sample_document();
    let r: &dyn DnaReader = &doc;
    assert_eq!(r.name(), "ada_head");
    assert_eq!(r.lod_count(), 1);
    assert_eq!(r.mesh_indices_for_lod(0), [0]);
    assert_eq!(r.blend_shape_channel_indices_for_lod(0), [0]);
    assert_eq!(r.mesh_name(0), "head_lod0_mesh");
    assert_eq!(r.vertex_position_count(0), 4);
    assert_eq!(r.vertex_position_ys(0), [150.0, 150.0, 152.0, 152.0]);
    assert_eq!(r.joint_count(), 2);
    assert_eq!(r.joint_parent_index(1), 0);
    assert_eq!(r.neutral_joint_rotation_xs(), [0.0, 10.0]);
    assert_eq!(r.blend_shape_target_count(0), 1);
    assert_eq!(r.blend_shape_channel_name(r.blend_shape_channel_index(0, 0)), "jaw_open");
    assert_eq!(r.blend_shape_target_vertex_indices(0, 0), [1]);
    assert_eq!(r.blend_shape_target_delta_ys(0, 0), [-0.5]);
}

#[test]
fn out_of_range_indices_yield_empty_views() {
    let doc = sample_document();
    assert_eq!(doc.mesh_name(9), "");
    assert_eq!(doc.joint_name(9), "");
    assert_eq!(doc.joint_parent_index(9), 9);
    assert_eq!(doc.vertex_position_count(9), 0);
    assert!(doc.vertex_position_xs(9).is_empty());
    assert!(doc.mesh_indices_for_lod(3).is_empty());
    assert_eq!(doc.blend_shape_target_count(9), 0);
    assert!(doc.blend_shape_target_vertex_indices(0, 5).is_empty());
    assert!(doc.blend_shape_target_delta_zs(0, 5).is_empty());
}
