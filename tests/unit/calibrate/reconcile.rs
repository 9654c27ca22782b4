use super::*;
use crate::foundation::core::UpAxis;

fn stored_positions() -> Vector3Array {
    Vector3Array::from_rows(&[[0.0, 150.0, 0.0], [2.0, 150.0, 0.0], [2.0, 152.0, 0.0]])
}

#[test]
fn vertex_noise_at_or_below_epsilon_keeps_stored_bits() {
    let stored = stored_positions();
    let live = vec![
        DVec3::new(0.0, 150.0, 1e-7),
        DVec3::new(2.0, 150.0 + 5e-7, 0.0),
        DVec3::new(2.0, 152.0, 0.0),
    ];
    let update = reconcile_vertex_positions(&stored, &[0, 1, 2], &live, 1e-6);
    assert_eq!(update.changed, 0);
    assert_eq!(update.rows, stored.rows());
}

#[test]
fn vertex_above_epsilon_takes_live_value() {
    let stored = stored_positions();
    let live = vec![
        DVec3::new(0.0, 150.0, 0.0),
        DVec3::new(2.0, 150.0, 0.0),
        DVec3::new(2.0, 152.0, 0.01),
    ];
    let update = reconcile_vertex_positions(&stored, &[0, 1, 2], &live, 1e-6);
    assert_eq!(update.changed, 1);
    assert_eq!(update.rows[2], [2.0, 152.0, 0.01f64 as f32]);
    assert_eq!(update.rows[..2], stored.rows()[..2]);
}

#[test]
fn vertex_indices_outside_the_mesh_are_ignored() {
    let stored = stored_positions();
    let update =
        reconcile_vertex_positions(&stored, &[7], &[DVec3::new(9.0, 9.0, 9.0)], 1e-6);
    assert_eq!(update.changed, 0);
    assert_eq!(update.rows.len(), 3);
}

#[test]
fn target_keeps_only_significant_rotated_deltas() {
    let convention = SceneConvention::new(UpAxis::ZUp, 0.01).unwrap();
    let basis = vec![DVec3::ZERO; 4];
    let key = vec![
        DVec3::ZERO,
        DVec3::new(0.0, 0.0, -0.005), // 0.5 cm down in Z-up meters
        DVec3::new(0.0, 0.0, 0.00005), // below 1e-4 m
        DVec3::new(0.001, 0.0, 0.0),
    ];
    let update = reconcile_target_deltas(3, &basis, &key, 4, convention, 1e-4);
    assert_eq!(update.target_index, 3);
    assert_eq!(update.vertex_indices, [1, 3]);
    let d1 = update.deltas[0];
    assert!((d1[1] - -0.5).abs() < 1e-6 && d1[0] == 0.0 && d1[2].abs() < 1e-6);
    let d3 = update.deltas[1];
    assert!((d3[0] - 0.1).abs() < 1e-6);
}

#[test]
fn target_domain_is_bounded_by_the_dna_vertex_count() {
    let convention = SceneConvention::identity();
    let basis = vec![DVec3::ZERO; 3];
    let key = vec![DVec3::ONE; 3];
    let update = reconcile_target_deltas(0, &basis, &key, 2, convention, 1e-4);
    assert_eq!(update.vertex_indices, [0, 1]);
}

fn baseline() -> JointBaseline {
    JointBaseline {
        names: vec!["FACIAL_C_Jaw".to_string(), "spine_04".to_string()],
        translations: Vector3Array::from_rows(&[[0.0, -5.0, 3.0], [0.0, 140.0, 0.0]]),
        rotations: Vector3Array::from_rows(&[[10.0, 0.0, 0.0], [0.0, 0.0, 0.0]]),
        to_degrees: 1.0,
    }
}

fn bones(rows: &[(&str, [f64; 3], [f64; 3])]) -> SampledBones {
    let mut out = SampledBones::default();
    for (name, t, r) in rows {
        out.names.push(name.to_string());
        out.translations.push(DVec3::from_array(*t));
        out.rotations.push(DVec3::from_array(*r));
    }
    out
}

#[test]
fn rotations_only_change_for_facial_joints() {
    let sampled = bones(&[
        ("FACIAL_C_Jaw", [0.0, -5.0, 3.0], [15.0, 0.0, 0.0]),
        ("spine_04", [0.0, 140.0, 0.0], [5.0, 0.0, 0.0]),
    ]);
    let update = reconcile_joints(&baseline(), &sampled, &CalibrationConfig::default());
    assert_eq!(update.rotations[0], [15.0, 0.0, 0.0]);
    assert_eq!(update.rotations[1], [0.0, 0.0, 0.0]);
    assert_eq!(update.rotations_changed, 1);
    assert_eq!(update.translations_changed, 0);
}

#[test]
fn translations_change_for_any_mapped_joint_past_threshold() {
    let sampled = bones(&[
        ("FACIAL_C_Jaw", [0.0, -5.0, 3.0005], [10.0, 0.0, 0.0]),
        ("spine_04", [0.0, 141.0, 0.0], [0.0, 0.0, 0.0]),
    ]);
    let update = reconcile_joints(&baseline(), &sampled, &CalibrationConfig::default());
    assert_eq!(update.translations[0], [0.0, -5.0, 3.0]);
    assert_eq!(update.translations[1], [0.0, 141.0, 0.0]);
    assert_eq!(update.translations_changed, 1);
}

#[test]
fn unmapped_and_ignored_bones_are_skipped() {
    let sampled = bones(&[
        ("FACIAL_L_Extra", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]),
        ("spine_04", [0.0, 200.0, 0.0], [0.0, 0.0, 0.0]),
    ]);
    let cfg = CalibrationConfig {
        ignored_bones: vec!["spine_04".to_string()],
        ..Default::default()
    };
    let update = reconcile_joints(&baseline(), &sampled, &cfg);
    assert_eq!(update.unmapped, ["FACIAL_L_Extra"]);
    assert_eq!(update.translations, baseline().translations.rows());
    assert_eq!(update.rotations, baseline().rotations.rows());
}

#[test]
fn radian_documents_compare_and_store_in_their_own_unit() {
    let mut base = baseline();
    base.rotations = Vector3Array::from_rows(&[[0.5, 0.0, 0.0], [0.0, 0.0, 0.0]]);
    base.to_degrees = 180.0 / std::f64::consts::PI;
    let same = bones(&[("FACIAL_C_Jaw", [0.0, -5.0, 3.0], [0.5f32 as f64 * base.to_degrees, 0.0, 0.0])]);
    let update = reconcile_joints(&base, &same, &CalibrationConfig::default());
    assert_eq!(update.rotations_changed, 0);

    let turned = bones(&[("FACIAL_C_Jaw", [0.0, -5.0, 3.0], [45.0, 0.0, 0.0])]);
    let update = reconcile_joints(&base, &turned, &CalibrationConfig::default());
    assert!((update.rotations[0][0] - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
}

#[test]
fn equivalent_rotation_triples_keep_stored_bits() {
    let mut base = baseline();
    base.rotations = Vector3Array::from_rows(&[[200.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
    let same = bones(&[("FACIAL_C_Jaw", [0.0, -5.0, 3.0], [-160.0, 0.0, 0.0])]);
    let update = reconcile_joints(&base, &same, &CalibrationConfig::default());
    assert_eq!(update.rotations_changed, 0);
    assert_eq!(update.rotations[0], [200.0, 0.0, 0.0]);

    let turned = bones(&[("FACIAL_C_Jaw", [0.0, -5.0, 3.0], [-155.0, 0.0, 0.0])]);
    let update = reconcile_joints(&base, &turned, &CalibrationConfig::default());
    assert_eq!(update.rotations_changed, 1);
    assert_eq!(update.rotations[0], [-155.0, 0.0, 0.0]);
}
