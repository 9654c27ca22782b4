use super::*;

#[test]
fn units_map_to_linear_modifier() {
    assert_eq!(TranslationUnit::Centimeters.linear_modifier(), 0.01);
    assert_eq!(TranslationUnit::Meters.linear_modifier(), 1.0);
    assert_eq!(RotationUnit::Degrees.to_degrees_factor(), 1.0);
}

#[test]
fn unit_tags_reject_unknown_values() {
    assert_eq!(TranslationUnit::from_u8(1).unwrap(), TranslationUnit::Meters);
    assert!(TranslationUnit::from_u8(7).is_err());
    assert!(RotationUnit::from_u8(2).is_err());
}

#[test]
fn convention_rejects_bad_modifier() {
    assert!(SceneConvention::new(UpAxis::ZUp, 0.0).is_err());
    assert!(SceneConvention::new(UpAxis::ZUp, f64::NAN).is_err());
    assert!(SceneConvention::new(UpAxis::ZUp, -1.0).is_err());
    assert!(SceneConvention::new(UpAxis::YUp, 0.01).is_ok());
}

#[test]
fn default_convention_is_centimeter_z_up() {
    let c = SceneConvention::default();
    assert_eq!(c.up_axis, UpAxis::ZUp);
    assert_eq!(c.linear_modifier, 0.01);
    let scene = c.point_to_scene(DVec3::new(0.0, 100.0, 0.0));
    assert!((scene - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
}

#[test]
fn point_round_trip_stays_far_below_vertex_epsilon() {
    let c = SceneConvention::default();
    let p = DVec3::new(f64::from(1.735_f32), f64::from(163.2_f32), f64::from(-4.01_f32));
    let back = c.point_from_scene(c.point_to_scene(p));
    assert!((back - p).length() < 1e-9);
}

#[test]
fn identity_convention_is_a_no_op() {
    let c = SceneConvention::identity();
    let p = DVec3::new(1.0, 2.0, 3.0);
    assert_eq!(c.point_to_scene(p), p);
    assert_eq!(c.basis_to_scene(), DMat3::IDENTITY);
}
