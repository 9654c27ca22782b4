use glam::{DMat3, DQuat, DVec3, EulerRot};

/// Rotate `v` by +90 degrees about X: Y-up becomes Z-up.
///
/// Written as a component swap so the conversion is exact; a trigonometric matrix would leave
/// `cos(pi/2)` residue in every converted coordinate.
pub fn quarter_turn_x(v: DVec3) -> DVec3 {
    DVec3::new(v.x, -v.z, v.y)
}

/// Rotate `v` by -90 degrees about X: Z-up becomes Y-up.
pub fn quarter_turn_x_inv(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.z, -v.y)
}

/// Matrix form of [`quarter_turn_x`], built from exact basis columns.
pub fn quarter_turn_x_mat() -> DMat3 {
    DMat3::from_cols(
        quarter_turn_x(DVec3::X),
        quarter_turn_x(DVec3::Y),
        quarter_turn_x(DVec3::Z),
    )
}

fn euler_xyz_deg_to_quat(deg: DVec3) -> DQuat {
    DQuat::from_euler(
        EulerRot::XYZ,
        deg.x.to_radians(),
        deg.y.to_radians(),
        deg.z.to_radians(),
    )
}

/// Intrinsic X->Y->Z Euler angles in degrees to a rotation matrix.
pub fn euler_xyz_deg_to_mat3(deg: DVec3) -> DMat3 {
    DMat3::from_quat(euler_xyz_deg_to_quat(deg))
}

/// Inverse of [`euler_xyz_deg_to_mat3`] for proper rotation matrices.
pub fn mat3_to_euler_xyz_deg(m: DMat3) -> DVec3 {
    let (x, y, z) = DQuat::from_mat3(&m).normalize().to_euler(EulerRot::XYZ);
    DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Angle in degrees of the rotation taking orientation `a` to orientation `b`, both given as
/// intrinsic X->Y->Z Euler degrees.
///
/// Different triples for the same orientation, such as 200 and -160 about X, are 0 apart.
pub fn euler_angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    let rel = euler_xyz_deg_to_quat(a).inverse() * euler_xyz_deg_to_quat(b);
    (2.0 * rel.xyz().length().atan2(rel.w.abs())).to_degrees()
}

/// `true` when `live` differs from `stored` by strictly more than `epsilon`.
pub fn exceeds(live: DVec3, stored: DVec3, epsilon: f64) -> bool {
    (live - stored).length() > epsilon
}

/// Widen one row of parallel `f32` component arrays.
pub fn row(xs: &[f32], ys: &[f32], zs: &[f32], i: usize) -> DVec3 {
    DVec3::new(f64::from(xs[i]), f64::from(ys[i]), f64::from(zs[i]))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
