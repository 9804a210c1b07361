// Transform utilities for Mat4
//
// Node-local transforms are composed as Translate * Rotate * Scale, with the
// rotation given as an (x, y, z, w) quaternion that may not be normalized.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::Bounds;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a vector in 3D space (applies rotation and scale, but NOT translation).
    /// Vectors have an implicit w=0 component.
    fn transform_vector3(&self, vector: Vec3) -> Vec3;

    /// Transform bounds by transforming all 8 corners and re-fitting.
    fn transform_bounds(&self, bounds: &Bounds) -> Bounds;
}

impl Mat4Ext for Mat4 {
    fn transform_vector3(&self, vector: Vec3) -> Vec3 {
        let transformed = *self * Vec4::new(vector.x, vector.y, vector.z, 0.0);
        transformed.truncate()
    }

    fn transform_bounds(&self, bounds: &Bounds) -> Bounds {
        if bounds.is_empty() {
            return Bounds::EMPTY;
        }
        Bounds::from_points(bounds.corners().iter().map(|&c| self.transform_point3(c)))
    }
}

/// Rotation matrix for a quaternion.
///
/// The quaternion is normalized first. A zero-length (or non-finite)
/// quaternion yields the identity matrix.
pub fn rotation_matrix(q: Quat) -> Mat4 {
    let len = q.length();
    if len == 0.0 || !len.is_finite() {
        return Mat4::IDENTITY;
    }
    let (x, y, z, w) = (q.x / len, q.y / len, q.z / len, q.w / len);

    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0),
        Vec4::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx), 0.0),
        Vec4::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy), 0.0),
        Vec4::W,
    )
}

/// Compose a local transform as `Translate * Rotate * Scale`.
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_translation(translation) * rotation_matrix(rotation) * Mat4::from_scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    #[test]
    fn test_compose_identity() {
        let m = compose_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
        assert_eq!(m, Mat4::IDENTITY);
    }

    #[test]
    fn test_zero_quaternion_is_identity() {
        assert_eq!(rotation_matrix(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)), Mat4::IDENTITY);
    }

    #[test]
    fn test_rotation_matches_glam() {
        let q = Quat::from_rotation_y(PI / 3.0) * Quat::from_rotation_x(0.4);
        assert_mat_eq(rotation_matrix(q), Mat4::from_quat(q));
    }

    #[test]
    fn test_rotation_normalizes() {
        let q = Quat::from_rotation_z(PI / 2.0);
        let scaled = Quat::from_xyzw(q.x * 3.0, q.y * 3.0, q.z * 3.0, q.w * 3.0);
        assert_mat_eq(rotation_matrix(scaled), Mat4::from_quat(q));
    }

    #[test]
    fn test_trs_order() {
        // Scale first, then rotate 90 degrees about Z, then translate
        let m = compose_trs(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_z(PI / 2.0),
            Vec3::new(2.0, 1.0, 1.0),
        );
        let p = m.transform_point3(Vec3::X);

        assert!((p - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_transform_vector3_no_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(mat.transform_vector3(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_transform_bounds_translation() {
        let mat = Mat4::from_translation(Vec3::splat(5.0));
        let bounds = Bounds::from_corners(Vec3::ZERO, Vec3::ONE);
        let moved = mat.transform_bounds(&bounds);

        assert!((moved.min - Vec3::splat(5.0)).length() < 0.001);
        assert!((moved.max - Vec3::splat(6.0)).length() < 0.001);
        assert!(mat.transform_bounds(&Bounds::EMPTY).is_empty());
    }
}
