// Re-export glam for convenience
pub use glam::*;

mod bounds;
mod transform;

pub use bounds::Bounds;
pub use transform::{compose_trs, rotation_matrix, Mat4Ext};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let m = compose_trs(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::ONE);
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
    }
}
