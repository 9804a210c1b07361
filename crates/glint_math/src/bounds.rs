use crate::Vec3;

/// Axis-aligned bounding box stored as min/max corners.
///
/// An empty box has `min > max` on every axis, so the union with any
/// non-empty box yields that box unchanged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Bounds containing nothing.
    pub const EMPTY: Bounds = Bounds {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create bounds from two corner points (in any order).
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest bounds enclosing every point. Empty input yields [`Bounds::EMPTY`].
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        points.into_iter().fold(Self::EMPTY, |acc, p| acc.include(p))
    }

    /// Grow the box to contain `point`.
    pub fn include(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Bounds enclosing both boxes.
    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the center point of the box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along each axis (zero for an empty box).
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// The 8 corner points of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points([
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::ZERO,
        ]);

        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_bounds_empty() {
        let empty = Bounds::from_points(std::iter::empty());
        assert!(empty.is_empty());
        assert_eq!(empty.extent(), Vec3::ZERO);

        let single = Bounds::from_points([Vec3::ONE]);
        assert!(!single.is_empty());
    }

    #[test]
    fn test_bounds_union() {
        let a = Bounds::from_corners(Vec3::ZERO, Vec3::splat(5.0));
        let b = Bounds::from_corners(Vec3::splat(10.0), Vec3::splat(3.0));
        let u = a.union(&b);

        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::splat(10.0));

        // Union with empty leaves the box unchanged
        assert_eq!(a.union(&Bounds::EMPTY), a);
    }

    #[test]
    fn test_bounds_centroid() {
        let bounds = Bounds::from_corners(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(bounds.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }
}
