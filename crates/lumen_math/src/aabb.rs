use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// Stored as one interval per axis. An empty box (every interval empty) is
/// the identity for [`Aabb::surrounding`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Minimum extent along any axis; thinner boxes are padded so the slab
    /// test never divides a zero-width range.
    const MIN_EXTENT: f32 = 0.0001;

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(
            Interval::new(lo.x, hi.x),
            Interval::new(lo.y, hi.y),
            Interval::new(lo.z, hi.z),
        )
    }

    /// Smallest box enclosing both inputs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Interval for axis `n` (0 = X, 1 = Y, anything else = Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Lower bound along axis `n`; the BVH sort key.
    pub fn min_along(&self, n: usize) -> f32 {
        self.axis_interval(n).min
    }

    pub fn min_corner(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max_corner(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.is_empty()
            || (self.x.encloses(&other.x) && self.y.encloses(&other.y) && self.z.encloses(&other.z))
    }

    pub fn centroid(&self) -> Vec3 {
        0.5 * (self.min_corner() + self.max_corner())
    }

    /// Slab test: does the ray pass through the box for some `t` in `ray_t`?
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv_d = 1.0 / r.direction[axis];
            let mut t0 = (slab.min - r.origin[axis]) * inv_d;
            let mut t1 = (slab.max - r.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    fn pad_to_minimums(&mut self) {
        for slab in [&mut self.x, &mut self.y, &mut self.z] {
            if !slab.is_empty() && slab.size() < Self::MIN_EXTENT {
                *slab = slab.expand(Self::MIN_EXTENT);
            }
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points_any_order() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min_corner(), Vec3::ZERO);
        assert_eq!(aabb.max_corner(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_surrounding_contains_both() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::from_points(Vec3::splat(3.0), Vec3::new(10.0, 4.0, 10.0));
        let union = Aabb::surrounding(&box1, &box2);

        assert!(union.contains(&box1));
        assert!(union.contains(&box2));
        assert!(!box1.contains(&union));
        assert_eq!(union.max_corner(), Vec3::new(10.0, 5.0, 10.0));
    }

    #[test]
    fn test_aabb_empty_is_identity() {
        let b = Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE);

        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &b), b);
        assert!(b.contains(&Aabb::EMPTY));
        assert!(Aabb::EMPTY.is_empty());
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z, 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Parallel to the box, offset
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z, 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Range ends before the box
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_min_along() {
        let aabb = Aabb::from_points(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));

        assert_eq!(aabb.min_along(0), 1.0);
        assert_eq!(aabb.min_along(1), 2.0);
        assert_eq!(aabb.min_along(2), 3.0);
        assert_eq!(aabb.centroid(), Vec3::new(2.5, 3.5, 4.5));
    }

    #[test]
    fn test_aabb_pads_flat_boxes() {
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.y.size() > 0.0);
    }
}
