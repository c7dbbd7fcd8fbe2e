//! Hittable trait and HitRecord for ray-object intersection.

use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// Borrows the material of the surface that was hit, so a record never
/// outlives the scene it came from.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Outward surface normal. Not flipped toward the ray; materials compare
    /// it with the incoming direction to tell entering from exiting.
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("p", &self.p)
            .field("normal", &self.normal)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `t` strictly inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// Axis-aligned box enclosing everything this object can report a hit on.
    fn bounding_box(&self) -> Aabb;
}

/// An ordered list of hittable objects, queried by brute force.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Hittable> {
        self.objects.iter().map(|o| o.as_ref())
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        let mut list = HittableList::new();
        for object in objects {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};

    fn sphere_at(z: f32) -> Box<dyn Hittable> {
        Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Lambertian::new(Vec3::splat(0.5)),
        ))
    }

    #[test]
    fn test_list_returns_closest_hit() {
        // Farther sphere first, so the list has to shrink its range
        let list = HittableList::from(vec![sphere_at(-5.0), sphere_at(-2.0)]);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);

        let rec = list.hit(&ray, Interval::from_min(0.001)).expect("should hit");
        assert!((rec.t - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_list_respects_range() {
        let list = HittableList::from(vec![sphere_at(-5.0)]);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);

        assert!(list.hit(&ray, Interval::new(0.001, 4.0)).is_none());
        assert!(list.hit(&ray, Interval::new(0.001, 5.0)).is_some());
    }

    #[test]
    fn test_list_bbox_grows() {
        let mut list = HittableList::new();
        assert!(list.bounding_box().is_empty());

        list.add(sphere_at(-5.0));
        list.add(sphere_at(5.0));
        let bbox = list.bounding_box();
        assert_eq!(bbox.z.min, -5.5);
        assert_eq!(bbox.z.max, 5.5);
        assert_eq!(list.len(), 2);

        list.clear();
        assert!(list.is_empty());
        assert!(list.bounding_box().is_empty());
    }

    #[test]
    fn test_empty_list_never_hits() {
        let list = HittableList::new();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        assert!(list.hit(&ray, Interval::UNIVERSE).is_none());
    }
}
