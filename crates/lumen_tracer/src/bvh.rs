//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built once when the scene is loaded: at every level a random axis is
//! chosen, primitives are sorted by the lower bound of their boxes along it,
//! and the list is split in half. No cost model, but the expected query depth
//! is still logarithmic.

use crate::{HitRecord, Hittable};
use lumen_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

/// BVH node - a branch with two children or a leaf with one primitive.
pub enum BvhNode {
    /// Internal node; `bbox` is the union of both children's boxes.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// A single primitive.
    Leaf(Box<dyn Hittable>),
    /// No primitives at all. Never hit.
    Empty,
}

impl BvhNode {
    /// Create a BVH over `objects`. The split axes are drawn from `rng`.
    pub fn new(objects: Vec<Box<dyn Hittable>>, rng: &mut dyn RngCore) -> Self {
        let count = objects.len();
        let node = Self::build(objects, rng);
        log::info!(
            "Built BVH over {} primitives (depth {})",
            count,
            node.depth()
        );
        node
    }

    fn build(mut objects: Vec<Box<dyn Hittable>>, rng: &mut dyn RngCore) -> Self {
        match objects.len() {
            0 => BvhNode::Empty,
            1 => match objects.pop() {
                Some(object) => BvhNode::Leaf(object),
                None => BvhNode::Empty,
            },
            n => {
                if n > 2 {
                    let axis = rng.gen_range(0..3);
                    objects.sort_unstable_by(|a, b| {
                        a.bounding_box()
                            .min_along(axis)
                            .total_cmp(&b.bounding_box().min_along(axis))
                    });
                }

                let right_objects = objects.split_off(n / 2);
                let left = Self::build(objects, rng);
                let right = Self::build(right_objects, rng);
                let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());

                BvhNode::Branch {
                    left: Box::new(left),
                    right: Box::new(right),
                    bbox,
                }
            }
        }
    }

    /// Number of levels from this node down to its deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf(_) => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Visit every primitive reachable from this node, left to right.
    pub fn visit_leaves<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Hittable)) {
        match self {
            BvhNode::Empty => {}
            BvhNode::Leaf(object) => f(object.as_ref()),
            BvhNode::Branch { left, right, .. } => {
                left.visit_leaves(f);
                right.visit_leaves(f);
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit_leaves(&mut |_| count += 1);
        count
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf(object) => object.hit(ray, ray_t),
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, ray_t.with_max(right_max));

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf(object) => object.bounding_box(),
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
