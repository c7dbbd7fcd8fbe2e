//! Lumen - progressive CPU path tracing
//!
//! A Monte Carlo path tracer for spheres with diffuse, metal and glass
//! materials. The image converges progressively: a persistent pool of worker
//! threads renders one scanline each per round, samples accumulate into a
//! running per-pixel average, and the tone-mapped result can be shown or
//! saved at any point.

mod accumulation;
mod bvh;
mod camera;
mod display;
mod error;
mod hittable;
mod material;
mod output;
mod progressive;
mod renderer;
mod sampling;
mod scheduler;
mod settings;
mod sphere;
mod workers;

pub mod scene;

pub use accumulation::{linear_to_gamma, tone_map, tone_map_channel, AccumulationBuffer};
pub use bvh::BvhNode;
pub use camera::{Camera, CameraSettings};
pub use display::{changed_rows, DisplaySink, NullSink};
pub use error::{RenderError, RenderResult, WorkerError};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{reflect, refract, schlick, Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use output::{save_image, save_ppm, write_ppm};
pub use progressive::ProgressiveRenderer;
pub use renderer::{ray_color, render_scanline, sky_gradient};
pub use sampling::{random_in_unit_disk, random_in_unit_sphere};
pub use scheduler::{Round, RowSamples, ScanlineScheduler};
pub use settings::{RenderSettings, BATCH_PASSES, IMAGE_HEIGHT, IMAGE_WIDTH, MAX_DEPTH, MAX_WORKERS, T_MIN};
pub use sphere::Sphere;
pub use workers::WorkerGroup;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
