//! Core path tracing estimator.
//!
//! - Recursive radiance estimate with a bounce limit
//! - Sky gradient environment
//! - Scanline sampling used by the progressive scheduler

use crate::settings::{RenderSettings, T_MIN};
use crate::{Camera, Color, Hittable};
use lumen_math::{Interval, Ray};
use rand::{Rng, RngCore};

/// Compute the color seen by a ray.
///
/// `depth` counts bounces already taken; at `max_depth` the path is cut off
/// as black. Reads the scene only, so any number of workers may call it at
/// once with their own generators.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, Interval::from_min(T_MIN)) else {
        return sky_gradient(ray);
    };

    if depth >= max_depth {
        return Color::ZERO;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth + 1, max_depth, rng)
        }
        None => Color::ZERO,
    }
}

/// Environment term: white at the horizon fading to sky blue overhead.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Take one jittered sample for every pixel of scanline `row`.
///
/// Row 0 is the bottom of the image. `out` holds one color per column.
pub fn render_scanline(
    camera: &Camera,
    world: &dyn Hittable,
    row: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
    out: &mut [Color],
) {
    let (width, height) = (settings.width as f32, settings.height as f32);
    for (i, pixel) in out.iter_mut().enumerate().take(settings.width as usize) {
        let u = (i as f32 + rng.gen::<f32>()) / width;
        let v = (row as f32 + rng.gen::<f32>()) / height;
        let ray = camera.get_ray(u, v, rng);
        *pixel = ray_color(&ray, world, 0, settings.max_depth, rng);
    }
}
