//! Thin-lens camera for ray generation.

use crate::sampling::{gen_f32, random_in_unit_disk};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Camera placement and lens parameters.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Image width / height
    pub aspect: f32,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f32,
    /// Shutter open time
    pub time0: f32,
    /// Shutter close time
    pub time1: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            vfov: 90.0,
            aspect: 16.0 / 9.0,
            aperture: 0.0,
            focus_dist: 1.0,
            time0: 0.0,
            time1: 0.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set aspect ratio from an image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.aspect = width as f32 / height.max(1) as f32;
        self
    }

    pub fn with_shutter(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn build(&self) -> Camera {
        Camera::new(self)
    }
}

/// Camera for generating rays into the scene. Immutable once built.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
    time0: f32,
    time1: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        let theta = settings.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = settings.aspect * half_height;
        let focus = settings.focus_dist;

        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = settings.look_from;
        let lower_left_corner =
            origin - half_width * focus * u - half_height * focus * v - focus * w;

        Self {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * focus * u,
            vertical: 2.0 * half_height * focus * v,
            u,
            v,
            w,
            lens_radius: settings.aperture / 2.0,
            time0: settings.time0,
            time1: settings.time1,
        }
    }

    /// Ray through normalized image-plane coordinates `(s, t)`, both in
    /// `[0, 1]` with `(0, 0)` at the lower-left corner.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let time = self.time0 + gen_f32(rng) * (self.time1 - self.time0);
        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical
                - self.origin
                - offset,
            time,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit vector pointing from the scene back toward the camera.
    pub fn backward(&self) -> Vec3 {
        self.w
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}
