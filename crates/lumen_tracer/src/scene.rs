//! Built-in scenes and their default cameras.

use crate::settings::RenderSettings;
use crate::{Camera, CameraSettings, Color, Dielectric, Hittable, Lambertian, Metal, Sphere, Vec3};
use rand::{Rng, RngCore};

/// The cover scene: a large grey ground sphere, a grid of small random
/// spheres and three large feature spheres.
///
/// Small spheres are 80% diffuse, 15% metal and 5% glass. Those that would
/// overlap the metal feature sphere are left out.
pub fn random_scene(rng: &mut dyn RngCore) -> Vec<Box<dyn Hittable>> {
    let mut objects: Vec<Box<dyn Hittable>> = Vec::with_capacity(488);

    // Ground
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(Color::splat(0.5)),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = Color::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                objects.push(Box::new(Sphere::new(center, 0.2, Lambertian::new(albedo))));
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 + rng.gen::<f32>()),
                    0.5 * (1.0 + rng.gen::<f32>()),
                    0.5 * (1.0 + rng.gen::<f32>()),
                );
                let fuzz = 0.5 * rng.gen::<f32>();
                objects.push(Box::new(Sphere::new(center, 0.2, Metal::new(albedo, fuzz))));
            } else {
                objects.push(Box::new(Sphere::new(center, 0.2, Dielectric::new(1.5))));
            }
        }
    }

    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Dielectric::new(1.5),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(Color::new(0.4, 0.2, 0.1)),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    )));

    log::info!("Created {} objects", objects.len());
    objects
}

/// Camera for [`random_scene`]: from (13, 2, 3) at the origin, 20 degree
/// field of view, a small aperture focused at distance 10.
pub fn random_scene_camera(settings: &RenderSettings) -> Camera {
    CameraSettings::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0)
        .with_resolution(settings.width, settings.height)
        .build()
}

/// Small test scene: diffuse, metal and hollow glass spheres on a large
/// yellow ground sphere.
///
/// The glass sphere holds a slightly smaller negative-radius sphere whose
/// normals point inward, which makes a thin glass shell.
pub fn three_spheres() -> Vec<Box<dyn Hittable>> {
    vec![
        Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::new(0.1, 0.2, 0.5)),
        )),
        Box::new(Sphere::new(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Lambertian::new(Color::new(0.8, 0.8, 0.0)),
        )),
        Box::new(Sphere::new(
            Vec3::new(1.0, 0.0, -1.0),
            0.5,
            Metal::new(Color::new(0.8, 0.6, 0.2), 0.0),
        )),
        Box::new(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Dielectric::new(1.5))),
        Box::new(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), -0.45, Dielectric::new(1.5))),
    ]
}

/// Camera for [`three_spheres`]: a pinhole a little behind and above the
/// spheres.
pub fn three_spheres_camera(settings: &RenderSettings) -> Camera {
    CameraSettings::default()
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(40.0, 0.0, 1.0)
        .with_resolution(settings.width, settings.height)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BvhNode;
    use lumen_math::{Aabb, Interval, Ray};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boxes(objects: &[Box<dyn Hittable>]) -> Vec<Aabb> {
        objects.iter().map(|o| o.bounding_box()).collect()
    }

    #[test]
    fn test_random_scene_layout() {
        let objects = random_scene(&mut StdRng::seed_from_u64(42));

        // Ground + up to 22 * 22 small spheres + 3 feature spheres
        assert!(objects.len() > 4 && objects.len() <= 488);

        let ground = objects[0].bounding_box();
        assert!((ground.max_corner().y - 0.0).abs() < 0.01);
        assert!((ground.min_corner().y + 2000.0).abs() < 0.01);

        let metal_center = Vec3::new(4.0, 0.2, 0.0);
        for small in &objects[1..objects.len() - 3] {
            let bbox = small.bounding_box();
            assert!((bbox.max_corner().y - 0.4).abs() < 0.01);
            assert!((bbox.centroid() - metal_center).length() > 0.9);
        }

        let big: Vec<Vec3> = objects[objects.len() - 3..]
            .iter()
            .map(|o| o.bounding_box().centroid())
            .collect();
        assert!((big[0] - Vec3::new(0.0, 1.0, 0.0)).length() < 0.01);
        assert!((big[1] - Vec3::new(-4.0, 1.0, 0.0)).length() < 0.01);
        assert!((big[2] - Vec3::new(4.0, 1.0, 0.0)).length() < 0.01);
    }

    #[test]
    fn test_random_scene_is_seeded() {
        let a = random_scene(&mut StdRng::seed_from_u64(7));
        let b = random_scene(&mut StdRng::seed_from_u64(7));
        assert_eq!(boxes(&a), boxes(&b));
    }

    #[test]
    fn test_camera_sees_feature_sphere() {
        let settings = RenderSettings::default().with_resolution(120, 80);
        let camera = random_scene_camera(&settings);
        let mut rng = StdRng::seed_from_u64(3);
        let world = BvhNode::new(random_scene(&mut rng), &mut rng);

        // The image centre looks at the origin, which the glass sphere touches,
        // so something is hit no further away than that
        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        let hit = world.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.p - camera.origin()).length() < Vec3::new(13.0, 2.0, 3.0).length() + 0.1);
    }

    #[test]
    fn test_three_spheres_glass_shell() {
        let objects = three_spheres();
        assert_eq!(objects.len(), 5);

        // The inner surface of the glass shell faces inward
        let shell = &objects[4];
        let ray = Ray::new_simple(Vec3::new(-1.0, 0.0, 1.0), Vec3::NEG_Z);
        let inner = shell.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((inner.t - 1.55).abs() < 1e-4);
        assert!(inner.normal.dot(Vec3::Z) < 0.0);

        let camera = three_spheres_camera(&RenderSettings::default().with_resolution(40, 20));
        let centre = camera.get_ray(0.5, 0.5, &mut StdRng::seed_from_u64(0));
        let expected = (Vec3::new(0.0, 0.0, -1.0) - Vec3::new(-2.0, 2.0, 1.0)).normalize();
        assert!((centre.direction().normalize() - expected).length() < 1e-4);
    }
}
