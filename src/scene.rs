use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::light::Lamp;
use crate::primitives::Geometry;
use crate::ray::{HitList, Ray};
use crate::DefaultRng;
use anyhow::{ensure, Result};
use glam::{dvec4, DVec4};
use rand::prelude::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Magnitudes below this are treated as zero throughout the tracer.
pub const RAY_EPSILON: f64 = 1.0e-15;

/// Highest supersampling factor allowed.
pub const AA_MAX: u32 = 4;

/// The whole ray tracer: primitives, lamps, camera, and the knobs that drive
/// the per-pixel sampling and shading recursion.
///
/// Nothing here mutates during a render, so the pixel loop fans out across
/// rows without locking; each row works on its own rays, hit lists, and RNG.
pub struct Scene {
    items: Vec<Geometry>,
    lamps: Vec<Lamp>,
    camera: Camera,
    sky_color: DVec4,
    aa_code: u32,
    is_jitter: bool,
    depth_max: u32,
    seed: Option<u64>,
    rays_cast: AtomicU64,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            items: Vec::new(),
            lamps: Vec::new(),
            camera,
            sky_color: dvec4(0.3, 1.0, 1.0, 1.0),
            aa_code: 1,
            is_jitter: false,
            depth_max: 0,
            seed: None,
            rays_cast: AtomicU64::new(0),
        }
    }

    pub fn add_item(&mut self, item: Geometry) {
        self.items.push(item);
    }

    pub fn add_lamp(&mut self, lamp: Lamp) {
        self.lamps.push(lamp);
    }

    pub fn set_sky_color(&mut self, sky_color: DVec4) {
        self.sky_color = sky_color;
    }

    /// Select N x N supersampling with optional per-sample jitter.
    pub fn set_antialias(&mut self, aa_code: u32, is_jitter: bool) -> Result<()> {
        ensure!(
            (1..=AA_MAX).contains(&aa_code),
            "antialiasing factor {aa_code} outside 1..={AA_MAX}"
        );
        self.aa_code = aa_code;
        self.is_jitter = is_jitter;
        Ok(())
    }

    /// Maximum number of mirror bounces per eye ray.
    pub fn set_depth_max(&mut self, depth_max: u32) {
        self.depth_max = depth_max;
    }

    /// Seed the per-row RNGs so jittered renders become reproducible.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Match the camera's pixel grid to the output image.
    pub fn set_image_size(&mut self, x_max: u32, y_max: u32) {
        self.camera.set_size(x_max, y_max);
    }

    pub fn rays_cast(&self) -> u64 {
        self.rays_cast.load(Ordering::Relaxed)
    }

    /// Intersect `ray` against every primitive, except the one a secondary
    /// ray starts on. The returned list always holds at least the sky record.
    pub fn trace_ray(&self, ray: Ray, exclude: Option<usize>) -> HitList {
        self.rays_cast.fetch_add(1, Ordering::Relaxed);
        let mut hits = HitList::new(ray);
        for (i, item) in self.items.iter().enumerate() {
            if exclude == Some(i) {
                continue;
            }
            let ray = hits.ray;
            let hit = hits.extend();
            if item.trace(&ray, hit) {
                hit.item = Some(i);
                hit.calc_normals(&ray);
            }
        }
        hits
    }

    /// Whitted shading of the nearest hit in `hits`.
    ///
    /// Ambient applies per lamp whether or not the point is shadowed; a
    /// shadowed lamp contributes nothing else. `depth_remaining == 0` stops
    /// the mirror recursion regardless of material reflectivity.
    pub fn shade(&self, hits: &HitList, depth_remaining: u32) -> DVec4 {
        let hit = hits.find_nearest();
        let Some(item) = hit.item else {
            return self.sky_color.truncate().extend(1.0);
        };
        let material = &self.items[item].material;
        let normal = hit.surf_norm.truncate();

        let mut color = material.emissive;
        for lamp in self.lamps.iter().filter(|l| l.is_lit) {
            let (light_dir, light_dist) = if lamp.is_directional() {
                (lamp.pos.truncate().normalize(), f64::INFINITY)
            } else {
                let to_lamp = (lamp.pos - hit.hit_pt).truncate();
                (to_lamp.normalize(), to_lamp.length())
            };

            color += lamp.ambient * material.ambient * hit.surface_color;

            let shadow_ray = Ray::new(hit.hit_pt, light_dir.extend(0.0));
            let occluder = self.trace_ray(shadow_ray, Some(item));
            let nearest = occluder.find_nearest();
            if nearest.item.is_some() && nearest.t0 < light_dist {
                continue;
            }

            let n_dot_l = light_dir.dot(normal).max(0.0);
            color += lamp.diffuse * material.diffuse * hit.surface_color * n_dot_l;

            let half = (light_dir + hit.view_n.truncate()).normalize();
            let n_dot_h = half.dot(normal).max(0.0);
            color += lamp.specular * material.specular * n_dot_h.powf(material.shininess);
        }

        if depth_remaining > 0 && material.reflectivity > 0.0 {
            let refl_ray = Ray::new(hit.hit_pt, hit.refl_ray);
            let bounced = self.trace_ray(refl_ray, Some(item));
            color += material.reflectivity
                * self.shade(&bounced, depth_remaining - 1).truncate();
        }

        color.extend(1.0)
    }

    /// Average `aa_code`^2 subpixel samples for pixel (i, j).
    ///
    /// Without jitter every sample sits at its subpixel center; with jitter
    /// each sample is offset uniformly within its cell.
    pub fn get_pixel_color(&self, i: u32, j: u32, rng: &mut DefaultRng) -> DVec4 {
        let aa = f64::from(self.aa_code);
        let mut color = DVec4::ZERO;
        for a in 0..self.aa_code {
            for b in 0..self.aa_code {
                let (jitter_x, jitter_y) = if self.is_jitter {
                    (rng.gen::<f64>(), rng.gen::<f64>())
                } else {
                    (0.5, 0.5)
                };
                let x = f64::from(i) - 0.5 + (f64::from(a) + jitter_x) / aa;
                let y = f64::from(j) - 0.5 + (f64::from(b) + jitter_y) / aa;

                let ray = self.camera.eye_ray(x, y);
                let hits = self.trace_ray(ray, None);
                color += self.shade(&hits, self.depth_max);
            }
        }
        (color / (aa * aa)).truncate().extend(1.0)
    }

    /// Trace every pixel into `fb`, then refresh its display copy.
    ///
    /// Rows run in parallel; `.rev()` puts the camera's bottom row at the end
    /// of the buffer, so the framebuffer reads top-down.
    pub fn render(&self, fb: &mut Framebuffer) -> Result<()> {
        let width = self.camera.x_max();
        ensure!(
            fb.width() == width && fb.height() == self.camera.y_max(),
            "framebuffer {}x{} does not match camera {}x{}",
            fb.width(),
            fb.height(),
            width,
            self.camera.y_max(),
        );
        self.rays_cast.store(0, Ordering::Relaxed);

        fb.float_mut()
            .par_chunks_mut(width as usize * 3)
            .rev()
            .enumerate()
            .for_each(|(j, row)| {
                let mut rng = match self.seed {
                    Some(seed) => DefaultRng::seed_from_u64(seed.wrapping_add(j as u64)),
                    None => DefaultRng::from_entropy(),
                };
                for (i, pixel) in row.chunks_mut(3).enumerate() {
                    let color = self.get_pixel_color(i as u32, j as u32, &mut rng);
                    pixel[0] = color.x as f32;
                    pixel[1] = color.y as f32;
                    pixel[2] = color.z as f32;
                }
            });

        fb.float2int();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::primitives::{Cuboid, GroundGrid, Sphere};
    use glam::{dvec3, DVec3};
    use rand::SeedableRng;

    // Camera straight above the origin gazing down -Z, 90 degree square fov.
    fn test_camera(res: u32) -> Camera {
        let mut cam = Camera::default();
        cam.ray_perspective(90.0, 1.0, 1.0);
        cam.ray_look_at(dvec3(0.0, 0.0, 5.0), DVec3::ZERO, dvec3(0.0, 1.0, 0.0))
            .unwrap();
        cam.set_size(res, res);
        cam
    }

    fn rng() -> DefaultRng {
        DefaultRng::seed_from_u64(7)
    }

    #[test]
    fn sky_ray_shades_to_sky_color() {
        let scene = Scene::new(test_camera(100));
        let hits = scene.trace_ray(Ray::default(), None);
        let color = scene.shade(&hits, 3);
        assert_eq!(color, scene.sky_color.truncate().extend(1.0));
    }

    #[test]
    fn shadowed_lamp_keeps_only_ambient() {
        // Ground grid, lamp high above, and an occluding cuboid in between.
        let mut lit = Scene::new(test_camera(100));
        lit.add_item(Geometry::new(GroundGrid::default(), Material::default()));
        lit.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));

        let mut shadowed = Scene::new(test_camera(100));
        shadowed.add_item(Geometry::new(GroundGrid::default(), Material::default()));
        let mut blocker = Geometry::new(Cuboid, Material::default());
        blocker.ray_translate(0.0, 0.0, 5.0);
        shadowed.add_item(blocker);
        shadowed.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));

        let ray = Ray::new(
            glam::dvec4(0.4, 0.4, 3.0, 1.0),
            glam::dvec4(0.0, 0.0, -1.0, 0.0),
        );
        let lit_color = {
            let hits = lit.trace_ray(ray, None);
            lit.shade(&hits, 0)
        };
        let shadow_color = {
            let hits = shadowed.trace_ray(ray, None);
            shadowed.shade(&hits, 0)
        };

        let grid = GroundGrid::default();
        let material = Material::default();
        let ambient_only = (material.ambient * grid.gap_color).extend(1.0);
        assert!((shadow_color - ambient_only).length() < 1e-12);
        // The unshadowed scene adds diffuse and specular on top.
        assert!(lit_color.x > shadow_color.x);
        assert!(lit_color.truncate().min_element() >= shadow_color.truncate().min_element());
    }

    #[test]
    fn depth_zero_never_recurses() {
        // Identical scenes that differ only in reflectivity must agree at
        // depth 0: the mirror term is the only place reflectivity enters.
        let build = |reflectivity: f64| {
            let mut scene = Scene::new(test_camera(100));
            scene.add_item(Geometry::new(
                GroundGrid::default(),
                Material::default().with_reflectivity(reflectivity),
            ));
            let mut ball = Geometry::new(Sphere, Material::shiny(dvec3(1.0, 0.0, 0.0)));
            ball.ray_translate(0.0, 2.0, 1.0);
            scene.add_item(ball);
            scene.add_lamp(Lamp::point(dvec3(5.0, 5.0, 10.0)));
            scene
        };
        let mirror = build(0.9);
        let dull = build(0.0);

        let ray = Ray::new(
            glam::dvec4(0.4, 0.4, 3.0, 1.0),
            glam::dvec4(0.0, 0.0, -1.0, 0.0),
        );
        let mirror_hits = mirror.trace_ray(ray, None);
        let dull_hits = dull.trace_ray(ray, None);
        assert_eq!(mirror.shade(&mirror_hits, 0), dull.shade(&dull_hits, 0));
        // With one bounce allowed they diverge.
        assert_ne!(mirror.shade(&mirror_hits, 1), dull.shade(&dull_hits, 1));
    }

    #[test]
    fn single_sample_equals_center_ray() {
        let mut scene = Scene::new(test_camera(100));
        let mut ball = Geometry::new(Sphere, Material::shiny(dvec3(1.0, 0.0, 0.0)));
        ball.ray_translate(0.0, 0.0, 1.0);
        scene.add_item(ball);
        scene.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));

        let direct = {
            let ray = scene.camera.eye_ray(50.0, 50.0);
            let hits = scene.trace_ray(ray, None);
            scene.shade(&hits, 0)
        };
        assert_eq!(scene.get_pixel_color(50, 50, &mut rng()), direct);
    }

    #[test]
    fn supersampling_averages_subpixel_centers() {
        let mut scene = Scene::new(test_camera(100));
        scene.add_item(Geometry::new(GroundGrid::default(), Material::default()));
        scene.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));
        scene.set_antialias(2, false).unwrap();

        let mut expect = DVec4::ZERO;
        for a in 0..2 {
            for b in 0..2 {
                let x = 30.0 - 0.5 + (f64::from(a) + 0.5) / 2.0;
                let y = 40.0 - 0.5 + (f64::from(b) + 0.5) / 2.0;
                let hits = scene.trace_ray(scene.camera.eye_ray(x, y), None);
                expect += scene.shade(&hits, 0);
            }
        }
        expect = (expect / 4.0).truncate().extend(1.0);

        let got = scene.get_pixel_color(30, 40, &mut rng());
        assert!((got - expect).length() < 1e-12);
    }

    #[test]
    fn end_to_end_sphere_apex_color() {
        // Grid at z=0, unit sphere at (0,0,1), lamp straight above, camera
        // gazing straight down. The center pixel maps to the sphere apex:
        // n, l, v, and the half vector all line up, so every Phong term is
        // at full strength and the expected color is exact.
        let mut scene = Scene::new(test_camera(100));
        scene.add_item(Geometry::new(GroundGrid::default(), Material::default()));
        let material = Material {
            emissive: DVec3::ZERO,
            ambient: dvec3(0.1, 0.1, 0.1),
            diffuse: dvec3(0.7, 0.0, 0.0),
            specular: dvec3(0.5, 0.5, 0.5),
            shininess: 30.0,
            reflectivity: 0.0,
        };
        let mut ball = Geometry::new(Sphere, material);
        ball.ray_translate(0.0, 0.0, 1.0);
        scene.add_item(ball);
        scene.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));

        let color = scene.get_pixel_color(50, 50, &mut rng());
        let expect = dvec4(0.1 + 0.7 + 0.5, 0.1 + 0.5, 0.1 + 0.5, 1.0);
        assert!((color - expect).length() < 1e-9);
    }

    #[test]
    fn render_fills_buffer_and_counts_rays() {
        let mut scene = Scene::new(test_camera(8));
        scene.add_item(Geometry::new(GroundGrid::default(), Material::default()));
        scene.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));
        scene.set_seed(Some(42));

        let mut fb = Framebuffer::new(8, 8);
        scene.render(&mut fb).unwrap();
        // one eye ray and one shadow ray per pixel
        assert_eq!(scene.rays_cast(), 2 * 8 * 8);
        assert!(fb.float_buf().iter().all(|c| c.is_finite()));

        let mut mismatched = Framebuffer::new(4, 8);
        assert!(scene.render(&mut mismatched).is_err());
    }

    #[test]
    fn seeded_jitter_renders_reproducibly() {
        let mut scene = Scene::new(test_camera(8));
        scene.add_item(Geometry::new(GroundGrid::default(), Material::default()));
        scene.add_lamp(Lamp::point(dvec3(0.0, 0.0, 10.0)));
        scene.set_antialias(2, true).unwrap();
        scene.set_seed(Some(9));

        let mut fb1 = Framebuffer::new(8, 8);
        scene.render(&mut fb1).unwrap();
        let mut fb2 = Framebuffer::new(8, 8);
        scene.render(&mut fb2).unwrap();
        assert_eq!(fb1.float_buf(), fb2.float_buf());
    }
}
