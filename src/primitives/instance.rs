use crate::material::Material;
use crate::primitives::{Intersect, Shape};
use crate::ray::{Hit, Ray};
use crate::scene::RAY_EPSILON;
use anyhow::{ensure, Result};
use glam::{DMat4, DVec3};

/// A shape placed in the world: the shape itself, its material, and the
/// transform pair that carries rays into model space.
///
/// `world_to_model` accumulates the *inverse* of every translate/rotate/scale
/// applied, left-multiplied, so rays are transformed world-to-model rather
/// than the shape model-to-world. `normal_to_world` is kept as its transpose;
/// only the linear part is applied to normals.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub shape: Shape,
    pub material: Material,
    world_to_model: DMat4,
    normal_to_world: DMat4,
}

impl Geometry {
    pub fn new(shape: impl Into<Shape>, material: Material) -> Self {
        Self {
            shape: shape.into(),
            material,
            world_to_model: DMat4::IDENTITY,
            normal_to_world: DMat4::IDENTITY,
        }
    }

    fn compose(&mut self, inverse: DMat4) {
        self.world_to_model = inverse * self.world_to_model;
        self.normal_to_world = self.world_to_model.transpose();
    }

    /// Move the shape's drawing axes by (x, y, z).
    pub fn ray_translate(&mut self, x: f64, y: f64, z: f64) {
        self.compose(DMat4::from_translation(DVec3::new(-x, -y, -z)));
    }

    /// Rotate the shape's drawing axes by `rad` radians around `axis`.
    pub fn ray_rotate(&mut self, rad: f64, axis: DVec3) -> Result<()> {
        ensure!(
            axis.length() > RAY_EPSILON,
            "{}: rotation about a zero-length axis",
            self.shape.name()
        );
        self.compose(DMat4::from_axis_angle(axis.normalize(), -rad));
        Ok(())
    }

    /// Scale the shape's drawing axes. A zero scale factor would collapse the
    /// transform and is rejected here, before any tracing can see it.
    pub fn ray_scale(&mut self, sx: f64, sy: f64, sz: f64) -> Result<()> {
        ensure!(
            sx.abs() > RAY_EPSILON && sy.abs() > RAY_EPSILON && sz.abs() > RAY_EPSILON,
            "{}: degenerate scale ({sx}, {sy}, {sz})",
            self.shape.name()
        );
        self.compose(DMat4::from_scale(DVec3::new(1.0 / sx, 1.0 / sy, 1.0 / sz)));
        Ok(())
    }

    fn model_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.world_to_model * ray.orig,
            self.world_to_model * ray.dir,
        )
    }

    /// Trace `ray` against this shape, updating `hit` when a strictly closer,
    /// strictly positive root is found. Returns whether `hit` was updated.
    pub fn trace(&self, ray: &Ray, hit: &mut Hit) -> bool {
        let model_ray = self.model_ray(ray);
        let Some(found) = self.shape.intersection(&model_ray) else {
            return false;
        };
        if found.t >= hit.t0 {
            return false;
        }

        hit.t0 = found.t;
        hit.model_hit_pt = model_ray.point_at_parameter(found.t);
        hit.hit_pt = ray.point_at_parameter(found.t);
        // Normals transform by the inverse transpose of the point transform;
        // the w row of the transpose carries translation, so drop it.
        let n = self.normal_to_world * found.normal;
        hit.surf_norm = n.truncate().normalize().extend(0.0);
        hit.surface_color = self.shape.surface_color(hit.model_hit_pt);
        true
    }
}
