//! This module is full of primitives that all impl Intersect.
//!
//! Every shape lives in its own canonical model space (unit sphere, +/-1 cube,
//! unit-radius cylinder, z=0 plane) and only solves its equation there; the
//! placement in world space belongs to [`Geometry`].

mod cuboid;
mod cylinder;
mod instance;
mod plane;
mod sphere;

pub use cuboid::*;
pub use cylinder::*;
pub use instance::*;
pub use plane::*;
pub use sphere::*;

use crate::ray::Ray;
use enum_dispatch::enum_dispatch;
use glam::{DVec3, DVec4};

/// A candidate intersection found in model space.
#[derive(Clone, Copy, Debug)]
pub struct ModelHit {
    /// Root along the (model-space) ray; shared with the world-space ray.
    pub t: f64,
    /// Model-space surface normal, not necessarily unit length.
    pub normal: DVec4,
}

/// Computes whether a ray intersects a primitive.
///
/// The ray is given in the primitive's model space and is generally not
/// unit-length. Implementations return their own smallest strictly positive
/// root, or `None` for a miss; misses are expected and silent.
#[enum_dispatch]
pub trait Intersect {
    fn intersection(&self, ray: &Ray) -> Option<ModelHit>;

    /// Base color at a model-space hit point: the line/gap pattern for the
    /// lined shapes, plain white elsewhere.
    fn surface_color(&self, model_pt: DVec4) -> DVec3;
}

/// Every shape the tracer knows how to intersect.
#[enum_dispatch(Intersect)]
#[derive(Clone, Debug)]
pub enum Shape {
    GroundGrid(GroundGrid),
    Disk(Disk),
    Sphere(Sphere),
    Cuboid(Cuboid),
    Cylinder(Cylinder),
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::GroundGrid(_) => "ground grid",
            Shape::Disk(_) => "disk",
            Shape::Sphere(_) => "sphere",
            Shape::Cuboid(_) => "cuboid",
            Shape::Cylinder(_) => "cylinder",
        }
    }
}
