use crate::primitives::{Intersect, ModelHit};
use crate::ray::Ray;
use crate::scene::RAY_EPSILON;
use glam::{dvec3, dvec4, DVec3, DVec4};

/// Root of the ray against the model-space z=0 plane, if it lies ahead of
/// the ray origin. A direction parallel to the plane is a miss, not an error.
fn plane_z0_root(ray: &Ray) -> Option<f64> {
    if ray.dir.z.abs() < RAY_EPSILON {
        return None;
    }
    let t = -ray.orig.z / ray.dir.z;
    (t > RAY_EPSILON).then_some(t)
}

/// Line/gap pattern shared by the grid and the disk.
///
/// Distances are measured in gap units; a fractional part below `line_width`
/// selects the line color. X lines are tested before y lines. Negative
/// coordinates fold by absolute value, doubling the line width across the
/// axes.
fn grid_color(
    model_pt: DVec4,
    xgap: f64,
    ygap: f64,
    line_width: f64,
    line_color: DVec3,
    gap_color: DVec3,
) -> DVec3 {
    let loc = (model_pt.x / xgap).abs();
    if loc.fract() < line_width {
        return line_color;
    }
    let loc = (model_pt.y / ygap).abs();
    if loc.fract() < line_width {
        return line_color;
    }
    gap_color
}

/// An endless lined ground plane at model-space z = 0.
#[derive(Clone, Debug)]
pub struct GroundGrid {
    pub xgap: f64,
    pub ygap: f64,
    pub line_width: f64,
    pub line_color: DVec3,
    pub gap_color: DVec3,
}

impl Default for GroundGrid {
    fn default() -> Self {
        Self {
            xgap: 1.0,
            ygap: 1.0,
            line_width: 0.08,
            line_color: dvec3(0.5, 1.0, 0.5),
            gap_color: dvec3(0.8, 0.7, 1.0),
        }
    }
}

impl Intersect for GroundGrid {
    fn intersection(&self, ray: &Ray) -> Option<ModelHit> {
        let t = plane_z0_root(ray)?;
        Some(ModelHit {
            t,
            normal: dvec4(0.0, 0.0, 1.0, 0.0),
        })
    }

    fn surface_color(&self, model_pt: DVec4) -> DVec3 {
        grid_color(
            model_pt,
            self.xgap,
            self.ygap,
            self.line_width,
            self.line_color,
            self.gap_color,
        )
    }
}

/// A flat lined disk in the model-space z = 0 plane, centered at the origin.
#[derive(Clone, Debug)]
pub struct Disk {
    pub radius: f64,
    pub xgap: f64,
    pub ygap: f64,
    pub line_width: f64,
    pub line_color: DVec3,
    pub gap_color: DVec3,
}

impl Default for Disk {
    fn default() -> Self {
        Self {
            radius: 2.0,
            // line-to-line spacing: a ratio of primes
            xgap: 61.0 / 107.0,
            ygap: 61.0 / 107.0,
            line_width: 0.1,
            line_color: dvec3(0.5, 1.0, 0.5),
            gap_color: dvec3(0.3, 0.3, 0.8),
        }
    }
}

impl Intersect for Disk {
    fn intersection(&self, ray: &Ray) -> Option<ModelHit> {
        let t = plane_z0_root(ray)?;
        let pt = ray.point_at_parameter(t);
        if pt.x * pt.x + pt.y * pt.y > self.radius * self.radius {
            return None;
        }
        Some(ModelHit {
            t,
            normal: dvec4(0.0, 0.0, 1.0, 0.0),
        })
    }

    fn surface_color(&self, model_pt: DVec4) -> DVec3 {
        grid_color(
            model_pt,
            self.xgap,
            self.ygap,
            self.line_width,
            self.line_color,
            self.gap_color,
        )
    }
}
