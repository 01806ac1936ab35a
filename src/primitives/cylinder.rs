use crate::primitives::{Intersect, ModelHit};
use crate::ray::Ray;
use crate::scene::RAY_EPSILON;
use glam::{dvec4, DVec3, DVec4};

/// A capped cylinder: unit radius around the model-space z axis, z in -1..=1.
///
/// Up to three candidate roots compete: the two end caps and the curved wall.
/// The wall contributes its nearest positive quadratic root only; if that
/// root leaves the z bound the wall is a miss even when the far root would
/// not.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cylinder;

impl Intersect for Cylinder {
    fn intersection(&self, ray: &Ray) -> Option<ModelHit> {
        let mut best: Option<ModelHit> = None;
        let closer = |best: &Option<ModelHit>, t: f64| best.map_or(true, |b| t < b.t);

        // End caps at z = -1 and z = +1, radial bound as for a disk.
        if ray.dir.z.abs() > RAY_EPSILON {
            for sign in [-1.0, 1.0] {
                let t = (sign - ray.orig.z) / ray.dir.z;
                if t < RAY_EPSILON || !closer(&best, t) {
                    continue;
                }
                let pt = ray.point_at_parameter(t);
                if pt.x * pt.x + pt.y * pt.y > 1.0 {
                    continue;
                }
                best = Some(ModelHit {
                    t,
                    normal: dvec4(0.0, 0.0, sign, 0.0),
                });
            }
        }

        // Curved wall: a quadratic in x,y alone, bounded by the caps in z.
        let a = ray.dir.x * ray.dir.x + ray.dir.y * ray.dir.y;
        if a > RAY_EPSILON {
            let b = 2.0 * (ray.orig.x * ray.dir.x + ray.orig.y * ray.dir.y);
            let c = ray.orig.x * ray.orig.x + ray.orig.y * ray.orig.y - 1.0;
            let discriminant = b * b - 4.0 * a * c;
            if discriminant >= 0.0 {
                let root = discriminant.sqrt();
                let mut t_wall = f64::INFINITY;
                for t in [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)] {
                    if t > RAY_EPSILON && t < t_wall {
                        t_wall = t;
                    }
                }
                if t_wall.is_finite() && closer(&best, t_wall) {
                    let pt = ray.point_at_parameter(t_wall);
                    if (-1.0..=1.0).contains(&pt.z) {
                        best = Some(ModelHit {
                            t: t_wall,
                            normal: dvec4(pt.x, pt.y, 0.0, 0.0),
                        });
                    }
                }
            }
        }

        best
    }

    fn surface_color(&self, _model_pt: DVec4) -> DVec3 {
        DVec3::ONE
    }
}
