use crate::primitives::{Intersect, ModelHit};
use crate::ray::Ray;
use crate::scene::RAY_EPSILON;
use glam::{dvec4, DVec3, DVec4};

/// The axis-aligned box spanning -1..=1 on every model-space axis.
///
/// Each of the six face planes is solved in turn; a face hit counts when the
/// other two coordinates stay inside the box. The face normal is the signed
/// unit axis of the face struck.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cuboid;

impl Intersect for Cuboid {
    fn intersection(&self, ray: &Ray) -> Option<ModelHit> {
        let orig = ray.orig.to_array();
        let dir = ray.dir.to_array();

        let mut best: Option<ModelHit> = None;
        for axis in 0..3 {
            if dir[axis].abs() < RAY_EPSILON {
                continue;
            }
            for sign in [-1.0, 1.0] {
                let t = (sign - orig[axis]) / dir[axis];
                if t < RAY_EPSILON {
                    continue;
                }
                if let Some(ref b) = best {
                    if t >= b.t {
                        continue;
                    }
                }
                let pt = ray.point_at_parameter(t).to_array();
                let inside = (0..3)
                    .filter(|&a| a != axis)
                    .all(|a| (-1.0..=1.0).contains(&pt[a]));
                if !inside {
                    continue;
                }
                let normal = match axis {
                    0 => dvec4(sign, 0.0, 0.0, 0.0),
                    1 => dvec4(0.0, sign, 0.0, 0.0),
                    _ => dvec4(0.0, 0.0, sign, 0.0),
                };
                best = Some(ModelHit { t, normal });
            }
        }
        best
    }

    fn surface_color(&self, _model_pt: DVec4) -> DVec3 {
        DVec3::ONE
    }
}
