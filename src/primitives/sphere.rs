use crate::primitives::{Intersect, ModelHit};
use crate::ray::Ray;
use crate::scene::RAY_EPSILON;
use glam::{dvec4, DVec3, DVec4};

/// The unit sphere centered at the model-space origin.
///
/// Solved with the scaled closest-approach form, which stays valid when the
/// world-to-model transform leaves the ray direction non-unit. Only the near
/// root is returned: a ray that starts inside the sphere misses it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sphere;

impl Intersect for Sphere {
    fn intersection(&self, ray: &Ray) -> Option<ModelHit> {
        // Vector from the ray origin to the sphere center, xyz only.
        let r2s = -ray.orig.truncate();
        let dir = ray.dir.truncate();

        let l2 = r2s.dot(r2s);
        let tca_s = dir.dot(r2s); // scaled closest-approach time
        if tca_s < 0.0 {
            return None;
        }
        let dl2 = dir.dot(dir);
        if dl2 < RAY_EPSILON {
            return None;
        }
        let tca2 = tca_s * tca_s / dl2;
        let lm2 = l2 - tca2; // squared miss distance at closest approach
        if lm2 > 1.0 {
            return None;
        }
        let l2hc = 1.0 - lm2; // squared half-chord length

        let t = tca_s / dl2 - (l2hc / dl2).sqrt();
        if t < RAY_EPSILON {
            return None;
        }

        let pt = ray.point_at_parameter(t);
        Some(ModelHit {
            t,
            // unit sphere at the origin: the hit point is its own normal
            normal: dvec4(pt.x, pt.y, pt.z, 0.0),
        })
    }

    fn surface_color(&self, _model_pt: DVec4) -> DVec3 {
        DVec3::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_ray_hits_at_distance_minus_radius() {
        let ray = Ray::new(dvec4(0.0, 0.0, 3.0, 1.0), dvec4(0.0, 0.0, -1.0, 0.0));
        let hit = Sphere.intersection(&ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-12);
        assert!((hit.normal.truncate() - glam::dvec3(0.0, 0.0, 1.0)).length() < 1e-9);
    }

    #[test]
    fn offset_past_radius_misses() {
        let ray = Ray::new(dvec4(2.0, 0.0, 3.0, 1.0), dvec4(0.0, 0.0, -1.0, 0.0));
        assert!(Sphere.intersection(&ray).is_none());
    }

    #[test]
    fn sphere_behind_origin_misses() {
        let ray = Ray::new(dvec4(0.0, 0.0, 3.0, 1.0), dvec4(0.0, 0.0, 1.0, 0.0));
        assert!(Sphere.intersection(&ray).is_none());
    }

    #[test]
    fn scaled_direction_keeps_world_hit_time() {
        // A half-length direction doubles the hit time; the root must stay
        // exchangeable with the world-space ray.
        let ray = Ray::new(dvec4(0.0, 0.0, 2.5, 1.0), dvec4(0.0, 0.0, -0.5, 0.0));
        let hit = Sphere.intersection(&ray).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-12);
    }

    #[test]
    fn grazing_ray_hits_near_tangent() {
        let ray = Ray::new(dvec4(0.999, 0.0, 3.0, 1.0), dvec4(0.0, 0.0, -1.0, 0.0));
        let hit = Sphere.intersection(&ray).unwrap();
        assert!(hit.t > 0.0);
        assert!((hit.normal.truncate().length() - 1.0).abs() < 1e-9);
    }
}
