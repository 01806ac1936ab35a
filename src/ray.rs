use crate::material::reflect;
use glam::{dvec4, DVec3, DVec4};

/// Hit-time sentinel: a record with this `t0` hit nothing and shows the sky.
pub const T0_MAX: f64 = 1.23e16;

/// A world- or model-space ray in homogeneous coordinates.
///
/// The origin is a point (`w == 1`), the direction a free vector (`w == 0`).
/// Eye rays carry a unit direction; model-space rays generally do not, since
/// the world-to-model transform scales them.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub orig: DVec4,
    pub dir: DVec4,
}

impl Ray {
    pub fn new(orig: DVec4, dir: DVec4) -> Self {
        Self { orig, dir }
    }

    pub fn point_at_parameter(&self, t: f64) -> DVec4 {
        self.orig + t * self.dir
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            orig: dvec4(0.0, 0.0, 0.0, 1.0),
            dir: dvec4(0.0, 0.0, -1.0, 0.0),
        }
    }
}

/// One ray/surface intersection record.
///
/// A fresh record describes the sky: `t0` at the sentinel and no owning
/// primitive. A primitive may only overwrite it with a strictly closer,
/// strictly positive root.
#[derive(Clone, Copy, Debug)]
pub struct Hit {
    /// Hit time along the ray; `orig + t0 * dir` is the hit point.
    pub t0: f64,
    /// Index of the primitive struck, `None` for the sky.
    pub item: Option<usize>,
    /// World-space hit point.
    pub hit_pt: DVec4,
    /// Hit point in the primitive's model space, for pattern evaluation.
    pub model_hit_pt: DVec4,
    /// Unit world-space surface normal.
    pub surf_norm: DVec4,
    /// Unit vector from the hit point back toward the ray origin.
    pub view_n: DVec4,
    /// Unit mirror-reflection direction of the view vector.
    pub refl_ray: DVec4,
    /// Pattern-selected base color (line/gap color; white for plain shapes).
    pub surface_color: DVec3,
}

impl Hit {
    pub fn sky() -> Self {
        Self {
            t0: T0_MAX,
            item: None,
            hit_pt: dvec4(T0_MAX, 0.0, 0.0, 1.0),
            model_hit_pt: dvec4(T0_MAX, 0.0, 0.0, 1.0),
            surf_norm: dvec4(-1.0, 0.0, 0.0, 0.0),
            view_n: dvec4(-1.0, 0.0, 0.0, 0.0),
            refl_ray: dvec4(-1.0, 0.0, 0.0, 0.0),
            surface_color: DVec3::ONE,
        }
    }

    /// Derive the lighting vectors from the traced ray: unit view vector,
    /// re-normalized surface normal, and the mirror reflection `2(N.V)N - V`.
    pub fn calc_normals(&mut self, ray: &Ray) {
        self.view_n = (-ray.dir.truncate()).normalize().extend(0.0);
        self.surf_norm = self.surf_norm.truncate().normalize().extend(0.0);
        let refl = reflect(-self.view_n.truncate(), self.surf_norm.truncate());
        self.refl_ray = refl.normalize().extend(0.0);
    }
}

impl Default for Hit {
    fn default() -> Self {
        Self::sky()
    }
}

/// All intersection records collected from one ray against the whole scene.
///
/// Always non-empty: the first record is the sky, so `find_nearest` has an
/// answer even when every primitive misses.
#[derive(Clone, Debug)]
pub struct HitList {
    pub ray: Ray,
    pierce: Vec<Hit>,
}

impl HitList {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            pierce: vec![Hit::sky()],
        }
    }

    /// Append a fresh sky record and hand it out for a primitive to fill in.
    pub fn extend(&mut self) -> &mut Hit {
        self.pierce.push(Hit::sky());
        self.pierce.last_mut().unwrap()
    }

    /// The record with the smallest hit time. Ties keep the first record, so
    /// the sky entry wins only when nothing was hit.
    pub fn find_nearest(&self) -> &Hit {
        let mut nearest = 0;
        for (i, hit) in self.pierce.iter().enumerate() {
            if hit.t0 < self.pierce[nearest].t0 {
                nearest = i;
            }
        }
        &self.pierce[nearest]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    fn approx(a: DVec4, b: DVec4) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn point_along_ray() {
        let r = Ray::new(dvec4(1.0, 2.0, 3.0, 1.0), dvec4(0.0, 0.0, -1.0, 0.0));
        assert!(approx(r.point_at_parameter(2.5), dvec4(1.0, 2.0, 0.5, 1.0)));
    }

    #[test]
    fn empty_list_yields_sky() {
        let hits = HitList::new(Ray::default());
        let nearest = hits.find_nearest();
        assert!(nearest.item.is_none());
        assert_eq!(nearest.t0, T0_MAX);
    }

    #[test]
    fn nearest_picks_smallest_t() {
        let mut hits = HitList::new(Ray::default());
        hits.extend().t0 = 5.0;
        let h = hits.extend();
        h.t0 = 3.0;
        h.item = Some(1);
        hits.extend().t0 = 4.0;
        let nearest = hits.find_nearest();
        assert_eq!(nearest.t0, 3.0);
        assert_eq!(nearest.item, Some(1));
    }

    #[test]
    fn nearest_tie_keeps_first() {
        let mut hits = HitList::new(Ray::default());
        let h = hits.extend();
        h.t0 = 3.0;
        h.item = Some(0);
        let h = hits.extend();
        h.t0 = 3.0;
        h.item = Some(1);
        assert_eq!(hits.find_nearest().item, Some(0));
    }

    #[test]
    fn normals_head_on() {
        let ray = Ray::new(dvec4(0.0, 0.0, 5.0, 1.0), dvec4(0.0, 0.0, -1.0, 0.0));
        let mut hit = Hit::sky();
        hit.surf_norm = dvec4(0.0, 0.0, 2.0, 0.0); // un-normalized on purpose
        hit.calc_normals(&ray);
        assert!(approx(hit.view_n, dvec4(0.0, 0.0, 1.0, 0.0)));
        assert!(approx(hit.surf_norm, dvec4(0.0, 0.0, 1.0, 0.0)));
        assert!(approx(hit.refl_ray, dvec4(0.0, 0.0, 1.0, 0.0)));
    }

    #[test]
    fn reflection_at_45_degrees() {
        let dir = dvec3(1.0, 0.0, -1.0).normalize();
        let ray = Ray::new(dvec4(0.0, 0.0, 5.0, 1.0), dir.extend(0.0));
        let mut hit = Hit::sky();
        hit.surf_norm = dvec4(0.0, 0.0, 1.0, 0.0);
        hit.calc_normals(&ray);
        let expect = dvec3(1.0, 0.0, 1.0).normalize().extend(0.0);
        assert!(approx(hit.refl_ray, expect));
    }
}
