use crate::ray::Ray;
use anyhow::{ensure, Result};
use glam::{dvec4, DVec3, DVec4};
use std::f64::consts::PI;

/// A ray-tracing camera posed in world space.
///
/// Extrinsics: an eye point and the orthonormal U,V,N axes, with the camera
/// gazing down -N. Intrinsics: a rectangular image plane at distance `i_near`
/// along -N, spanning `i_left..i_right` along U and `i_bot..i_top` along V,
/// split into `x_max` by `y_max` pixel tiles.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    eye_pt: DVec4,
    u_axis: DVec4,
    v_axis: DVec4,
    n_axis: DVec4,

    i_near: f64,
    i_left: f64,
    i_right: f64,
    i_bot: f64,
    i_top: f64,

    x_max: u32,
    y_max: u32,
    u_frac: f64,
    v_frac: f64,
}

impl Camera {
    /// Recompute the pixel tile size after any frustum or resolution change.
    fn update_fracs(&mut self) {
        self.u_frac = (self.i_right - self.i_left) / f64::from(self.x_max);
        self.v_frac = (self.i_top - self.i_bot) / f64::from(self.y_max);
    }

    pub fn set_size(&mut self, x_max: u32, y_max: u32) {
        self.x_max = x_max;
        self.y_max = y_max;
        self.update_fracs();
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    /// Set the frustum directly, glFrustum-style (no far plane needed).
    pub fn ray_frustum(&mut self, left: f64, right: f64, bot: f64, top: f64, near: f64) {
        self.i_left = left;
        self.i_right = right;
        self.i_bot = bot;
        self.i_top = top;
        self.i_near = near;
        self.update_fracs();
    }

    /// Set a symmetric frustum, gluPerspective-style.
    ///
    /// `fovy` is the vertical field of view in degrees, `z_near` the distance
    /// from the center of projection to the image plane.
    pub fn ray_perspective(&mut self, fovy: f64, aspect: f64, z_near: f64) {
        self.i_near = z_near;
        self.i_top = z_near * f64::tan(0.5 * fovy * PI / 180.0);
        self.i_bot = -self.i_top;
        self.i_right = self.i_top * aspect;
        self.i_left = -self.i_right;
        self.update_fracs();
    }

    /// Pose the camera: gaze from `eye` toward `aim` with `up` roughly
    /// upward. Fails when `up` is parallel to the gaze direction, which
    /// leaves the U axis undefined.
    pub fn ray_look_at(&mut self, eye: DVec3, aim: DVec3, up: DVec3) -> Result<()> {
        let n = (eye - aim).normalize();
        let u = up.cross(n);
        ensure!(
            u.length() > 1e-12,
            "degenerate camera basis: up {up} is parallel to the gaze direction"
        );
        let u = u.normalize();
        let v = n.cross(u).normalize();

        self.eye_pt = eye.extend(1.0);
        self.n_axis = n.extend(0.0);
        self.u_axis = u.extend(0.0);
        self.v_axis = v.extend(0.0);
        Ok(())
    }

    /// The eye ray through image-plane position (`x`, `y`) in pixel units.
    ///
    /// Fractional coordinates address subpixel sample points; the supersampling
    /// loop relies on that. Pure function of camera state.
    pub fn eye_ray(&self, x: f64, y: f64) -> Ray {
        let pos_u = self.i_left + x * self.u_frac;
        let pos_v = self.i_bot + y * self.v_frac;

        let dir = pos_u * self.u_axis.truncate() + pos_v * self.v_axis.truncate()
            - self.i_near * self.n_axis.truncate();

        Ray::new(self.eye_pt, dir.normalize().extend(0.0))
    }
}

impl Default for Camera {
    /// Eye at the world origin, axes aligned with the world axes (gazing down
    /// -Z), a +/-1 image plane at distance 1 (a 90-degree square field of
    /// view), 256x256 pixels.
    fn default() -> Self {
        let mut cam = Self {
            eye_pt: dvec4(0.0, 0.0, 0.0, 1.0),
            u_axis: dvec4(1.0, 0.0, 0.0, 0.0),
            v_axis: dvec4(0.0, 1.0, 0.0, 0.0),
            n_axis: dvec4(0.0, 0.0, 1.0, 0.0),
            i_near: 1.0,
            i_left: -1.0,
            i_right: 1.0,
            i_bot: -1.0,
            i_top: 1.0,
            x_max: 256,
            y_max: 256,
            u_frac: 0.0,
            v_frac: 0.0,
        };
        cam.update_fracs();
        cam
    }
}
