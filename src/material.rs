use glam::{dvec3, DVec3};

// Reflect vector v around normal n
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Phong reflectance coefficients for one surface.
///
/// `ambient` and `diffuse` are modulated by the pattern color at the hit
/// point; `specular` and `emissive` are not. `reflectivity` scales the
/// recursively traced mirror color.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub emissive: DVec3,
    pub ambient: DVec3,
    pub diffuse: DVec3,
    pub specular: DVec3,
    pub shininess: f64,
    pub reflectivity: f64,
}

impl Material {
    /// A dull surface that only scatters diffusely.
    pub fn matte(color: DVec3) -> Self {
        Self {
            diffuse: color,
            specular: DVec3::ZERO,
            reflectivity: 0.0,
            ..Self::default()
        }
    }

    /// A glossy surface with a tight highlight and some mirror bounce.
    pub fn shiny(color: DVec3) -> Self {
        Self {
            diffuse: color,
            specular: dvec3(0.8, 0.8, 0.8),
            shininess: 100.0,
            reflectivity: 0.3,
            ..Self::default()
        }
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Self {
        self.reflectivity = reflectivity;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emissive: DVec3::ZERO,
            ambient: dvec3(0.1, 0.1, 0.1),
            diffuse: dvec3(0.7, 0.7, 0.7),
            specular: dvec3(0.5, 0.5, 0.5),
            shininess: 30.0,
            reflectivity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_head_on_flips() {
        let v = dvec3(0.0, 0.0, -1.0);
        let n = dvec3(0.0, 0.0, 1.0);
        assert!((reflect(v, n) - dvec3(0.0, 0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn reflect_grazing_keeps_tangent() {
        let v = dvec3(1.0, 0.0, -1.0).normalize();
        let n = dvec3(0.0, 0.0, 1.0);
        let r = reflect(v, n);
        assert!((r - dvec3(1.0, 0.0, 1.0).normalize()).length() < 1e-12);
    }
}
