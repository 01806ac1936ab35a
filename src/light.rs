use glam::{DVec3, DVec4};

/// One light source ("lamp").
///
/// The homogeneous position doubles as the light kind: `w == 1` is a point
/// light at (x,y,z), `w == 0` a directional light arriving from direction
/// (x,y,z) at infinity.
#[derive(Clone, Copy, Debug)]
pub struct Lamp {
    pub pos: DVec4,
    pub ambient: DVec3,
    pub diffuse: DVec3,
    pub specular: DVec3,
    pub is_lit: bool,
}

impl Lamp {
    pub fn point(pos: DVec3) -> Self {
        Self {
            pos: pos.extend(1.0),
            ..Self::default()
        }
    }

    pub fn directional(toward: DVec3) -> Self {
        Self {
            pos: toward.normalize().extend(0.0),
            ..Self::default()
        }
    }

    pub fn with_intensity(mut self, ambient: DVec3, diffuse: DVec3, specular: DVec3) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    pub fn is_directional(&self) -> bool {
        self.pos.w == 0.0
    }
}

impl Default for Lamp {
    fn default() -> Self {
        Self {
            pos: DVec4::W,
            ambient: DVec3::ONE,
            diffuse: DVec3::ONE,
            specular: DVec3::ONE,
            is_lit: true,
        }
    }
}
