//! Material, lights, and the renderer's persistent configuration.

use log::trace;

use crate::color::Color;
use crate::error::{RasterError, Result};
use crate::matrix::Mat4;
use crate::vector::Vec3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DepthFunc {
    Never,
    Always,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlendFactor {
    SrcAlpha,
    OneMinusSrcAlpha,
    One,
    Zero,
}

#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub specular_power: f32,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            ambient: Color::WHITE,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            specular_power: 1.0,
        }
    }
}

/// A light as authored by the host, in the space the host chose (typically
/// world or eye space before the renderer re-derives it).
#[derive(Clone, Copy, Debug)]
pub struct Light {
    pub pos: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

/// The per-draw form of a light: position transformed into eye space,
/// diffuse/specular pre-modulated by the current material.
#[derive(Clone, Copy, Debug)]
pub struct ProcessedLight {
    pub pos: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

pub struct RendererState {
    pub(crate) model_view: Mat4,
    pub(crate) projection: Mat4,
    pub(crate) normal_matrix: crate::matrix::Mat3,

    pub(crate) material: Material,

    pub(crate) lights: Vec<Light>,
    pub(crate) processed_lights: Vec<ProcessedLight>,

    pub(crate) lighting: bool,

    pub(crate) blend_src: BlendFactor,
    pub(crate) blend_dst: BlendFactor,

    pub(crate) depth_func: DepthFunc,
    pub(crate) depth_test: bool,

    pub(crate) culling: bool,
}

impl Default for RendererState {
    fn default() -> RendererState {
        RendererState {
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            normal_matrix: crate::matrix::Mat3::IDENTITY,
            material: Material::default(),
            lights: Vec::new(),
            processed_lights: Vec::new(),
            lighting: false,
            blend_src: BlendFactor::SrcAlpha,
            blend_dst: BlendFactor::OneMinusSrcAlpha,
            depth_func: DepthFunc::Le,
            depth_test: false,
            culling: false,
        }
    }
}

impl RendererState {
    /// `model_view = model * view`; recomputes the normal matrix and every
    /// processed light, since both derive from `model_view`.
    pub fn set_mvp(&mut self, model: Mat4, view: Mat4, projection: Mat4) {
        self.model_view = model.mul(&view);
        self.projection = projection;
        self.normal_matrix = self.model_view.upper_left_3x3().transposed_inverse();
        self.update_all_lights();
    }

    /// Diffuse/specular in every processed light are pre-modulated by the
    /// material, so changing it re-derives all of them.
    pub fn use_material(&mut self, m: Material) {
        self.material = m;
        self.update_all_lights();
    }

    pub fn material(&self) -> Material {
        self.material
    }

    /// Reallocates both the authored and processed light arrays to length
    /// `n`, copying `src` (or leaving a default light if `src` is `None`).
    pub fn set_lights(&mut self, n: usize, src: Option<&[Light]>) -> Result<()> {
        if n == 0 {
            return Err(RasterError::EmptyLights);
        }

        let default_light = Light {
            pos: Vec3::zero(),
            ambient: Color::BLACK,
            diffuse: Color::BLACK,
            specular: Color::BLACK,
        };

        self.lights = match src {
            Some(src) => src.to_vec(),
            None => vec![default_light; n],
        };
        self.processed_lights = vec![
            ProcessedLight {
                pos: Vec3::zero(),
                ambient: Color::BLACK,
                diffuse: Color::BLACK,
                specular: Color::BLACK,
            };
            n
        ];

        self.update_all_lights();
        Ok(())
    }

    pub fn set_light(&mut self, i: usize, light: Light) {
        self.lights[i] = light;
        self.update_light(i);
    }

    pub fn get_light(&self, i: usize) -> Light {
        self.lights[i]
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn processed_lights(&self) -> &[ProcessedLight] {
        &self.processed_lights
    }

    pub fn set_lighting(&mut self, on: bool) {
        self.lighting = on;
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    pub fn set_blend_function(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.blend_src = src;
        self.blend_dst = dst;
    }

    pub fn blend_function(&self) -> (BlendFactor, BlendFactor) {
        (self.blend_src, self.blend_dst)
    }

    pub fn set_depth_func(&mut self, f: DepthFunc) {
        self.depth_func = f;
    }

    pub fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    pub fn set_depth_test(&mut self, on: bool) {
        self.depth_test = on;
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn set_culling(&mut self, on: bool) {
        self.culling = on;
    }

    pub fn culling(&self) -> bool {
        self.culling
    }

    fn update_all_lights(&mut self) {
        for i in 0..self.lights.len() {
            self.update_light(i);
        }
    }

    /// Re-derives `processed_lights[i]` from the *authored* light — always
    /// starting from `lights[i].pos` rather than re-transforming the
    /// already-processed position, so repeated calls don't compound. Only
    /// diffuse/specular get material-modulated; ambient passes through
    /// untouched.
    fn update_light(&mut self, i: usize) {
        trace!("re-deriving processed light {i}");
        let light = self.lights[i];
        self.processed_lights[i] = ProcessedLight {
            pos: self.model_view.apply(light.pos),
            ambient: light.ambient,
            diffuse: self.material.diffuse.modulate(light.diffuse),
            specular: self.material.specular.modulate(light.specular),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_mvp_recomputes_normal_matrix() {
        let mut state = RendererState::default();
        state.set_mvp(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(state.normal_matrix, crate::matrix::Mat3::IDENTITY);
    }

    #[test]
    fn set_lights_rejects_zero() {
        let mut state = RendererState::default();
        assert!(state.set_lights(0, None).is_err());
    }

    #[test]
    fn use_material_remodulates_existing_lights() {
        let mut state = RendererState::default();
        let light = Light {
            pos: Vec3::zero(),
            ambient: Color::new(1, 1, 1, 255),
            diffuse: Color::new(200, 200, 200, 255),
            specular: Color::BLACK,
        };
        state.set_lights(1, Some(&[light])).unwrap();

        state.use_material(Material {
            diffuse: Color::new(128, 128, 128, 255),
            ..Material::default()
        });

        // 200 * 128 / 255 ~= 100
        assert_eq!(state.processed_lights()[0].diffuse.r, 100);
    }

    #[test]
    fn set_light_recomputes_only_that_slot() {
        let mut state = RendererState::default();
        state.set_lights(2, None).unwrap();
        state.set_light(
            1,
            Light {
                pos: Vec3::new(1.0, 2.0, 3.0),
                ambient: Color::WHITE,
                diffuse: Color::WHITE,
                specular: Color::WHITE,
            },
        );
        assert_eq!(state.processed_lights()[1].pos, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.processed_lights()[0].pos, Vec3::zero());
    }
}
