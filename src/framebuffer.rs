//! Owns the color (RGBA8) and depth (f32) planes a renderer draws into.

use log::debug;

use crate::codec::{self, ColorFormat, PixelBufMut};
use crate::color::Color;
use crate::error::{RasterError, Result};

pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<Color>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Result<Framebuffer> {
        if width == 0 || height == 0 {
            return Err(RasterError::Allocation { what: "framebuffer" });
        }

        debug!("allocating {width}x{height} framebuffer");

        Ok(Framebuffer {
            width,
            height,
            color: vec![Color::BLACK; width * height],
            depth: vec![0.0; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear_color(&mut self, c: Color) {
        self.color.fill(c);
    }

    pub fn clear_depth(&mut self, z: f32) {
        self.depth.fill(z);
    }

    pub(crate) fn color_mut(&mut self) -> &mut [Color] {
        &mut self.color
    }

    pub(crate) fn depth_mut(&mut self) -> &mut [f32] {
        &mut self.depth
    }

    pub(crate) fn color(&self) -> &[Color] {
        &self.color
    }

    pub(crate) fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub fn read_color(
        &self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        format: ColorFormat,
        buffer: PixelBufMut,
    ) -> Result<()> {
        codec::read_region(&self.color, self.width, x, y, w, h, format, buffer)
    }

    pub fn read_depth(&self, x: usize, y: usize, w: usize, h: usize, buffer: &mut [f32]) {
        for j in 0..h {
            for i in 0..w {
                buffer[i + j * w] = self.depth[(x + i) + (y + j) * self.width];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_fills_every_sample() {
        let mut fb = Framebuffer::new(3, 3).unwrap();
        fb.clear_color(Color::new(1, 2, 3, 4));
        assert!(fb.color().iter().all(|&c| c == Color::new(1, 2, 3, 4)));
    }

    #[test]
    fn clear_depth_fills_every_sample() {
        let mut fb = Framebuffer::new(3, 3).unwrap();
        fb.clear_depth(1.0);
        assert!(fb.depth().iter().all(|&z| z == 1.0));
    }

    #[test]
    fn zero_sized_framebuffer_is_rejected() {
        assert!(Framebuffer::new(0, 4).is_err());
        assert!(Framebuffer::new(4, 0).is_err());
    }

    #[test]
    fn read_depth_copies_a_subregion() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                fb.depth_mut()[x + y * 4] = (x + y * 4) as f32;
            }
        }
        let mut out = [0.0f32; 4];
        fb.read_depth(1, 1, 2, 2, &mut out);
        assert_eq!(out, [5.0, 6.0, 9.0, 10.0]);
    }
}
