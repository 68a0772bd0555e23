//! An RGBA8 texture plane, reusing the codec module for I/O.

use log::debug;

use crate::codec::{self, ColorFormat, PixelBuf, PixelBufMut};
use crate::color::Color;
use crate::error::{RasterError, Result};
use crate::vector::Vec2;

pub struct Texture {
    width: usize,
    height: usize,
    data: Vec<Color>,
}

impl Texture {
    pub fn new(
        width: usize,
        height: usize,
        format: ColorFormat,
        buffer: PixelBuf,
    ) -> Result<Texture> {
        if width == 0 || height == 0 {
            return Err(RasterError::Allocation { what: "texture" });
        }

        debug!("allocating {width}x{height} texture");

        let mut tex = Texture {
            width,
            height,
            data: vec![Color::BLACK; width * height],
        };
        tex.write(0, 0, width, height, format, buffer);
        Ok(tex)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn write(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        format: ColorFormat,
        buffer: PixelBuf,
    ) {
        codec::write_region(&mut self.data, self.width, x, y, w, h, format, buffer);
    }

    pub fn read(
        &self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        format: ColorFormat,
        buffer: PixelBufMut,
    ) -> Result<()> {
        codec::read_region(&self.data, self.width, x, y, w, h, format, buffer)
    }

    /// Nearest-neighbor sample. Returns white when `(u, v)` falls outside
    /// `[0, 1]^2` — there is no wrap/clamp/mirror mode.
    pub fn sample(&self, uv: Vec2) -> Color {
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return Color::WHITE;
        }

        let x = (uv.x * (self.width - 1) as f32).floor() as usize;
        let y = (uv.y * (self.height - 1) as f32).floor() as usize;
        self.data[x + y * self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: usize, h: usize) -> Texture {
        let mut buf = vec![0u8; w * h * 4];
        for y in 0..h {
            for x in 0..w {
                let i = (x + y * w) * 4;
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                buf[i] = v;
                buf[i + 1] = v;
                buf[i + 2] = v;
                buf[i + 3] = 255;
            }
        }
        Texture::new(w, h, ColorFormat::Rgba, PixelBuf::Byte(&buf)).unwrap()
    }

    #[test]
    fn sample_outside_unit_square_is_white() {
        let tex = checker(4, 4);
        assert_eq!(tex.sample(Vec2::new(-0.1, 0.5)), Color::WHITE);
        assert_eq!(tex.sample(Vec2::new(1.1, 0.5)), Color::WHITE);
    }

    #[test]
    fn sample_is_nearest_neighbor() {
        let tex = checker(2, 2);
        assert_eq!(tex.sample(Vec2::new(0.0, 0.0)), Color::new(255, 255, 255, 255));
        assert_eq!(tex.sample(Vec2::new(1.0, 0.0)), Color::new(0, 0, 0, 255));
    }

    #[test]
    fn zero_sized_texture_is_rejected() {
        let buf: [u8; 0] = [];
        assert!(Texture::new(0, 4, ColorFormat::Rgba, PixelBuf::Byte(&buf)).is_err());
    }
}
