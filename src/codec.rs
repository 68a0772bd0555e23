//! Pixel-format codec: packs/unpacks a rectangular region of a canonical
//! RGBA8 grid against external buffers in `{Gray, RGB, RGBA} x {Byte, Float}`.
//! Shared by both the framebuffer's color plane and texture planes, since
//! both need exactly the same region read/write logic.

use crate::color::{clamp_to_u8, Color};
use crate::error::{RasterError, Result};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorFormat {
    Gray,
    Rgb,
    Rgba,
}

impl ColorFormat {
    pub fn channels(self) -> usize {
        match self {
            ColorFormat::Gray => 1,
            ColorFormat::Rgb => 3,
            ColorFormat::Rgba => 4,
        }
    }
}

/// Either a byte or float external pixel buffer, borrowed for the
/// duration of a codec call. The numeric type (`ColorType` in the
/// external interface) is folded into which variant the caller picks,
/// rather than carried as a separate redundant tag.
pub enum PixelBuf<'a> {
    Byte(&'a [u8]),
    Float(&'a [f32]),
}

pub enum PixelBufMut<'a> {
    Byte(&'a mut [u8]),
    Float(&'a mut [f32]),
}

/// Write a `w x h` region of `buffer` (in `format`/`ty`) into `grid` (a
/// canonical RGBA8 plane of size `buf_w x buf_h`), starting at `(x, y)`.
pub fn write_region(
    grid: &mut [Color],
    buf_w: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    format: ColorFormat,
    buffer: PixelBuf,
) {
    let channels = format.channels();

    match buffer {
        PixelBuf::Byte(buffer) => {
            for j in 0..h {
                for i in 0..w {
                    let pixel = &mut grid[(x + i) + (y + j) * buf_w];
                    let data = &buffer[(i + w * j) * channels..];
                    *pixel = decode_byte(format, data);
                }
            }
        }
        PixelBuf::Float(buffer) => {
            for j in 0..h {
                for i in 0..w {
                    let pixel = &mut grid[(x + i) + (y + j) * buf_w];
                    let data = &buffer[(i + w * j) * channels..];
                    *pixel = decode_float(format, data);
                }
            }
        }
    }
}

fn decode_byte(format: ColorFormat, data: &[u8]) -> Color {
    match format {
        ColorFormat::Gray => Color::new(data[0], data[0], data[0], 255),
        ColorFormat::Rgb => Color::new(data[0], data[1], data[2], 255),
        ColorFormat::Rgba => Color::new(data[0], data[1], data[2], data[3]),
    }
}

fn decode_float(format: ColorFormat, data: &[f32]) -> Color {
    match format {
        ColorFormat::Gray => {
            let v = clamp_to_u8(data[0] * 255.0);
            Color::new(v, v, v, 255)
        }
        ColorFormat::Rgb => Color::new(
            clamp_to_u8(data[0] * 255.0),
            clamp_to_u8(data[1] * 255.0),
            clamp_to_u8(data[2] * 255.0),
            255,
        ),
        ColorFormat::Rgba => Color::new(
            clamp_to_u8(data[0] * 255.0),
            clamp_to_u8(data[1] * 255.0),
            clamp_to_u8(data[2] * 255.0),
            clamp_to_u8(data[3] * 255.0),
        ),
    }
}

/// Read a `w x h` region out of `grid` into `buffer` (in `format`/`ty`).
///
/// Reading into `ColorFormat::Gray` is explicitly unsupported and fails
/// with `RasterError::UnsupportedCodecPath` rather than silently no-oping.
pub fn read_region(
    grid: &[Color],
    buf_w: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    format: ColorFormat,
    buffer: PixelBufMut,
) -> Result<()> {
    if format == ColorFormat::Gray {
        return Err(RasterError::UnsupportedCodecPath);
    }

    let channels = format.channels();

    match buffer {
        PixelBufMut::Byte(buffer) => {
            for j in 0..h {
                for i in 0..w {
                    let pixel = &grid[(x + i) + (y + j) * buf_w];
                    let data = &mut buffer[(i + w * j) * channels..];
                    encode_byte(format, *pixel, data);
                }
            }
        }
        PixelBufMut::Float(buffer) => {
            for j in 0..h {
                for i in 0..w {
                    let pixel = &grid[(x + i) + (y + j) * buf_w];
                    let data = &mut buffer[(i + w * j) * channels..];
                    encode_float(format, *pixel, data);
                }
            }
        }
    }

    Ok(())
}

fn encode_byte(format: ColorFormat, pixel: Color, data: &mut [u8]) {
    match format {
        ColorFormat::Gray => unreachable!("checked by caller"),
        ColorFormat::Rgb => {
            data[0] = pixel.r;
            data[1] = pixel.g;
            data[2] = pixel.b;
        }
        ColorFormat::Rgba => {
            data[0] = pixel.r;
            data[1] = pixel.g;
            data[2] = pixel.b;
            data[3] = pixel.a;
        }
    }
}

fn encode_float(format: ColorFormat, pixel: Color, data: &mut [f32]) {
    match format {
        ColorFormat::Gray => unreachable!("checked by caller"),
        ColorFormat::Rgb => {
            data[0] = pixel.r as f32 / 255.0;
            data[1] = pixel.g as f32 / 255.0;
            data[2] = pixel.b as f32 / 255.0;
        }
        ColorFormat::Rgba => {
            data[0] = pixel.r as f32 / 255.0;
            data[1] = pixel.g as f32 / 255.0;
            data[2] = pixel.b as f32 / 255.0;
            data[3] = pixel.a as f32 / 255.0;
        }
    }
}
