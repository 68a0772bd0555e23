//! A software 3D rasterizer: indexed triangle meshes with per-vertex
//! attributes in, an RGBA8 framebuffer out, via a fixed Phong-style shading
//! pipeline with depth test and backface culling.
//!
//! See [`raster::Renderer`] for the entry point.

pub mod arrays;
pub mod codec;
pub mod color;
pub mod error;
pub mod framebuffer;
pub mod matrix;
pub mod raster;
pub mod state;
pub mod texture;
pub mod vector;

pub use arrays::{IndexArray, Vertex, VertexArray};
pub use codec::{ColorFormat, PixelBuf, PixelBufMut};
pub use color::Color;
pub use error::{RasterError, Result};
pub use framebuffer::Framebuffer;
pub use matrix::{Mat3, Mat4};
pub use raster::{DrawMode, Renderer};
pub use state::{BlendFactor, DepthFunc, Light, Material, ProcessedLight, RendererState};
pub use texture::Texture;
pub use vector::{Vec2, Vec3, Vec4};
