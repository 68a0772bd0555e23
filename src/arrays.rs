//! Host-side vertex and index storage. Bounds are the caller's
//! responsibility: an out-of-bounds `write`/`read` panics via slice
//! indexing rather than silently corrupting adjacent storage.

use crate::color::Color;
use crate::vector::{Vec2, Vec3};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Vertex {
    pub pos: Vec3,
    pub normal: Vec3,
    pub color: Color,
    pub tex_coord: Vec2,
}

pub struct VertexArray {
    data: Vec<Vertex>,
}

impl VertexArray {
    pub fn new(n: usize, data: Option<&[Vertex]>) -> VertexArray {
        let mut array = VertexArray {
            data: vec![
                Vertex {
                    pos: Vec3::zero(),
                    normal: Vec3::zero(),
                    color: Color::WHITE,
                    tex_coord: Vec2::zero(),
                };
                n
            ],
        };
        if let Some(src) = data {
            array.write(0, src);
        }
        array
    }

    pub fn write(&mut self, offset: usize, src: &[Vertex]) {
        self.data[offset..offset + src.len()].copy_from_slice(src);
    }

    pub fn read(&self, offset: usize, dst: &mut [Vertex]) {
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.data
    }
}

pub struct IndexArray {
    data: Vec<u32>,
}

impl IndexArray {
    pub fn new(n: usize, data: Option<&[u32]>) -> IndexArray {
        let mut array = IndexArray { data: vec![0; n] };
        if let Some(src) = data {
            array.write(0, src);
        }
        array
    }

    pub fn write(&mut self, offset: usize, src: &[u32]) {
        self.data[offset..offset + src.len()].copy_from_slice(src);
    }

    pub fn read(&self, offset: usize, dst: &mut [u32]) {
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }
}
