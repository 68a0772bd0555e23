//! The rasterization core: vertex stage, triangle assembly, backface
//! cull, scanline fill, perspective-correct interpolation, depth test and
//! Phong fragment shading.

use log::trace;

use crate::arrays::{IndexArray, Vertex, VertexArray};
use crate::color::{clamp_to_u8, Color};
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::state::{DepthFunc, Material, RendererState};
use crate::texture::Texture;
use crate::vector::{Vec2, Vec3};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawMode {
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Clone, Copy, Debug)]
struct ProcessedVertex {
    eye: Vec3,
    normal: Vec3,
    base_color: Color,
    tex_coord: Vec2,
    ndc: Vec3,
    w: f32,
    done: bool,
}

impl Default for ProcessedVertex {
    fn default() -> ProcessedVertex {
        ProcessedVertex {
            eye: Vec3::zero(),
            normal: Vec3::zero(),
            base_color: Color::BLACK,
            tex_coord: Vec2::zero(),
            ndc: Vec3::zero(),
            w: 1.0,
            done: false,
        }
    }
}

/// The rasterizer. Owns its configuration state and a scratch
/// processed-vertex table that grows monotonically across draws; the
/// framebuffer is threaded explicitly through each draw call instead of
/// being stashed as a long-lived reference, and a texture binding is
/// held as an optional borrow for the lifetime `'tex`.
pub struct Renderer<'tex> {
    state: RendererState,
    texture: Option<&'tex Texture>,
    scratch: Vec<ProcessedVertex>,
    #[cfg(test)]
    vertex_invocations: std::cell::Cell<u32>,
}

impl<'tex> Renderer<'tex> {
    pub fn new() -> Renderer<'tex> {
        Renderer {
            state: RendererState::default(),
            texture: None,
            scratch: Vec::new(),
            #[cfg(test)]
            vertex_invocations: std::cell::Cell::new(0),
        }
    }

    pub fn use_texture(&mut self, texture: Option<&'tex Texture>) {
        self.texture = texture;
    }

    pub fn set_mvp(&mut self, model: crate::matrix::Mat4, view: crate::matrix::Mat4, projection: crate::matrix::Mat4) {
        self.state.set_mvp(model, view, projection);
    }

    pub fn use_material(&mut self, m: Material) {
        self.state.use_material(m);
    }

    pub fn set_lights(&mut self, n: usize, src: Option<&[crate::state::Light]>) -> Result<()> {
        self.state.set_lights(n, src)
    }

    pub fn set_light(&mut self, i: usize, light: crate::state::Light) {
        self.state.set_light(i, light);
    }

    pub fn get_light(&self, i: usize) -> crate::state::Light {
        self.state.get_light(i)
    }

    pub fn set_lighting(&mut self, on: bool) {
        self.state.set_lighting(on);
    }

    pub fn set_depth_func(&mut self, f: DepthFunc) {
        self.state.set_depth_func(f);
    }

    pub fn set_depth_test(&mut self, on: bool) {
        self.state.set_depth_test(on);
    }

    pub fn set_blend_function(&mut self, src: crate::state::BlendFactor, dst: crate::state::BlendFactor) {
        self.state.set_blend_function(src, dst);
    }

    pub fn set_culling(&mut self, on: bool) {
        self.state.set_culling(on);
    }

    /// Processes `vertices[first..first+count)` and writes results at
    /// scratch offset `first + k` for the k-th vertex processed.
    pub fn draw_array(
        &mut self,
        mode: DrawMode,
        array: &VertexArray,
        first: usize,
        count: usize,
        framebuffer: &mut Framebuffer,
    ) -> Result<()> {
        self.ensure_scratch(first + count);

        let src = array.as_slice();
        for k in 0..count {
            self.scratch[first + k] = self.process_vertex(&src[first + k]);
        }

        let ids: Vec<usize> = (first..first + count).collect();
        self.emit_triangles(mode, &ids, framebuffer);
        Ok(())
    }

    /// Processes `vertices[idx]` for each index in `indices[first..first+count)`,
    /// memoizing per-index vertex shading via the scratch table's `done` flag.
    pub fn draw_elements(
        &mut self,
        mode: DrawMode,
        indices: &IndexArray,
        array: &VertexArray,
        first: usize,
        count: usize,
        framebuffer: &mut Framebuffer,
    ) -> Result<()> {
        let vertex_count = array.len();
        self.ensure_scratch(vertex_count);
        for entry in &mut self.scratch[..vertex_count] {
            entry.done = false;
        }

        let src = array.as_slice();
        let mut idx_buf = [0u32; 1];
        let ids: Vec<usize> = (first..first + count)
            .map(|i| {
                indices.read(i, &mut idx_buf);
                idx_buf[0] as usize
            })
            .collect();

        for &idx in &ids {
            if !self.scratch[idx].done {
                self.scratch[idx] = self.process_vertex(&src[idx]);
            }
        }

        self.emit_triangles(mode, &ids, framebuffer);
        Ok(())
    }

    fn ensure_scratch(&mut self, min_len: usize) {
        if self.scratch.len() < min_len {
            self.scratch.resize(min_len, ProcessedVertex::default());
        }
    }

    fn process_vertex(&self, v: &Vertex) -> ProcessedVertex {
        #[cfg(test)]
        self.vertex_invocations.set(self.vertex_invocations.get() + 1);

        let pos_eye = self.state.model_view.apply(v.pos);
        let eye = -pos_eye;
        let normal = self.state.normal_matrix.apply(v.normal).normalize();
        let projected = self.state.projection.project(pos_eye);

        ProcessedVertex {
            eye,
            normal,
            base_color: v.color,
            tex_coord: v.tex_coord,
            ndc: Vec3::new(
                projected.x / projected.w,
                projected.y / projected.w,
                projected.z / projected.w,
            ),
            w: projected.w,
            done: true,
        }
    }

    /// Triangle assembly over a logical index sequence (scratch positions
    /// for `draw_array`, resolved index values for `draw_elements`).
    fn emit_triangles(&self, mode: DrawMode, ids: &[usize], framebuffer: &mut Framebuffer) {
        let n = ids.len();
        match mode {
            DrawMode::Triangles => {
                let mut i = 0;
                while i + 2 < n {
                    self.emit_triangle([ids[i], ids[i + 1], ids[i + 2]], framebuffer);
                    i += 3;
                }
            }
            DrawMode::TriangleStrip => {
                if n < 3 {
                    return;
                }
                self.emit_triangle([ids[0], ids[1], ids[2]], framebuffer);
                for i in 3..n {
                    self.emit_triangle([ids[i - 1], ids[i - 2], ids[i]], framebuffer);
                }
            }
            DrawMode::TriangleFan => {
                if n < 3 {
                    return;
                }
                let first = ids[0];
                for i in 2..n {
                    self.emit_triangle([first, ids[i - 1], ids[i]], framebuffer);
                }
            }
        }
    }

    /// Cull, screen mapping, scanline fill, perspective-correct
    /// interpolation, depth test, fragment shading, in that order.
    fn emit_triangle(&self, tri_ids: [usize; 3], framebuffer: &mut Framebuffer) {
        let tri = [self.scratch[tri_ids[0]], self.scratch[tri_ids[1]], self.scratch[tri_ids[2]]];

        let ndc_det = signed_area(
            (tri[0].ndc.x, tri[0].ndc.y),
            (tri[1].ndc.x, tri[1].ndc.y),
            (tri[2].ndc.x, tri[2].ndc.y),
        );
        if self.state.culling && ndc_det > 0.0 {
            return;
        }

        let fb_w = framebuffer.width() as f32;
        let fb_h = framebuffer.height() as f32;

        // NDC maps to integer pixel coordinates; no sub-pixel precision is
        // retained past this point.
        let mut pts: Vec<(i32, i32, ProcessedVertex)> = tri
            .iter()
            .map(|v| {
                (
                    ((v.ndc.x + 1.0) * fb_w / 2.0) as i32,
                    ((v.ndc.y + 1.0) * fb_h / 2.0) as i32,
                    *v,
                )
            })
            .collect();

        // 3-pass bubble sort by y ascending, swapping screen coords and the
        // processed vertex together.
        for _ in 0..3 {
            for i in 0..2 {
                if pts[i].1 > pts[i + 1].1 {
                    pts.swap(i, i + 1);
                }
            }
        }

        let (x0, y0, p0) = pts[0];
        let (x1, y1, p1) = pts[1];
        let (x2, y2, p2) = pts[2];

        if y0 == y2 {
            trace!("skipping degenerate triangle");
            return;
        }

        // All arithmetic past this point is float, but it operates on the
        // already-truncated integer screen coordinates above.
        let (x0f, y0f) = (x0 as f32, y0 as f32);
        let (x1f, y1f) = (x1 as f32, y1 as f32);
        let (x2f, y2f) = (x2 as f32, y2 as f32);

        let screen_det = signed_area((x0f, y0f), (x1f, y1f), (x2f, y2f));
        if screen_det == 0.0 {
            trace!("skipping zero-area triangle");
            return;
        }

        if y0 != y1 {
            let dxdy_01 = (x0f - x1f) / (y0f - y1f);
            let dxdy_02 = (x0f - x2f) / (y0f - y2f);
            self.fill_rows(
                y0, y1, x0f, y0f, dxdy_01, dxdy_02, (x0f, y0f, p0), (x1f, y1f, p1), (x2f, y2f, p2),
                screen_det, framebuffer,
            );
        }
        if y1 != y2 {
            let dxdy_12 = (x1f - x2f) / (y1f - y2f);
            let dxdy_02 = (x0f - x2f) / (y0f - y2f);
            self.fill_rows(
                y1, y2, x1f, y1f, dxdy_12, dxdy_02, (x0f, y0f, p0), (x1f, y1f, p1), (x2f, y2f, p2),
                screen_det, framebuffer,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_rows(
        &self,
        y_start: i32,
        y_end: i32,
        x_origin_a: f32,
        y_origin: f32,
        dxdy_a: f32,
        dxdy_b: f32,
        p0: (f32, f32, ProcessedVertex),
        p1: (f32, f32, ProcessedVertex),
        p2: (f32, f32, ProcessedVertex),
        det: f32,
        framebuffer: &mut Framebuffer,
    ) {
        let fb_w = framebuffer.width();
        let fb_h = framebuffer.height();

        let y_lo = y_start.max(0);
        let y_hi = y_end.min(fb_h as i32 - 1);

        for y in y_lo..=y_hi {
            let yf = y as f32;
            let x_a = x_origin_a + dxdy_a * (yf - y_origin);
            let x_b = p0.0 + dxdy_b * (yf - y_origin);
            let (x_left, x_right) = if x_a < x_b { (x_a, x_b) } else { (x_b, x_a) };

            let x_lo = x_left.max(0.0) as i32;
            let x_hi = (x_right.min(fb_w as f32 - 1.0)) as i32;

            for x in x_lo..=x_hi {
                self.shade_pixel(x as usize, y as usize, (x as f32, yf), p0, p1, p2, det, framebuffer);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn shade_pixel(
        &self,
        x: usize,
        y: usize,
        pixel: (f32, f32),
        p0: (f32, f32, ProcessedVertex),
        p1: (f32, f32, ProcessedVertex),
        p2: (f32, f32, ProcessedVertex),
        det: f32,
        framebuffer: &mut Framebuffer,
    ) {
        let (s, t, u) = barycentric(pixel, (p0.0, p0.1), (p1.0, p1.1), (p2.0, p2.1), det);

        // NDC position is interpolated linearly (wfactor = 1), unlike every
        // other attribute: perspective-divided positions already vary
        // linearly in screen space.
        let ndc_z = s * p0.2.ndc.z + t * p1.2.ndc.z + u * p2.2.ndc.z;

        let fb_w = framebuffer.width();
        let idx = x + y * fb_w;

        if self.state.depth_test {
            let dst = framebuffer.depth()[idx];
            if !depth_passes(self.state.depth_func, ndc_z, dst) {
                return;
            }
            framebuffer.depth_mut()[idx] = ndc_z;
        }

        let w0 = p0.2.w;
        let w1 = p1.2.w;
        let w2 = p2.2.w;
        let wfactor = s / w0 + t / w1 + u / w2;
        let (s2, t2, u2) = (s / w0 / wfactor, t / w1 / wfactor, u / w2 / wfactor);

        let normal = interp_vec3(p0.2.normal, p1.2.normal, p2.2.normal, s2, t2, u2).normalize();
        let eye = interp_vec3(p0.2.eye, p1.2.eye, p2.2.eye, s2, t2, u2).normalize();
        let tex_coord = interp_vec2(p0.2.tex_coord, p1.2.tex_coord, p2.2.tex_coord, s2, t2, u2);
        let base_color = interp_color(p0.2.base_color, p1.2.base_color, p2.2.base_color, s2, t2, u2);

        let tex_color = match self.texture {
            Some(tex) => tex.sample(tex_coord),
            None => Color::WHITE,
        };

        let light = if self.state.lighting {
            self.shade_phong(normal, eye)
        } else {
            Color::WHITE
        };

        let out = Color::new(
            compose_channel(base_color.r, tex_color.r, light.r),
            compose_channel(base_color.g, tex_color.g, light.g),
            compose_channel(base_color.b, tex_color.b, light.b),
            clamp_to_u8(base_color.a as f32 * tex_color.a as f32 / 255.0),
        );

        framebuffer.color_mut()[idx] = out;
    }

    /// Uses a half-vector-like light direction `normalize(eye + light_pos)`
    /// rather than a true light vector `normalize(light_pos - fragment_pos)`.
    /// Deliberate, not textbook Phong: it's what every caller of this
    /// renderer has tuned their scenes against.
    fn shade_phong(&self, normal: Vec3, eye: Vec3) -> Color {
        let mut r = 0.0f32;
        let mut g = 0.0f32;
        let mut b = 0.0f32;

        for light in self.state.processed_lights() {
            let n = normal;
            let e = eye;
            let l = (e + light.pos).normalize();
            let refl = (-l).reflect(n);

            let diffuse_coef = (-l.dot(n)).max(0.0);
            let spec_coef = refl.dot(e).max(0.0).powf(self.state.material.specular_power);

            r += light.ambient.r as f32 + diffuse_coef * light.diffuse.r as f32 + spec_coef * light.specular.r as f32;
            g += light.ambient.g as f32 + diffuse_coef * light.diffuse.g as f32 + spec_coef * light.specular.g as f32;
            b += light.ambient.b as f32 + diffuse_coef * light.diffuse.b as f32 + spec_coef * light.specular.b as f32;
        }

        Color::new(clamp_to_u8(r), clamp_to_u8(g), clamp_to_u8(b), 255)
    }
}

impl<'tex> Default for Renderer<'tex> {
    fn default() -> Renderer<'tex> {
        Renderer::new()
    }
}

fn signed_area(p0: (f32, f32), p1: (f32, f32), p2: (f32, f32)) -> f32 {
    p0.0 * (p1.1 - p2.1) + p1.0 * (p2.1 - p0.1) + p2.0 * (p0.1 - p1.1)
}

fn barycentric(p: (f32, f32), p0: (f32, f32), p1: (f32, f32), p2: (f32, f32), det: f32) -> (f32, f32, f32) {
    let s = (p.0 * (p1.1 - p2.1) + p1.0 * (p2.1 - p.1) + p2.0 * (p.1 - p1.1)) / det;
    let t = (p0.0 * (p.1 - p2.1) + p.0 * (p2.1 - p0.1) + p2.0 * (p0.1 - p.1)) / det;
    let u = 1.0 - s - t;
    (s, t, u)
}

fn depth_passes(f: DepthFunc, src: f32, dst: f32) -> bool {
    match f {
        DepthFunc::Never => false,
        DepthFunc::Always => true,
        DepthFunc::Eq => src == dst,
        DepthFunc::Lt => src < dst,
        DepthFunc::Le => src <= dst,
        DepthFunc::Gt => src > dst,
        DepthFunc::Ge => src >= dst,
    }
}

fn interp_vec3(a0: Vec3, a1: Vec3, a2: Vec3, s: f32, t: f32, u: f32) -> Vec3 {
    a0 * s + a1 * t + a2 * u
}

fn interp_vec2(a0: Vec2, a1: Vec2, a2: Vec2, s: f32, t: f32, u: f32) -> Vec2 {
    a0 * s + a1 * t + a2 * u
}

fn interp_color(a0: Color, a1: Color, a2: Color, s: f32, t: f32, u: f32) -> Color {
    Color::new(
        clamp_to_u8(a0.r as f32 * s + a1.r as f32 * t + a2.r as f32 * u),
        clamp_to_u8(a0.g as f32 * s + a1.g as f32 * t + a2.g as f32 * u),
        clamp_to_u8(a0.b as f32 * s + a1.b as f32 * t + a2.b as f32 * u),
        clamp_to_u8(a0.a as f32 * s + a1.a as f32 * t + a2.a as f32 * u),
    )
}

fn compose_channel(base: u8, tex: u8, light: u8) -> u8 {
    clamp_to_u8(base as f32 * tex as f32 * light as f32 / (255.0 * 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::{IndexArray, Vertex, VertexArray};
    use crate::color::Color;
    use crate::vector::{Vec2, Vec3};

    fn vtx(pos: Vec3, color: Color) -> Vertex {
        Vertex {
            pos,
            normal: Vec3::new(0.0, 0.0, 1.0),
            color,
            tex_coord: Vec2::zero(),
        }
    }

    #[test]
    fn front_facing_triangle_covers_center_pixel() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear_color(Color::BLACK);
        fb.clear_depth(1.0);

        let verts = [
            vtx(Vec3::new(-1.0, -1.0, 0.0), Color::new(255, 0, 0, 255)),
            vtx(Vec3::new(1.0, -1.0, 0.0), Color::new(255, 0, 0, 255)),
            vtx(Vec3::new(0.0, 1.0, 0.0), Color::new(255, 0, 0, 255)),
        ];
        let array = VertexArray::new(3, Some(&verts));

        let mut renderer = Renderer::new();
        renderer.set_depth_test(true);
        renderer.set_depth_func(DepthFunc::Le);

        renderer
            .draw_array(DrawMode::Triangles, &array, 0, 3, &mut fb)
            .unwrap();

        let center = fb.color()[2 + 2 * 4];
        assert_eq!(center, Color::new(255, 0, 0, 255));

        let mut depth = [0.0f32; 1];
        fb.read_depth(2, 2, 1, 1, &mut depth);
        assert!((depth[0] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn backface_cull_discards_reversed_winding() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear_color(Color::BLACK);

        let verts = [
            vtx(Vec3::new(1.0, -1.0, 0.0), Color::new(255, 0, 0, 255)),
            vtx(Vec3::new(-1.0, -1.0, 0.0), Color::new(255, 0, 0, 255)),
            vtx(Vec3::new(0.0, 1.0, 0.0), Color::new(255, 0, 0, 255)),
        ];
        let array = VertexArray::new(3, Some(&verts));

        let mut renderer = Renderer::new();
        renderer.set_culling(true);

        renderer
            .draw_array(DrawMode::Triangles, &array, 0, 3, &mut fb)
            .unwrap();

        assert!(fb.color().iter().all(|&c| c == Color::BLACK));
    }

    #[test]
    fn depth_test_lt_discards_equal_depth_redraw() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear_color(Color::BLACK);
        fb.clear_depth(1.0);

        let verts = [
            vtx(Vec3::new(-1.0, -1.0, 0.0), Color::new(255, 0, 0, 255)),
            vtx(Vec3::new(1.0, -1.0, 0.0), Color::new(255, 0, 0, 255)),
            vtx(Vec3::new(0.0, 1.0, 0.0), Color::new(255, 0, 0, 255)),
        ];
        let array = VertexArray::new(3, Some(&verts));

        let mut renderer = Renderer::new();
        renderer.set_depth_test(true);
        renderer.set_depth_func(DepthFunc::Lt);

        renderer.draw_array(DrawMode::Triangles, &array, 0, 3, &mut fb).unwrap();

        // Overwrite with a different color; second draw is at equal depth
        // and must be discarded under LT.
        let verts2 = [
            vtx(Vec3::new(-1.0, -1.0, 0.0), Color::new(0, 255, 0, 255)),
            vtx(Vec3::new(1.0, -1.0, 0.0), Color::new(0, 255, 0, 255)),
            vtx(Vec3::new(0.0, 1.0, 0.0), Color::new(0, 255, 0, 255)),
        ];
        let array2 = VertexArray::new(3, Some(&verts2));
        renderer.draw_array(DrawMode::Triangles, &array2, 0, 3, &mut fb).unwrap();

        assert_eq!(fb.color()[2 + 2 * 4], Color::new(255, 0, 0, 255));
    }

    #[test]
    fn phong_lighting_matches_mirrored_half_vector_formula() {
        let mut fb = Framebuffer::new(1, 1).unwrap();
        fb.clear_color(Color::BLACK);

        let verts = [
            vtx(Vec3::new(-1.0, -1.0, 0.0), Color::WHITE),
            vtx(Vec3::new(1.0, -1.0, 0.0), Color::WHITE),
            vtx(Vec3::new(0.0, 1.0, 0.0), Color::WHITE),
        ];
        let array = VertexArray::new(3, Some(&verts));

        let mut renderer = Renderer::new();
        renderer.set_lighting(true);
        renderer.use_material(Material {
            diffuse: Color::new(255, 255, 255, 255),
            ..Material::default()
        });
        renderer
            .set_lights(
                1,
                Some(&[crate::state::Light {
                    pos: Vec3::new(0.0, 0.0, 1.0),
                    ambient: Color::new(10, 10, 10, 255),
                    diffuse: Color::new(200, 0, 0, 255),
                    specular: Color::BLACK,
                }]),
            )
            .unwrap();

        renderer.draw_array(DrawMode::Triangles, &array, 0, 3, &mut fb).unwrap();

        // l = normalize(normalize(eye) + (0,0,1)); with eye ~= (0,0,1) (a
        // point near the origin looking down +z in eye space after the
        // vertex stage's `-pos_eye`), l ~= (0,0,1) == n, so diffuse_coef ~=
        // 1 and red ~= 10 + 200 = 210.
        let out = fb.color()[0];
        assert!((out.r as i32 - 210).abs() <= 2);
    }

    #[test]
    fn indexed_draw_deduplicates_shared_vertex() {
        let verts: Vec<Vertex> = (0..7)
            .map(|i| vtx(Vec3::new(i as f32, 0.0, 0.0), Color::WHITE))
            .collect();
        let array = VertexArray::new(7, Some(&verts));

        // Three triangles sharing only index 0 as a common center vertex:
        // 9 index reads touch 7 distinct vertices (0 is read 3 times but
        // must be processed only once).
        let idx = [0u32, 1, 2, 0, 3, 4, 0, 5, 6];
        let indices = IndexArray::new(9, Some(&idx));

        let mut fb = Framebuffer::new(4, 4).unwrap();
        let mut renderer = Renderer::new();
        renderer
            .draw_elements(DrawMode::Triangles, &indices, &array, 0, 9, &mut fb)
            .unwrap();

        assert_eq!(renderer.vertex_invocations.get(), 7);
    }
}
