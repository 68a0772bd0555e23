//! Demo host for `raster_core`: builds a couple of example scenes, runs a
//! single draw, and writes the resulting color plane to a PPM file. Stands
//! in for the GPU upload / windowing layer the core library deliberately
//! does not own.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use raster_core::{
    Color, ColorFormat, DepthFunc, DrawMode, Framebuffer, IndexArray, Light, Mat4, Material,
    PixelBuf, Renderer, Texture, Vec2, Vec3, Vertex, VertexArray,
};

#[derive(Parser)]
#[command(name = "viewer")]
#[command(about = "Demo host for raster_core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    scene: Scene,

    /// Output image width
    #[arg(long, default_value_t = 256)]
    width: usize,

    /// Output image height
    #[arg(long, default_value_t = 256)]
    height: usize,

    /// Where to write the rendered PPM
    #[arg(short, long, default_value = "out.ppm")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Scene {
    /// A lit, rotating cube
    Cube {
        /// Heading in degrees
        #[arg(long, default_value_t = 25.0)]
        angle: f32,
    },
    /// A textured quad receding in depth
    Quad,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut fb = Framebuffer::new(cli.width, cli.height)?;
    fb.clear_color(Color::new(20, 20, 30, 255));
    fb.clear_depth(1.0);

    match cli.scene {
        Scene::Cube { angle } => render_cube(&mut fb, angle)?,
        Scene::Quad => render_quad(&mut fb)?,
    }

    write_ppm(&fb, &cli.output)?;
    info!("wrote {}", cli.output.display());
    Ok(())
}

fn cube_vertex(pos: Vec3, color: Color) -> Vertex {
    Vertex {
        pos,
        normal: pos.normalize(),
        color,
        tex_coord: Vec2::zero(),
    }
}

/// Builds a unit cube, spins it by `angle_deg` about the vertical axis, lights
/// it with a single point light, and draws it with depth testing and
/// backface culling on.
fn render_cube(fb: &mut Framebuffer, angle_deg: f32) -> anyhow::Result<()> {
    let corners = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
    ];

    let verts: Vec<Vertex> = corners
        .iter()
        .map(|&c| cube_vertex(c, Color::new(200, 200, 210, 255)))
        .collect();
    let array = VertexArray::new(verts.len(), Some(&verts));

    #[rustfmt::skip]
    let idx: [u32; 36] = [
        0, 1, 2,  0, 2, 3, // back
        5, 4, 7,  5, 7, 6, // front
        4, 0, 3,  4, 3, 7, // left
        1, 5, 6,  1, 6, 2, // right
        3, 2, 6,  3, 6, 7, // top
        4, 5, 1,  4, 1, 0, // bottom
    ];
    let indices = IndexArray::new(idx.len(), Some(&idx));

    let angle = angle_deg.to_radians();
    let model = y_rotation(angle);
    let view = Mat4::look_at(
        Vec3::new(3.0, 2.5, 5.0),
        Vec3::zero(),
        Vec3::new(0.0, 1.0, 0.0),
    );
    let projection = Mat4::perspective(60f32.to_radians(), 1.0, 0.1, 100.0);

    let mut renderer: Renderer = Renderer::new();
    renderer.set_mvp(model, view, projection);
    renderer.set_depth_test(true);
    renderer.set_depth_func(DepthFunc::Le);
    renderer.set_culling(true);
    renderer.set_lighting(true);
    renderer.use_material(Material {
        ambient: Color::new(20, 20, 20, 255),
        diffuse: Color::new(255, 255, 255, 255),
        specular: Color::new(255, 255, 255, 255),
        specular_power: 16.0,
    });
    renderer.set_lights(
        1,
        Some(&[Light {
            pos: Vec3::new(4.0, 4.0, 4.0),
            ambient: Color::new(15, 15, 15, 255),
            diffuse: Color::new(220, 220, 200, 255),
            specular: Color::new(255, 255, 255, 255),
        }]),
    )?;

    renderer.draw_elements(DrawMode::Triangles, &indices, &array, 0, idx.len(), fb)?;
    Ok(())
}

/// A checkerboard-textured quad, tilted back into depth so a viewer can see
/// perspective-correct texture sampling at work.
fn render_quad(fb: &mut Framebuffer) -> anyhow::Result<()> {
    let w = 8;
    let h = 8;
    let mut pixels = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (x + y * w) * 4;
            let v = if (x + y) % 2 == 0 { 255 } else { 40 };
            pixels[i] = v;
            pixels[i + 1] = v;
            pixels[i + 2] = v;
            pixels[i + 3] = 255;
        }
    }
    let texture = Texture::new(w, h, ColorFormat::Rgba, PixelBuf::Byte(&pixels))?;

    let verts = [
        Vertex {
            pos: Vec3::new(-3.0, -2.0, -2.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            color: Color::WHITE,
            tex_coord: Vec2::new(0.0, 0.0),
        },
        Vertex {
            pos: Vec3::new(3.0, -2.0, -8.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            color: Color::WHITE,
            tex_coord: Vec2::new(1.0, 0.0),
        },
        Vertex {
            pos: Vec3::new(3.0, 2.0, -8.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            color: Color::WHITE,
            tex_coord: Vec2::new(1.0, 1.0),
        },
        Vertex {
            pos: Vec3::new(-3.0, 2.0, -2.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            color: Color::WHITE,
            tex_coord: Vec2::new(0.0, 1.0),
        },
    ];
    let array = VertexArray::new(verts.len(), Some(&verts));
    let idx: [u32; 6] = [0, 1, 2, 0, 2, 3];
    let indices = IndexArray::new(idx.len(), Some(&idx));

    let view = Mat4::IDENTITY;
    let projection = Mat4::perspective(60f32.to_radians(), 1.0, 0.1, 100.0);

    let mut renderer = Renderer::new();
    renderer.use_texture(Some(&texture));
    renderer.set_mvp(Mat4::IDENTITY, view, projection);
    renderer.set_depth_test(true);
    renderer.set_depth_func(DepthFunc::Le);

    renderer.draw_elements(DrawMode::Triangles, &indices, &array, 0, idx.len(), fb)?;
    Ok(())
}

fn y_rotation(theta: f32) -> Mat4 {
    #[rustfmt::skip]
    let data = [
         theta.cos(), 0.0, theta.sin(), 0.0,
         0.0,         1.0, 0.0,         0.0,
        -theta.sin(), 0.0, theta.cos(), 0.0,
         0.0,         0.0, 0.0,         1.0,
    ];
    Mat4 { data }
}

fn write_ppm(fb: &Framebuffer, path: &PathBuf) -> io::Result<()> {
    let width = fb.width();
    let height = fb.height();
    let mut buf = vec![0u8; width * height * 3];
    fb.read_color(0, 0, width, height, ColorFormat::Rgb, raster_core::PixelBufMut::Byte(&mut buf))
        .expect("rgb read never fails");

    let mut file = File::create(path)?;
    write!(file, "P6\n{width} {height}\n255\n")?;
    file.write_all(&buf)?;
    Ok(())
}
