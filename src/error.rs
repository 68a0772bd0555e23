//! Error taxonomy for the rasterizer core.
//!
//! The original C source signals failure with a bare `-1` return. This
//! reimplementation keeps the taxonomy just as small but gives each case a
//! name, per `thiserror`, the way the rest of the example pack models its
//! fallible paths.

use thiserror::Error;

/// Everything that can go wrong calling into `raster_core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// A sizing/allocation request could not be satisfied: a zero-sized
    /// framebuffer or texture, or a `reserve` that the allocator rejected.
    #[error("failed to allocate {what}")]
    Allocation { what: &'static str },

    /// `color_buffer_read`/`texture_read` was asked to decode into
    /// `ColorFormat::Gray`, which the original source documents as
    /// unsupported ("Not actually supported") and this reimplementation
    /// fails explicitly instead of silently no-op-ing.
    #[error("reading pixel data into Gray format is not supported")]
    UnsupportedCodecPath,

    /// `set_lights` was asked to resize the light arrays to zero when the
    /// caller's intent was clearly to provide usable storage.
    #[error("light array must have at least one light")]
    EmptyLights,
}

pub type Result<T> = std::result::Result<T, RasterError>;
