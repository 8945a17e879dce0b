//! # mcujs-raster
//!
//! The rasteriser for an embedded JavaScript interpreter: software line,
//! rectangle, polygon and text primitives over a pluggable pixel sink,
//! standing in for the packed `JsGraphicsData` + raw-function-pointer
//! backend dispatch used by microcontroller-class graphics stacks.
//!
//! [`Graphics`] owns the drawing state and delegates the four primitive
//! operations (set/get pixel, fill rect) to a [`PixelSink`]; two sinks ship
//! here — [`ArrayBufferSink`], which packs pixels into a heap-owned string
//! chain, and [`HostCallbackSink`], which forwards to host closures.
#![warn(clippy::all)]

mod font;
mod raster;
mod sink;

pub use font::{
    glyph_4x6, vector_glyph_verts, VectorFontChar, FONT_4X6_HEIGHT, FONT_4X6_OFFSET, FONT_4X6_WIDTH, VECTOR_FONT_CHARS,
    VECTOR_FONT_MAX_POLY_SIZE, VECTOR_FONT_OFFSET, VECTOR_FONT_POLY_SEPARATOR, VECTOR_FONT_POLY_SIZE,
};
pub use raster::Graphics;
pub use sink::{ArrayBufferSink, HostCallbackSink, PixelSink};
