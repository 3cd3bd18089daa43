//! SVG writing for static map images.

mod color;
mod path;
mod writer;

pub(crate) use color::*;
pub(crate) use path::*;
pub(crate) use writer::*;
