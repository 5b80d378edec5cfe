mod color;
mod path;
mod scale;
mod writer;

pub(crate) use color::*;
pub(crate) use path::*;
pub(crate) use scale::*;
pub(crate) use writer::*;
