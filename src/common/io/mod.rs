mod csv;
mod shp;
mod svg;

pub(crate) use csv::*;
pub(crate) use shp::*;
pub(crate) use svg::*;
