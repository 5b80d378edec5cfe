mod svg;

pub use svg::render_class_map;
