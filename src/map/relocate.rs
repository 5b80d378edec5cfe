use geo::{BoundingRect, MultiPolygon, Point, Rotate, Scale, Translate};
use serde::{Deserialize, Serialize};

/// Cosmetic repositioning of one state's polygon in projected coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relocation {
    /// Polygon `NAME` this applies to.
    pub state: String,
    /// Clockwise rotation in degrees about the bounding-box centre.
    pub rotate_deg: f64,
    /// Divide the polygon's size by this, re-anchoring its lower-left corner at the
    /// origin so that `shift` becomes its absolute position. None (or 1) keeps size and place.
    pub scale_divisor: Option<f64>,
    /// Offset added last, in projected units.
    pub shift: [f64; 2],
}

/// Rotate, optionally rescale, then shift a polygon.
pub fn relocate(shape: &MultiPolygon<f64>, relocation: &Relocation) -> MultiPolygon<f64> {
    let Some(bounds) = shape.bounding_rect() else { return shape.clone() };

    let mut out = shape.rotate_around_point(-relocation.rotate_deg, Point::from(bounds.center()));

    if let Some(divisor) = relocation.scale_divisor.filter(|&d| d != 1.0) {
        if let Some(rotated) = out.bounding_rect() {
            let corner = rotated.min();
            out = out
                .translate(-corner.x, -corner.y)
                .scale_around_point(1.0 / divisor, 1.0 / divisor, Point::new(0.0, 0.0));
        }
    }

    out.translate(relocation.shift[0], relocation.shift[1])
}
