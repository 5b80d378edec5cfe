use std::io::Write;

use anyhow::{Result, ensure};
use geo::{Coord, CoordsIter, LineString, MultiPolygon};

use super::escape_text;

/// Projection function: planar map coords -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Draw named polygons with per-polygon fill colors; names become hover titles.
pub(crate) fn draw_polygons_with_fill(
    writer: &mut impl Write,
    polygons: &[(&str, &MultiPolygon<f64>)],
    colors: &[String],
    project: &Projection,
) -> Result<()> {
    ensure!(colors.len() == polygons.len(),
        "[to_svg] length mismatch: {} colors for {} geometries",
        colors.len(),
        polygons.len(),
    );

    for ((name, polygon), color) in polygons.iter().zip(colors) {
        writeln!(
            writer,
            r#"<path class="state" style="fill:{color}" d="{}"><title>{}</title></path>"#,
            multipolygon_to_path(polygon, project),
            escape_text(name),
        )?;
    }

    Ok(())
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }

    out
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection) -> String {
    let mut out = String::new();

    let mut coords = ring.coords_iter()
        .map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }

    out
}

/// Build an SVG `points` string for an open polyline.
pub(crate) fn polyline_points(points: &[(f64, f64)]) -> String {
    points.iter()
        .map(|(x, y)| format!("{x:.3},{y:.3}"))
        .collect::<Vec<_>>()
        .join(" ")
}
