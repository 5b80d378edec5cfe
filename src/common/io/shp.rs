use std::{fs, path::Path};

use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{self as shp, Reader, Shape, dbase::{FieldValue, Record}};

use crate::PipelineError;

/// Reads every polygon of a `.shp` file together with the given character attribute.
pub(crate) fn read_named_polygons(path: &Path, name_field: &str) -> Result<Vec<(String, MultiPolygon<f64>)>, PipelineError> {
    let fail = |reason: String| PipelineError::Shapefile { path: path.to_path_buf(), reason };

    let mut reader = Reader::from_path(path)
        .map_err(|e| fail(format!("failed to open: {e}")))?;

    let mut items = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.map_err(|e| fail(format!("error reading shape+record: {e}")))?;
        let name = character_field(&record, name_field)
            .ok_or_else(|| fail(format!("missing or invalid character field: {name_field}")))?;
        let polygon = match shape {
            Shape::Polygon(polygon) => shp_to_geo(&polygon),
            other => return Err(fail(format!("found non-Polygon shape for {name}: {:?}", other.shapetype()))),
        };
        items.push((name, polygon));
    }
    Ok(items)
}

/// Get the trimmed value of a character field from a Record.
fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Guess the EPSG code of a shapefile's geographic CRS from its `.prj` sidecar.
/// Census cartographic boundary files are NAD83 (4269); WGS84 (4326) is recognised by name.
pub(crate) fn epsg_from_prj(shp_path: &Path) -> u32 {
    let prj = fs::read_to_string(shp_path.with_extension("prj")).unwrap_or_default();
    let wkt = prj.to_ascii_uppercase();
    if wkt.contains("WGS_1984") || wkt.contains("WGS 84") || wkt.contains("WGS84") { 4326 } else { 4269 }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>
pub(crate) fn shp_to_geo(p: &shp::Polygon) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn to_ring(points: &[shp::Point]) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
        LineString(coords)
    }

    // Shapefile stores each exterior followed by its holes.
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings() {
        match ring {
            shp::PolygonRing::Outer(points) => {
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(to_ring(points));
            }
            shp::PolygonRing::Inner(points) => current_holes.push(to_ring(points)),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<shp::Point> {
        // Shapefile exteriors are clockwise.
        vec![
            shp::Point::new(x0, y0),
            shp::Point::new(x0, y0 + size),
            shp::Point::new(x0 + size, y0 + size),
            shp::Point::new(x0 + size, y0),
            shp::Point::new(x0, y0),
        ]
    }

    #[test]
    fn groups_holes_with_preceding_exterior() {
        let mut hole = square(1.0, 1.0, 1.0);
        hole.reverse();
        let polygon = shp::Polygon::with_rings(vec![
            shp::PolygonRing::Outer(square(0.0, 0.0, 4.0)),
            shp::PolygonRing::Inner(hole),
            shp::PolygonRing::Outer(square(10.0, 10.0, 2.0)),
        ]);

        let mp = shp_to_geo(&polygon);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!(mp.0[1].interiors().is_empty());
        assert_eq!(mp.0[1].exterior().0[0], Coord { x: 10.0, y: 10.0 });
    }

    #[test]
    fn reads_named_polygons_written_by_shapefile_writer() {
        use shp::dbase::{FieldName, TableWriterBuilder};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.shp");
        let table = TableWriterBuilder::new()
            .add_character_field(FieldName::try_from("NAME").unwrap(), 40);
        let mut writer = shp::Writer::from_path(&path, table).unwrap();

        let mut record = Record::default();
        record.insert("NAME".to_string(), FieldValue::Character(Some("Kansas".to_string())));
        writer.write_shape_and_record(&shp::Polygon::new(shp::PolygonRing::Outer(square(0.0, 0.0, 1.0))), &record).unwrap();
        drop(writer);

        let items = read_named_polygons(&path, "NAME").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0, "Kansas");
        assert_eq!(items[0].1.0.len(), 1);
        assert_eq!(epsg_from_prj(&path), 4269);
    }
}
