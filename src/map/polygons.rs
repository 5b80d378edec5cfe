use std::path::Path;

use geo::{BoundingRect, Coord, MapCoords, MultiPolygon, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{PipelineError, common};
use super::{Relocation, relocate, states::is_state};

/// Named state outlines in a single coordinate reference system.
#[derive(Debug, Clone, Default)]
pub struct StatePolygons {
    entries: Vec<(String, MultiPolygon<f64>)>,
    epsg: u32,
}

impl StatePolygons {
    pub fn new(entries: Vec<(String, MultiPolygon<f64>)>, epsg: u32) -> Self {
        Self { entries, epsg }
    }

    /// Load the single shapefile found in `dir`, keyed by its `NAME` attribute.
    pub fn read_dir(dir: &Path) -> Result<Self, PipelineError> {
        common::require_dir_exists(dir)?;
        let path = common::find_shapefile(dir)?;
        let entries = common::read_named_polygons(&path, "NAME")?;
        let epsg = common::epsg_from_prj(&path);
        log::info!("[load] {} polygons from {} (EPSG:{epsg})", entries.len(), path.display());
        Ok(Self { entries, epsg })
    }

    /// Geographic CRS of lon/lat input. Meaningless once reprojected.
    pub fn epsg(&self) -> u32 { self.epsg }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiPolygon<f64>)> {
        self.entries.iter().map(|(name, shape)| (name.as_str(), shape))
    }

    pub fn get(&self, name: &str) -> Option<&MultiPolygon<f64>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, shape)| shape)
    }

    /// Keep only the fifty states, dropping DC and the territories.
    pub fn states_only(self) -> Self {
        let before = self.entries.len();
        let entries = self.entries.into_iter()
            .filter(|(name, _)| is_state(name))
            .collect::<Vec<_>>();
        log::debug!("[map] kept {} of {before} polygons", entries.len());
        Self { entries, epsg: self.epsg }
    }

    /// Combined bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.entries.iter()
            .filter_map(|(_, shape)| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// PROJ.4 string for the source geographic CRS.
    #[inline]
    fn source_geog_proj4(&self) -> &'static str {
        match self.epsg {
            4269 | 4937 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
            _           => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
        }
    }

    /// Reproject lon/lat degrees into `target` (a PROJ.4 string with metric units).
    pub fn reproject(&self, target: &str) -> Result<Self, PipelineError> {
        let from = Proj4::from_proj_string(self.source_geog_proj4())
            .map_err(|e| PipelineError::Projection(format!("source CRS EPSG:{}: {e}", self.epsg)))?;
        let to = Proj4::from_proj_string(target)
            .map_err(|e| PipelineError::Projection(format!("target CRS {target:?}: {e}")))?;
        let (from, to) = (&from, &to);

        // Radians in, metres out.
        let entries = self.entries.iter()
            .map(|(name, shape)| {
                shape.try_map_coords(|coord: Coord<f64>| -> Result<Coord<f64>, PipelineError> {
                    let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
                    transform(from, to, &mut point)
                        .map_err(|e| PipelineError::Projection(format!("{name}: {e}")))?;
                    Ok(Coord { x: point.0, y: point.1 })
                })
                .map(|projected| (name.clone(), projected))
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(Self { entries, epsg: self.epsg })
    }

    /// Apply each relocation to the polygon it names. Others are left untouched.
    pub fn relocated(mut self, relocations: &[Relocation]) -> Self {
        for relocation in relocations {
            match self.entries.iter_mut().find(|(name, _)| *name == relocation.state) {
                Some((_, shape)) => *shape = relocate(shape, relocation),
                None => log::warn!("[map] no polygon named {:?} to relocate", relocation.state),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Rect, coord};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(coord! { x: x, y: y }, coord! { x: x + size, y: y + size }).to_polygon()])
    }

    #[test]
    fn keeps_only_states() {
        let polygons = StatePolygons::new(vec![
            ("Texas".into(), square(0.0, 0.0, 1.0)),
            ("District of Columbia".into(), square(2.0, 0.0, 1.0)),
            ("Puerto Rico".into(), square(4.0, 0.0, 1.0)),
        ], 4269).states_only();
        assert_eq!(polygons.names().collect::<Vec<_>>(), vec!["Texas"]);
    }

    #[test]
    fn bounds_cover_every_shape() {
        let polygons = StatePolygons::new(vec![
            ("A".into(), square(0.0, 0.0, 1.0)),
            ("B".into(), square(5.0, -2.0, 1.0)),
        ], 4269);
        let bounds = polygons.bounds().unwrap();
        assert_eq!((bounds.min().x, bounds.min().y), (0.0, -2.0));
        assert_eq!((bounds.max().x, bounds.max().y), (6.0, 1.0));
        assert!(StatePolygons::default().bounds().is_none());
    }

    #[test]
    fn relocation_leaves_other_states_alone() {
        let polygons = StatePolygons::new(vec![
            ("Alaska".into(), square(0.0, 0.0, 4.0)),
            ("Texas".into(), square(10.0, 10.0, 1.0)),
        ], 4269);
        let relocation = Relocation { state: "Alaska".into(), rotate_deg: 0.0, scale_divisor: Some(2.0), shift: [-50.0, -50.0] };
        let moved = polygons.clone().relocated(&[relocation]);

        assert_eq!(moved.get("Texas"), polygons.get("Texas"));
        let alaska = moved.get("Alaska").unwrap().bounding_rect().unwrap();
        assert_eq!((alaska.min().x, alaska.max().x), (-50.0, -48.0));
    }

    #[test]
    fn reprojection_centres_on_the_projection_origin() {
        let polygons = StatePolygons::new(vec![("Kansas".into(), square(-100.5, 44.5, 1.0))], 4269);
        let projected = polygons.reproject(crate::config::MapConfig::default().target_proj.as_str()).unwrap();
        let bounds = projected.bounds().unwrap();
        // Symmetric about lon_0 = -100, metres rather than degrees.
        assert!((bounds.min().x + bounds.max().x).abs() < 1.0);
        assert!(bounds.width() > 70_000.0 && bounds.width() < 90_000.0);
    }

    #[test]
    fn bad_target_is_a_projection_error() {
        let polygons = StatePolygons::new(vec![("Kansas".into(), square(-100.5, 44.5, 1.0))], 4269);
        assert!(matches!(polygons.reproject("+proj=nonsense"), Err(PipelineError::Projection(_))));
    }
}
