mod io;
mod polygons;
mod relocate;
mod states;

pub use io::render_class_map;
pub use polygons::StatePolygons;
pub use relocate::{Relocation, relocate};
pub use states::{STATE_NAMES, is_state};

use crate::{PipelineError, config::MapConfig};

pub const MAP_FIGURE: &str = "class_map.svg";

/// Filter to the fifty states, reproject to the target CRS, then relocate.
pub fn prepare_state_polygons(raw: StatePolygons, config: &MapConfig) -> Result<StatePolygons, PipelineError> {
    let states = raw.states_only();
    let projected = states.reproject(&config.target_proj)?;
    Ok(projected.relocated(&config.relocations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{BoundingRect, MultiPolygon, Rect, coord, polygon};

    fn lonlat_box(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon()])
    }

    #[test]
    fn alaska_and_hawaii_land_near_the_lower_48() {
        let lower48 = MultiPolygon(vec![polygon![
            (x: -124.7, y: 48.4), (x: -95.0, y: 49.0), (x: -67.0, y: 45.0),
            (x: -80.0, y: 25.0), (x: -97.0, y: 26.0), (x: -117.0, y: 32.5),
        ]]);
        let raw = StatePolygons::new(vec![
            ("Alaska".into(), lonlat_box(-168.0, 54.0, -141.0, 71.0)),
            ("Hawaii".into(), lonlat_box(-160.3, 18.9, -154.8, 22.3)),
            ("Kansas".into(), lower48),
            ("Puerto Rico".into(), lonlat_box(-67.3, 17.9, -65.2, 18.5)),
        ], 4269);

        let config = MapConfig::default();
        let unmoved = raw.clone().states_only().reproject(&config.target_proj).unwrap();
        let prepared = prepare_state_polygons(raw, &config).unwrap();

        assert_eq!(prepared.names().collect::<Vec<_>>(), vec!["Alaska", "Hawaii", "Kansas"]);
        assert_eq!(prepared.get("Kansas"), unmoved.get("Kansas"));

        let home = prepared.get("Kansas").unwrap().bounding_rect().unwrap();
        let margin = 1_000_000.0;
        for state in ["Alaska", "Hawaii"] {
            let b = prepared.get(state).unwrap().bounding_rect().unwrap();
            assert!(b.min().x >= home.min().x - margin && b.max().x <= home.max().x + margin, "{state} x {b:?}");
            assert!(b.min().y >= home.min().y - margin && b.max().y <= home.max().y + margin, "{state} y {b:?}");
        }
    }

    #[test]
    fn alaska_is_halved() {
        let raw = StatePolygons::new(vec![("Alaska".into(), lonlat_box(-168.0, 54.0, -141.0, 71.0))], 4269);
        let config = MapConfig::default();
        let projected = raw.clone().reproject(&config.target_proj).unwrap();
        let prepared = prepare_state_polygons(raw, &config).unwrap();

        let before = projected.bounds().unwrap();
        let after = prepared.bounds().unwrap();
        assert!(after.width() < before.width() && after.height() < before.height());
        assert_eq!((after.min().x, after.min().y), (-2_500_000.0, -2_500_000.0));
    }
}
