use std::{collections::HashMap, io::Write, path::Path};

use anyhow::{Result, anyhow};
use geo::Coord;

use crate::{
    PipelineError, common,
    config::{MapConfig, ShadeRange},
    map::StatePolygons,
    table::{PolicyTable, columns},
};

/// Fill for polygons without a class.
pub(crate) const NO_DATA_FILL: &str = "none";

const LEGEND_HEIGHT: f64 = 40.0;
const SWATCH: f64 = 16.0;

/// One fill per polygon: class `c` takes shade `c` of a `k`-step grey ramp.
/// Names without a classed `State` row get the no-data fill, or fail when `strict`.
pub(crate) fn class_fills(
    polygons: &StatePolygons,
    table: &PolicyTable,
    classes: usize,
    shades: &ShadeRange,
    strict: bool,
) -> Result<Vec<String>, PipelineError> {
    let states = table.text(columns::STATE)?;
    let labels = table.numeric(columns::CLASS)?;
    let by_state = states.into_iter().zip(labels)
        .filter_map(|(state, class)| Some((state?, class? as usize)))
        .collect::<HashMap<_, _>>();

    let ramp = common::grey_ramp(classes, shades.start, shades.end);

    let mut unmatched = Vec::new();
    let fills = polygons.names()
        .map(|name| match by_state.get(name).and_then(|&c| c.checked_sub(1)).and_then(|c| ramp.get(c)) {
            Some(shade) => shade.to_string(),
            None => {
                unmatched.push(name.to_string());
                NO_DATA_FILL.to_string()
            }
        })
        .collect();

    if !unmatched.is_empty() {
        let mismatch = PipelineError::JoinMismatch { names: unmatched };
        if strict { return Err(mismatch) }
        log::warn!("[map] {mismatch}");
    }

    Ok(fills)
}

/// Draw the classed choropleth with a `#1..#k` legend underneath.
pub fn render_class_map(
    polygons: &StatePolygons,
    table: &PolicyTable,
    config: &MapConfig,
    classes: usize,
    path: &Path,
) -> Result<()> {
    let bounds = polygons.bounds()
        .ok_or_else(|| anyhow!("[to_svg] Could not determine bounds; nothing to draw."))?;
    let fills = class_fills(polygons, table, classes, &config.shades, config.strict_join)?;

    let width = config.width as f64;
    let scale = width / bounds.width();
    let map_height = bounds.height() * scale;
    let height = map_height + LEGEND_HEIGHT;

    // Projected metres -> SVG coords, Y down.
    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = (coord.x - bounds.min().x) * scale;
        let y = (bounds.max().y - coord.y) * scale;
        (x, y)
    };

    let mut writer = common::SvgWriter::new(path)?;
    writer.write_header(width, height)?;
    writer.write_styles()?;

    let shapes = polygons.iter().collect::<Vec<_>>();
    common::draw_polygons_with_fill(&mut writer, &shapes, &fills, &project)?;

    let y = map_height + (LEGEND_HEIGHT - SWATCH) / 2.0;
    writer.write_text(8.0, y + SWATCH - 3.0, "start", None, "Class")?;
    for (i, shade) in common::grey_ramp(classes, config.shades.start, config.shades.end).iter().enumerate() {
        let x = 60.0 + i as f64 * 60.0;
        writeln!(writer, r#"<rect class="swatch" x="{x:.3}" y="{y:.3}" width="{SWATCH}" height="{SWATCH}" style="fill:{shade}"/>"#)?;
        writer.write_text(x + SWATCH + 4.0, y + SWATCH - 3.0, "start", None, &format!("#{}", i + 1))?;
    }

    writer.finish()
}
