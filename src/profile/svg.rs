use std::{io::Write, path::Path};

use anyhow::{Result, ensure};

use crate::{common, profile::ProfileFit};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN: (f64, f64, f64, f64) = (50.0, 150.0, 70.0, 60.0); // top, right, bottom, left

impl ProfileFit {
    /// Indicator means of each profile, standardised against the mixture's overall
    /// mean and standard deviation so indicators on different scales share one axis.
    pub fn standardized_means(&self) -> Vec<Vec<f64>> {
        let m = &self.mixture;
        let (k, d) = m.means.dim();

        let overall = (0..d)
            .map(|l| {
                let mean: f64 = (0..k).map(|j| m.weights[j] * m.means[[j, l]]).sum();
                let second: f64 = (0..k).map(|j| m.weights[j] * (m.variances[[j, l]] + m.means[[j, l]].powi(2))).sum();
                let sd = (second - mean * mean).max(0.0).sqrt();
                (mean, if sd > 0.0 { sd } else { 1.0 })
            })
            .collect::<Vec<_>>();

        (0..k)
            .map(|j| (0..d).map(|l| (m.means[[j, l]] - overall[l].0) / overall[l].1).collect())
            .collect()
    }

    /// Draw standardised profile means, one line per class.
    pub fn to_svg(&self, path: &Path) -> Result<()> {
        let means = self.standardized_means();
        let d = self.indicators.len();
        ensure!(d > 0 && !means.is_empty(), "[to_svg] no profiles to draw");

        let (top, right, bottom, left) = MARGIN;
        let (lo, hi) = means.iter().flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let ticks = common::nice_ticks(lo, hi, 5);
        let (lo, hi) = (ticks.first().copied().unwrap_or(lo), ticks.last().copied().unwrap_or(hi));

        let y = common::LinearScale::new((lo, hi), (HEIGHT - bottom, top));
        let step = (WIDTH - left - right) / d as f64;
        let x = |l: usize| left + step * (l as f64 + 0.5);

        let mut writer = common::SvgWriter::new(path)?;
        writer.write_header(WIDTH, HEIGHT)?;
        writer.write_styles()?;
        writer.write_text(WIDTH / 2.0, top / 2.0, "middle", Some("title"), "Standardised indicator means by profile")?;

        for &tick in &ticks {
            let ty = y.apply(tick);
            writeln!(writer, r#"<line class="grid" x1="{left:.3}" y1="{ty:.3}" x2="{:.3}" y2="{ty:.3}"/>"#, WIDTH - right)?;
            writer.write_text(left - 8.0, ty + 4.0, "end", None, &common::tick_label(tick))?;
        }
        writeln!(writer, r#"<polyline class="axis" points="{left:.3},{top:.3} {left:.3},{:.3} {:.3},{:.3}"/>"#,
            HEIGHT - bottom, WIDTH - right, HEIGHT - bottom)?;
        for (l, name) in self.indicators.iter().enumerate() {
            writer.write_text(x(l), HEIGHT - bottom + 20.0, "middle", None, name)?;
        }

        let sizes = self.mixture.sizes();
        for (j, row) in means.iter().enumerate() {
            let color = common::golden_angle_color(j);
            let points = row.iter().enumerate().map(|(l, &v)| (x(l), y.apply(v))).collect::<Vec<_>>();
            writeln!(writer, r#"<polyline class="profile" style="stroke:{color}" points="{}"/>"#, common::polyline_points(&points))?;
            for (px, py) in &points {
                writeln!(writer, r#"<circle cx="{px:.3}" cy="{py:.3}" r="4" style="fill:{color}"/>"#)?;
            }

            let ly = top + 20.0 * j as f64;
            let lx = WIDTH - right + 20.0;
            writeln!(writer, r#"<line style="stroke:{color};stroke-width:3" x1="{lx:.3}" y1="{ly:.3}" x2="{:.3}" y2="{ly:.3}"/>"#, lx + 20.0)?;
            writer.write_text(lx + 26.0, ly + 4.0, "start", None, &format!("#{} (n={})", j + 1, sizes[j]))?;
        }

        writer.finish()
    }
}
