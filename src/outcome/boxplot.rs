use std::{collections::BTreeMap, io::Write, path::Path};

use anyhow::{Result, ensure};

use crate::common;

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub n: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme observations within 1.5 IQR of the box.
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Sample quantile with linear interpolation between order statistics (R type 7).
/// `sorted` must be ascending and non-empty.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

impl BoxStats {
    /// Summarise `values`, ignoring non-finite entries. None when nothing is left.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.iter().copied().filter(|v| v.is_finite()).collect::<Vec<_>>();
        if sorted.is_empty() { return None }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let inside = sorted.iter().copied().filter(|&v| v >= low_fence && v <= high_fence);
        let whisker_low = inside.clone().next().unwrap_or(q1);
        let whisker_high = inside.last().unwrap_or(q3);
        let outliers = sorted.iter().copied().filter(|&v| v < low_fence || v > high_fence).collect();

        Some(Self { n: sorted.len(), q1, median, q3, whisker_low, whisker_high, outliers })
    }

    fn extent(&self) -> (f64, f64) {
        let lo = self.outliers.iter().copied().fold(self.whisker_low, f64::min);
        let hi = self.outliers.iter().copied().fold(self.whisker_high, f64::max);
        (lo, hi)
    }
}

/// Pair class labels with values, dropping rows where either is missing.
pub fn group_by_class(classes: &[Option<f64>], values: &[Option<f64>]) -> BTreeMap<i32, Vec<f64>> {
    let mut groups: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (class, value) in classes.iter().zip(values) {
        if let (Some(class), Some(value)) = (class, value) {
            groups.entry(*class as i32).or_default().push(*value);
        }
    }
    groups
}

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN: (f64, f64, f64, f64) = (50.0, 30.0, 60.0, 70.0); // top, right, bottom, left

/// Draw one vertical box per class.
pub fn write_boxplot(path: &Path, title: &str, y_label: &str, groups: &BTreeMap<i32, Vec<f64>>) -> Result<()> {
    let stats = groups.iter()
        .filter_map(|(&class, values)| BoxStats::from_values(values).map(|s| (class, s)))
        .collect::<Vec<_>>();
    ensure!(!stats.is_empty(), "[to_svg] no values to plot for {title}");

    let (lo, hi) = stats.iter()
        .map(|(_, s)| s.extent())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
    let ticks = common::nice_ticks(lo, hi, 6);
    let (lo, hi) = (ticks.first().copied().unwrap_or(lo), ticks.last().copied().unwrap_or(hi));

    let (top, right, bottom, left) = MARGIN;
    let y = common::LinearScale::new((lo, hi), (HEIGHT - bottom, top));
    let slot = (WIDTH - left - right) / stats.len() as f64;
    let half = slot * 0.25;

    let mut writer = common::SvgWriter::new(path)?;
    writer.write_header(WIDTH, HEIGHT)?;
    writer.write_styles()?;
    writer.write_text(WIDTH / 2.0, top / 2.0, "middle", Some("title"), title)?;

    for &tick in &ticks {
        let ty = y.apply(tick);
        writeln!(writer, r#"<line class="grid" x1="{left:.3}" y1="{ty:.3}" x2="{:.3}" y2="{ty:.3}"/>"#, WIDTH - right)?;
        writer.write_text(left - 8.0, ty + 4.0, "end", None, &common::tick_label(tick))?;
    }
    writeln!(writer, r#"<polyline class="axis" points="{left:.3},{top:.3} {left:.3},{:.3} {:.3},{:.3}"/>"#,
        HEIGHT - bottom, WIDTH - right, HEIGHT - bottom)?;
    let mid_y = (top + HEIGHT - bottom) / 2.0;
    writeln!(writer, r#"<text x="18" y="{mid_y:.3}" text-anchor="middle" transform="rotate(-90 18 {mid_y:.3})">{}</text>"#,
        common::escape_text(y_label))?;
    writer.write_text(left + (WIDTH - left - right) / 2.0, HEIGHT - 15.0, "middle", None, "Class")?;

    for (i, (class, s)) in stats.iter().enumerate() {
        let cx = left + slot * (i as f64 + 0.5);
        let (q1, med, q3) = (y.apply(s.q1), y.apply(s.median), y.apply(s.q3));
        let (wl, wh) = (y.apply(s.whisker_low), y.apply(s.whisker_high));

        writeln!(writer, r#"<line class="whisker" x1="{cx:.3}" y1="{wh:.3}" x2="{cx:.3}" y2="{q3:.3}"/>"#)?;
        writeln!(writer, r#"<line class="whisker" x1="{cx:.3}" y1="{q1:.3}" x2="{cx:.3}" y2="{wl:.3}"/>"#)?;
        for wy in [wl, wh] {
            writeln!(writer, r#"<line class="whisker" x1="{:.3}" y1="{wy:.3}" x2="{:.3}" y2="{wy:.3}"/>"#, cx - half / 2.0, cx + half / 2.0)?;
        }
        writeln!(writer, r#"<rect class="box" x="{:.3}" y="{q3:.3}" width="{:.3}" height="{:.3}"/>"#, cx - half, 2.0 * half, (q1 - q3).max(0.0))?;
        writeln!(writer, r#"<line class="median" x1="{:.3}" y1="{med:.3}" x2="{:.3}" y2="{med:.3}"/>"#, cx - half, cx + half)?;
        for &v in &s.outliers {
            writeln!(writer, r#"<circle class="outlier" cx="{cx:.3}" cy="{:.3}" r="3"/>"#, y.apply(v))?;
        }
        writer.write_text(cx, HEIGHT - bottom + 18.0, "middle", None, &format!("{class} (n={})", s.n))?;
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_match_type_seven() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.75), 3.25);
        assert_eq!(quantile(&[7.0], 0.5), 7.0);
    }

    #[test]
    fn outliers_fall_outside_the_fences() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0, f64::NAN]).unwrap();
        assert_eq!(stats.n, 6);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 5.0);
        assert!(BoxStats::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn grouping_skips_missing_values() {
        let classes = [Some(1.0), Some(2.0), None, Some(1.0)];
        let values = [Some(5.0), None, Some(3.0), Some(6.0)];
        let groups = group_by_class(&classes, &values);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&1], vec![5.0, 6.0]);
    }

    #[test]
    fn draws_a_box_per_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.svg");
        let groups = BTreeMap::from([(1, vec![1.0, 2.0, 3.0]), (2, vec![4.0, 5.0]), (3, vec![6.0])]);
        write_boxplot(&path, "IMR by class", "IMR_2018", &groups).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches(r#"class="box""#).count(), 3);
        assert!(svg.contains("3 (n=1)"));
    }
}
