/// Linear map from a data interval onto a pixel interval (which may be reversed).
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub(crate) fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        // Degenerate domains are widened so every value maps to the middle.
        let domain = if domain.1 > domain.0 { domain } else { (domain.0 - 0.5, domain.0 + 0.5) };
        Self { domain, range }
    }

    pub(crate) fn apply(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

/// Round tick positions covering `[min, max]` with roughly `count` intervals.
pub(crate) fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || count == 0 { return Vec::new() }
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, min + 0.5) };

    let raw = (max - min) / count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0].iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).floor() as i64;
    let last = (max / step).ceil() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Format a tick label without trailing noise.
pub(crate) fn tick_label(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_maps_and_reverses() {
        let y = LinearScale::new((0.0, 10.0), (400.0, 0.0));
        assert_eq!(y.apply(0.0), 400.0);
        assert_eq!(y.apply(10.0), 0.0);
        assert_eq!(y.apply(5.0), 200.0);
    }

    #[test]
    fn ticks_cover_the_interval() {
        let ticks = nice_ticks(0.3, 9.6, 5);
        assert_eq!(ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert!(nice_ticks(f64::NAN, 1.0, 5).is_empty());
    }

    #[test]
    fn labels_drop_trailing_zeros() {
        assert_eq!(tick_label(2.5), "2.5");
        assert_eq!(tick_label(4.0), "4");
        assert_eq!(tick_label(-0.0001), "0");
    }
}
