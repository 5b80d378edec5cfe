use std::collections::BTreeMap;

use crate::{
    PipelineError,
    config::ReportConfig,
    outcome::quantile,
    table::{PolicyTable, columns},
};

/// Label used for missing values in frequency tables.
pub const MISSING_LABEL: &str = "<NA>";

/// psych-style descriptive statistics of one numeric variable.
/// Statistics that are undefined for the sample size are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub variable: String,
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
    pub median: f64,
    /// Mean after dropping 10% from each tail.
    pub trimmed: f64,
    /// Median absolute deviation, scaled by 1.4826.
    pub mad: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub skew: f64,
    pub kurtosis: f64,
    pub se: f64,
}

impl NumericSummary {
    pub fn from_values(variable: &str, values: &[Option<f64>]) -> Self {
        let mut sorted = values.iter().flatten().copied().filter(|v| v.is_finite()).collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        if n == 0 {
            return Self {
                variable: variable.to_string(),
                n, mean: f64::NAN, sd: f64::NAN, median: f64::NAN, trimmed: f64::NAN, mad: f64::NAN,
                min: f64::NAN, max: f64::NAN, range: f64::NAN, skew: f64::NAN, kurtosis: f64::NAN, se: f64::NAN,
            };
        }

        let nf = n as f64;
        let mean = sorted.iter().sum::<f64>() / nf;
        let moment = |p: i32| sorted.iter().map(|v| (v - mean).powi(p)).sum::<f64>();
        let sd = if n > 1 { (moment(2) / (nf - 1.0)).sqrt() } else { f64::NAN };

        let median = quantile(&sorted, 0.5);
        let mut deviations = sorted.iter().map(|v| (v - median).abs()).collect::<Vec<_>>();
        deviations.sort_by(f64::total_cmp);
        let mad = 1.4826 * quantile(&deviations, 0.5);

        // Type 3: moments over n, scaled by the sample sd.
        let skew = moment(3) / (nf * sd.powi(3));
        let kurtosis = moment(4) / (nf * sd.powi(4)) - 3.0;

        let (min, max) = (sorted[0], sorted[n - 1]);
        Self {
            variable: variable.to_string(),
            n,
            mean,
            sd,
            median,
            trimmed: trimmed_mean(&sorted, 0.1),
            mad,
            min,
            max,
            range: max - min,
            skew,
            kurtosis,
            se: sd / nf.sqrt(),
        }
    }
}

/// Mean of `sorted` after removing `floor(n * trim)` observations from each end.
/// A `trim` of one half or more keeps only the middle one or two values.
pub fn trimmed_mean(sorted: &[f64], trim: f64) -> f64 {
    let half = sorted.len().saturating_sub(1) / 2;
    let cut = ((sorted.len() as f64 * trim.max(0.0)).floor() as usize).min(half);
    let kept = &sorted[cut..sorted.len() - cut];
    if kept.is_empty() { return f64::NAN }
    kept.iter().sum::<f64>() / kept.len() as f64
}

/// One-way frequency table; categories sorted, missing last.
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    pub variable: String,
    pub counts: Vec<(String, usize)>,
}

impl Frequency {
    pub fn from_values(variable: &str, values: &[Option<String>]) -> Self {
        let mut observed: BTreeMap<&str, usize> = BTreeMap::new();
        let mut missing = 0;
        for value in values {
            match value.as_deref() {
                Some(v) if !is_missing_text(v) => *observed.entry(v).or_default() += 1,
                _ => missing += 1,
            }
        }

        let mut counts = observed.into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect::<Vec<_>>();
        if missing > 0 {
            counts.push((MISSING_LABEL.to_string(), missing));
        }
        Self { variable: variable.to_string(), counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Share of the total, in percent.
    pub fn percent(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => 100.0 * count as f64 / total as f64,
        }
    }
}

fn is_missing_text(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("NA") || value.eq_ignore_ascii_case("N/A")
}

/// Numeric summary of one variable within the rows where `by == equals`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditioned {
    pub by: String,
    pub equals: String,
    pub summary: NumericSummary,
}

/// Everything the descriptive report prints.
#[derive(Debug, Clone)]
pub struct Description {
    pub rows: usize,
    pub excluded: usize,
    pub numeric: Vec<NumericSummary>,
    pub frequencies: Vec<Frequency>,
    pub conditioned: Vec<Conditioned>,
}

/// Summarise the table with the excluded jurisdiction's rows removed.
pub fn describe_table(table: &PolicyTable, config: &ReportConfig) -> Result<Description, PipelineError> {
    let kept = table.excluding(columns::ABBREVIATION, &config.exclude_abbreviation)?;
    let excluded = table.len() - kept.len();
    log::info!("[report] {} rows ({excluded} excluded as {:?})", kept.len(), config.exclude_abbreviation);

    let numeric = config.numeric.iter()
        .map(|name| Ok(NumericSummary::from_values(name, &kept.numeric(name)?)))
        .collect::<Result<Vec<_>, PipelineError>>()?;

    let frequencies = config.categorical.iter()
        .map(|name| Ok(Frequency::from_values(name, &kept.text(name)?)))
        .collect::<Result<Vec<_>, PipelineError>>()?;

    let conditioned = config.conditioned.iter()
        .map(|c| {
            let values = kept.numeric(&c.variable)?;
            let by = kept.text(&c.by)?;
            let subset = values.into_iter().zip(by)
                .filter(|(_, by)| by.as_deref() == Some(c.equals.as_str()))
                .map(|(value, _)| value)
                .collect::<Vec<_>>();
            Ok(Conditioned {
                by: c.by.clone(),
                equals: c.equals.clone(),
                summary: NumericSummary::from_values(&c.variable, &subset),
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(Description { rows: kept.len(), excluded, numeric, frequencies, conditioned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConditionedSummary;
    use polars::prelude::*;

    fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn summary_matches_psych_describe() {
        // psych::describe(c(2, 4, 4, 4, 5, 5, 7, 9))
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].map(Some);
        let s = NumericSummary::from_values("x", &values);
        assert_eq!(s.n, 8);
        assert!(close(s.mean, 5.0));
        assert!(close(s.sd, (32.0f64 / 7.0).sqrt()));
        assert!(close(s.median, 4.5));
        assert!(close(s.trimmed, 5.0));
        assert!(close(s.mad, 1.4826 * 0.5));
        assert!(close(s.range, 7.0));
        assert!(close(s.se, s.sd / 8f64.sqrt()));

        let sd3 = s.sd.powi(3);
        assert!(close(s.skew, 42.0 / (8.0 * sd3)));
        assert!(close(s.kurtosis, 356.0 / (8.0 * s.sd.powi(4)) - 3.0));
    }

    #[test]
    fn summary_ignores_missing_values() {
        let s = NumericSummary::from_values("x", &[Some(1.0), None, Some(3.0)]);
        assert_eq!(s.n, 2);
        assert!(close(s.mean, 2.0));

        let single = NumericSummary::from_values("x", &[Some(1.0)]);
        assert!(single.sd.is_nan());
        assert!(NumericSummary::from_values("x", &[None]).mean.is_nan());
    }

    #[test]
    fn trimmed_mean_drops_tails() {
        let sorted = (1..=10).map(f64::from).collect::<Vec<_>>();
        assert!(close(trimmed_mean(&sorted, 0.1), 5.5));
        assert!(close(trimmed_mean(&[1.0, 2.0, 100.0], 0.1), 103.0 / 3.0));
    }

    #[test]
    fn heavy_trim_keeps_the_middle() {
        assert!(close(trimmed_mean(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5));
        assert!(close(trimmed_mean(&[1.0, 2.0, 50.0], 0.9), 2.0));
        assert!(trimmed_mean(&[], 0.5).is_nan());
    }

    #[test]
    fn frequencies_keep_missing_and_unexpected_categories() {
        let values = [Some("Yes"), Some("No"), None, Some("Yes"), Some("Maybe"), Some("NA")]
            .map(|v| v.map(String::from));
        let freq = Frequency::from_values("flag", &values);
        assert_eq!(freq.counts, vec![
            ("Maybe".to_string(), 1),
            ("No".to_string(), 1),
            ("Yes".to_string(), 2),
            (MISSING_LABEL.to_string(), 2),
        ]);
        assert_eq!(freq.total(), 6);
        assert!(close(freq.percent(3), 50.0));
    }

    #[test]
    fn report_excludes_dc_only() {
        let df = df! {
            columns::ABBREVIATION => ["AL", "DC", "OH", "UT"],
            columns::WAGE => ["7.25", "14.00", "8.80", "7.25"],
            columns::WAGE_FED_COMPARISON => ["Equal", "Above", "Above", "Equal"],
        }.unwrap();
        let config = ReportConfig {
            exclude_abbreviation: "DC".into(),
            numeric: vec![columns::WAGE.into()],
            categorical: vec![columns::WAGE_FED_COMPARISON.into()],
            conditioned: vec![ConditionedSummary {
                variable: columns::WAGE.into(),
                by: columns::WAGE_FED_COMPARISON.into(),
                equals: "Above".into(),
            }],
        };

        let description = describe_table(&PolicyTable::from_dataframe(df), &config).unwrap();
        assert_eq!((description.rows, description.excluded), (3, 1));
        assert_eq!(description.frequencies[0].total(), 3);
        assert!(close(description.numeric[0].max, 8.8));
        assert_eq!(description.conditioned[0].summary.n, 1);
        assert!(close(description.conditioned[0].summary.mean, 8.8));
    }
}
