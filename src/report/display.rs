use comfy_table::{Attribute, Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};

use crate::profile::ProfileFit;
use super::{Description, Frequency, NumericSummary};

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|label| Cell::new(label).add_attribute(Attribute::Bold)).collect()
}

fn table_with(labels: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(labels));
    table
}

fn number(value: f64) -> Cell {
    let text = if value.is_finite() { format!("{value:.2}") } else { "NA".to_string() };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn summary_row(label: &str, s: &NumericSummary) -> Vec<Cell> {
    let mut row = vec![Cell::new(label), Cell::new(s.n).set_alignment(CellAlignment::Right)];
    row.extend([s.mean, s.sd, s.median, s.trimmed, s.mad, s.min, s.max, s.range, s.skew, s.kurtosis, s.se].map(number));
    row
}

const SUMMARY_HEADER: [&str; 13] = [
    "vars", "n", "mean", "sd", "median", "trimmed", "mad", "min", "max", "range", "skew", "kurtosis", "se",
];

fn numeric_table(summaries: &[NumericSummary]) -> Table {
    let mut table = table_with(&SUMMARY_HEADER);
    for s in summaries {
        table.add_row(summary_row(&s.variable, s));
    }
    table
}

fn frequency_table(freq: &Frequency) -> Table {
    let mut table = table_with(&[freq.variable.as_str(), "n", "%"]);
    for (category, count) in &freq.counts {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(count).set_alignment(CellAlignment::Right),
            number(freq.percent(*count)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(freq.total()).set_alignment(CellAlignment::Right),
        number(100.0),
    ]);
    table
}

fn profile_table(fit: &ProfileFit) -> Table {
    let mut labels = vec!["Class", "n", "weight"];
    labels.extend(fit.indicators.iter().map(String::as_str));
    let mut table = table_with(&labels);

    let sizes = fit.mixture.sizes();
    for (j, size) in sizes.iter().enumerate() {
        let mut row = vec![
            Cell::new(format!("#{}", j + 1)),
            Cell::new(size).set_alignment(CellAlignment::Right),
            number(fit.mixture.weights[j]),
        ];
        row.extend(fit.mixture.means.row(j).iter().map(|&m| number(m)));
        table.add_row(row);
    }
    table
}

fn fit_table(fit: &ProfileFit) -> Table {
    let m = &fit.mixture;
    let mut table = table_with(&["Statistic", "Value"]);
    table.add_row(vec![Cell::new("Log-likelihood"), number(m.log_likelihood)]);
    table.add_row(vec![Cell::new("Parameters"), Cell::new(m.parameters).set_alignment(CellAlignment::Right)]);
    table.add_row(vec![Cell::new("AIC"), number(m.aic())]);
    table.add_row(vec![Cell::new("BIC"), number(m.bic())]);
    table.add_row(vec![Cell::new("SABIC"), number(m.sabic())]);
    table.add_row(vec![Cell::new("Entropy"), number(m.entropy())]);
    table.add_row(vec![Cell::new("Iterations"), Cell::new(m.iterations).set_alignment(CellAlignment::Right)]);
    table
}

fn section(out: &mut String, title: &str, table: &Table) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');
}

/// Render the descriptive report, and the profile solution when given, as text tables.
pub fn render_report(description: &Description, fit: Option<&ProfileFit>) -> String {
    let mut out = format!(
        "Descriptive statistics: {} rows ({} excluded)\n",
        description.rows, description.excluded,
    );

    section(&mut out, "Numeric variables", &numeric_table(&description.numeric));

    for freq in &description.frequencies {
        section(&mut out, &format!("Frequencies: {}", freq.variable), &frequency_table(freq));
    }

    for c in &description.conditioned {
        let mut table = table_with(&SUMMARY_HEADER);
        table.add_row(summary_row(&c.summary.variable, &c.summary));
        section(&mut out, &format!("{} where {} == {:?}", c.summary.variable, c.by, c.equals), &table);
    }

    if let Some(fit) = fit {
        section(&mut out, "Latent profiles", &profile_table(fit));
        section(&mut out, "Model fit", &fit_table(fit));
    }

    out
}

/// Print the report to stdout.
pub fn print_report(description: &Description, fit: Option<&ProfileFit>) {
    print!("{}", render_report(description, fit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{profile::FittedMixture, report::Conditioned};
    use ndarray::{Array2, array};

    fn description() -> Description {
        Description {
            rows: 3,
            excluded: 1,
            numeric: vec![NumericSummary::from_values("Wage", &[Some(7.25), Some(8.8), None])],
            frequencies: vec![Frequency::from_values("Tax_EITC", &[Some("Yes".into()), None, Some("No".into())])],
            conditioned: vec![Conditioned {
                by: "Wage_fed_comparison_7.25".into(),
                equals: "Above".into(),
                summary: NumericSummary::from_values("Wage", &[Some(8.8)]),
            }],
        }
    }

    #[test]
    fn report_lists_every_section() {
        let text = render_report(&description(), None);
        assert!(text.contains("3 rows (1 excluded)"));
        assert!(text.contains("Frequencies: Tax_EITC"));
        assert!(text.contains("<NA>"));
        assert!(text.contains("Wage where Wage_fed_comparison_7.25 == \"Above\""));
        assert!(!text.contains("Latent profiles"));
    }

    #[test]
    fn profile_tables_follow_the_fit() {
        let mixture = FittedMixture {
            weights: array![0.5, 0.5],
            means: array![[1.0], [9.0]],
            variances: array![[1.0], [1.0]],
            posterior: Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap(),
            log_likelihood: -4.0,
            iterations: 3,
            parameters: 4,
        };
        let fit = ProfileFit { indicators: vec!["Wage".into()], mixture };

        let text = render_report(&description(), Some(&fit));
        assert!(text.contains("Latent profiles"));
        assert!(text.contains("#2"));
        assert!(text.contains("9.00"));
        assert!(text.contains("BIC"));
    }
}
