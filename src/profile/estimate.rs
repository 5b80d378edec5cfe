use ndarray::Array2;
use polars::prelude::Column;

use crate::{PipelineError, profile::{FittedMixture, MixtureModel}, table::{PolicyTable, columns}};

/// A fitted latent profile model together with the indicators it was fitted on.
#[derive(Debug, Clone)]
pub struct ProfileFit {
    pub indicators: Vec<String>,
    /// Components ordered so class 1 has the lowest mean on the first indicator.
    pub mixture: FittedMixture,
}

impl ProfileFit {
    /// Class label (1-based) of every row, in table order.
    pub fn classes(&self) -> Vec<i32> {
        self.mixture.assignments().into_iter().map(|j| j as i32 + 1).collect()
    }
}

/// Collect the indicator columns into an `n x d` matrix. Every cell must be present.
pub fn indicator_matrix(table: &PolicyTable, indicators: &[String]) -> Result<Array2<f64>, PipelineError> {
    let (n, d) = (table.len(), indicators.len());
    let mut data = Array2::<f64>::zeros((n, d));

    for (l, name) in indicators.iter().enumerate() {
        for (row, value) in table.numeric(name)?.into_iter().enumerate() {
            data[[row, l]] = value.ok_or_else(|| PipelineError::MissingIndicator { column: name.clone(), row })?;
        }
    }

    Ok(data)
}

/// Fit `k` latent profiles over `indicators` and append the `Class` column.
///
/// Fails rather than falling back to fewer profiles when the fit does not converge.
pub fn estimate_profiles(
    table: &PolicyTable,
    indicators: &[String],
    k: usize,
    model: &dyn MixtureModel,
) -> Result<(PolicyTable, ProfileFit), PipelineError> {
    let data = indicator_matrix(table, indicators)?;
    log::info!("[profile] fitting {k} profiles on {} rows over {}", data.nrows(), indicators.join(", "));

    let mixture = model.fit(data.view(), k)?.ordered_by_mean(0);
    let fit = ProfileFit { indicators: indicators.to_vec(), mixture };

    log::info!(
        "[profile] log-likelihood {:.3}, BIC {:.3}, entropy {:.3}, sizes {:?}",
        fit.mixture.log_likelihood,
        fit.mixture.bic(),
        fit.mixture.entropy(),
        fit.mixture.sizes(),
    );

    let classed = table.with_columns(vec![Column::new(columns::CLASS.into(), fit.classes())])?;
    Ok((classed, fit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::GaussianMixture;
    use polars::prelude::DataFrame;

    fn table(tax: &[Option<&str>], wage: &[Option<&str>]) -> PolicyTable {
        PolicyTable::from_dataframe(DataFrame::new(vec![
            Column::new("Cigarette_tax".into(), tax),
            Column::new("Wage".into(), wage),
        ]).unwrap())
    }

    fn indicators() -> Vec<String> {
        vec!["Cigarette_tax".to_string(), "Wage".to_string()]
    }

    #[test]
    fn every_row_receives_a_class_in_range() {
        let tax = ["0.5", "0.6", "0.55", "2.0", "2.1", "2.05", "4.0", "4.2", "4.1"].map(Some);
        let wage = ["7.25", "7.5", "7.3", "9.0", "9.2", "9.1", "12.0", "12.5", "12.2"].map(Some);
        let (classed, fit) = estimate_profiles(&table(&tax, &wage), &indicators(), 3, &GaussianMixture::default()).unwrap();

        let classes = classed.numeric("Class").unwrap();
        assert_eq!(classes.len(), 9);
        assert!(classes.iter().all(|c| matches!(c, Some(v) if (1.0..=3.0).contains(v))));
        assert_eq!(fit.classes(), vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn missing_indicator_is_reported() {
        let tax = [Some("0.5"), None, Some("1.0")];
        let wage = [Some("7.25"), Some("8.0"), Some("9.0")];
        match estimate_profiles(&table(&tax, &wage), &indicators(), 2, &GaussianMixture::default()) {
            Err(PipelineError::MissingIndicator { column, row }) => {
                assert_eq!(column, "Cigarette_tax");
                assert_eq!(row, 1);
            }
            other => panic!("expected MissingIndicator, got {other:?}"),
        }
    }

    #[test]
    fn convergence_failure_propagates() {
        let tax = [Some("0.5"), Some("1.0")];
        let wage = [Some("7.25"), Some("8.0")];
        let err = estimate_profiles(&table(&tax, &wage), &indicators(), 3, &GaussianMixture::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Convergence { components: 3, .. }));
    }
}
