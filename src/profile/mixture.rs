use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Diagonal covariance structures, named as in mclust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Covariance {
    /// One variance shared by every indicator and every profile.
    EII,
    /// Per-indicator variances shared by every profile (equal variances, zero covariances).
    EEI,
    /// Per-indicator variances free in every profile.
    VVI,
}

impl Covariance {
    /// Number of free variance parameters for `k` components over `d` indicators.
    pub fn parameter_count(self, k: usize, d: usize) -> usize {
        match self {
            Covariance::EII => 1,
            Covariance::EEI => d,
            Covariance::VVI => k * d,
        }
    }
}

/// Any finite-mixture estimator that can partition rows of `data` into `k` components.
pub trait MixtureModel {
    fn fit(&self, data: ArrayView2<f64>, k: usize) -> Result<FittedMixture, PipelineError>;
}

/// The result of a mixture fit. Components are indexed `0..k`.
#[derive(Debug, Clone)]
pub struct FittedMixture {
    pub weights: Array1<f64>,
    /// `k x d` component means.
    pub means: Array2<f64>,
    /// `k x d` component variances (rows repeat for shared structures).
    pub variances: Array2<f64>,
    /// `n x k` posterior membership probabilities.
    pub posterior: Array2<f64>,
    pub log_likelihood: f64,
    pub iterations: usize,
    /// Free parameters of the model, for information criteria.
    pub parameters: usize,
}

impl FittedMixture {
    pub fn components(&self) -> usize { self.weights.len() }

    pub fn observations(&self) -> usize { self.posterior.nrows() }

    /// Hard assignment: the most probable component of every row.
    pub fn assignments(&self) -> Vec<usize> {
        self.posterior.rows().into_iter()
            .map(|row| {
                row.iter().enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (j, &p)| if p > best.1 { (j, p) } else { best })
                    .0
            })
            .collect()
    }

    /// Rows assigned to each component.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.components()];
        for j in self.assignments() {
            sizes[j] += 1;
        }
        sizes
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * self.parameters as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood + self.parameters as f64 * (self.observations() as f64).ln()
    }

    /// Sample-size adjusted BIC.
    pub fn sabic(&self) -> f64 {
        let n = self.observations() as f64;
        -2.0 * self.log_likelihood + self.parameters as f64 * ((n + 2.0) / 24.0).ln()
    }

    /// Relative entropy of the posterior in [0, 1]; 1 means perfectly separated profiles.
    pub fn entropy(&self) -> f64 {
        let (n, k) = self.posterior.dim();
        if k < 2 || n == 0 { return 1.0 }
        let raw: f64 = self.posterior.iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.ln())
            .sum();
        1.0 - raw / (n as f64 * (k as f64).ln())
    }

    /// Renumber components so their means on indicator `by` ascend.
    pub fn ordered_by_mean(&self, by: usize) -> Self {
        let mut order = (0..self.components()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| self.means[[a, by]].total_cmp(&self.means[[b, by]]));

        let select_rows = |m: &Array2<f64>| m.select(ndarray::Axis(0), &order);
        Self {
            weights: order.iter().map(|&j| self.weights[j]).collect(),
            means: select_rows(&self.means),
            variances: select_rows(&self.variances),
            posterior: self.posterior.select(ndarray::Axis(1), &order),
            log_likelihood: self.log_likelihood,
            iterations: self.iterations,
            parameters: self.parameters,
        }
    }
}
