//! Parametric Monte Carlo projection of portfolio value.
//!
//! Fits a normal distribution to the portfolio's historical daily returns
//! and compounds i.i.d. draws from it. This understates fat-tail risk by
//! construction; callers needing empirical resampling must treat that as a
//! known limitation of the model.

use crate::portfolio::{Portfolio, PortfolioError};
use crate::series::stats;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
    #[error("Portfolio has no historical returns to fit")]
    NoReturns,
    #[error("Invalid return distribution: mean {mean}, std {std}")]
    InvalidDistribution { mean: f64, std: f64 },
}

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Simulation run parameters. A `seed` makes the run reproducible; `None`
/// draws the generator state from system entropy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub n_simulations: usize,
    pub n_days: usize,
    pub initial_investment: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_simulations: 1000,
            n_days: 252,
            initial_investment: 10_000.0,
            seed: None,
        }
    }
}

/// Read-only reduction over a simulation matrix, for reporting collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub expected_final: f64,
    pub p5_final: f64,
    pub p95_final: f64,
    pub probability_of_loss: f64,
}

/// Normal-distribution simulator fitted to a daily return stream.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloSimulator {
    mean_return: f64,
    std_return: f64,
}

impl MonteCarloSimulator {
    /// Fit to the portfolio's aligned historical return stream.
    pub fn fit(portfolio: &Portfolio) -> Result<Self> {
        let returns: Vec<f64> = portfolio
            .portfolio_returns()
            .into_iter()
            .map(|(_, r)| r)
            .collect();
        if returns.is_empty() {
            return Err(SimulationError::NoReturns);
        }
        Ok(Self::from_moments(
            stats::mean(&returns),
            stats::sample_std(&returns),
        ))
    }

    pub fn from_moments(mean_return: f64, std_return: f64) -> Self {
        Self {
            mean_return,
            std_return,
        }
    }

    pub fn mean_return(&self) -> f64 {
        self.mean_return
    }

    pub fn std_return(&self) -> f64 {
        self.std_return
    }

    /// Run the projection: one row per trial, one column per simulated day,
    /// each cell the compounded portfolio value
    /// `initial_investment * prod(1 + r)` up to that day.
    ///
    /// Results are not cached; two unseeded runs differ.
    pub fn simulate(&self, config: &SimulationConfig) -> Result<Array2<f64>> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.simulate_with_rng(
            config.n_simulations,
            config.n_days,
            config.initial_investment,
            &mut rng,
        )
    }

    /// Same projection with an injected generator, for reproducible tests.
    pub fn simulate_with_rng<R: Rng + ?Sized>(
        &self,
        n_simulations: usize,
        n_days: usize,
        initial_investment: f64,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        let normal =
            Normal::new(self.mean_return, self.std_return).map_err(|_| {
                SimulationError::InvalidDistribution {
                    mean: self.mean_return,
                    std: self.std_return,
                }
            })?;

        tracing::debug!(
            n_simulations,
            n_days,
            mean = self.mean_return,
            std = self.std_return,
            "running Monte Carlo projection"
        );

        let mut paths = Array2::zeros((n_simulations, n_days));
        for mut row in paths.rows_mut() {
            let mut value = initial_investment;
            for cell in row.iter_mut() {
                value *= 1.0 + normal.sample(rng);
                *cell = value;
            }
        }

        Ok(paths)
    }
}

/// Distributional summary of the final simulated values. Percentiles use
/// linear interpolation; loss means finishing below the initial investment.
pub fn summarize(paths: &Array2<f64>, initial_investment: f64) -> SimulationSummary {
    let n_days = paths.ncols();
    if n_days == 0 || paths.nrows() == 0 {
        return SimulationSummary {
            expected_final: initial_investment,
            p5_final: initial_investment,
            p95_final: initial_investment,
            probability_of_loss: 0.0,
        };
    }

    let finals: Vec<f64> = paths.column(n_days - 1).to_vec();
    let losses = finals.iter().filter(|&&v| v < initial_investment).count();

    SimulationSummary {
        expected_final: stats::mean(&finals),
        p5_final: stats::quantile(&finals, 0.05),
        p95_final: stats::quantile(&finals, 0.95),
        probability_of_loss: losses as f64 / finals.len() as f64,
    }
}
