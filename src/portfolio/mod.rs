use crate::series::{stats, PriceSeries, TRADING_DAYS_PER_YEAR};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Holdings and weights name different symbols: {}", .0.join(", "))]
    WeightMismatch(Vec<String>),
    #[error("Invalid weight {weight} for symbol {symbol}")]
    InvalidWeight { symbol: String, weight: f64 },
    #[error("Weights sum to {0}, cannot rescale to 1.0")]
    UnnormalizableWeights(f64),
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Statistics over the portfolio's aligned weighted return stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub mean_return: f64,
    pub std_return: f64,
    pub sharpe_ratio: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
}

/// A named weighted collection of price series.
///
/// Weights that do not sum to 1.0 are proportionally rescaled at
/// construction; the rescale is logged and observable through `rescaled()`.
/// Holdings/weights key-set drift is a hard construction error.
#[derive(Debug, Clone)]
pub struct Portfolio {
    name: String,
    holdings: BTreeMap<String, PriceSeries>,
    weights: BTreeMap<String, f64>,
    rescaled: bool,
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl Portfolio {
    pub fn new(
        name: impl Into<String>,
        holdings: BTreeMap<String, PriceSeries>,
        mut weights: BTreeMap<String, f64>,
    ) -> Result<Self> {
        let name = name.into();

        let holding_keys: BTreeSet<&String> = holdings.keys().collect();
        let weight_keys: BTreeSet<&String> = weights.keys().collect();
        if holding_keys != weight_keys {
            let mismatched: Vec<String> = holding_keys
                .symmetric_difference(&weight_keys)
                .map(|s| (*s).clone())
                .collect();
            return Err(PortfolioError::WeightMismatch(mismatched));
        }

        for (symbol, &weight) in &weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(PortfolioError::InvalidWeight {
                    symbol: symbol.clone(),
                    weight,
                });
            }
        }

        let total: f64 = weights.values().sum();
        let mut rescaled = false;
        if !weights.is_empty() && (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            if total <= 0.0 {
                return Err(PortfolioError::UnnormalizableWeights(total));
            }
            tracing::warn!(
                portfolio = %name,
                weight_sum = total,
                "weights do not sum to 1.0, rescaling proportionally"
            );
            for weight in weights.values_mut() {
                *weight /= total;
            }
            rescaled = true;
        }

        Ok(Self {
            name,
            holdings,
            weights,
            rescaled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holdings(&self) -> &BTreeMap<String, PriceSeries> {
        &self.holdings
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    /// Whether construction had to rescale the supplied weights.
    pub fn rescaled(&self) -> bool {
        self.rescaled
    }

    /// Weighted daily return stream over the dates common to every holding's
    /// return stream (inner join: a date missing from any holding is dropped
    /// entirely, never imputed). Empty holdings yield an empty stream.
    pub fn portfolio_returns(&self) -> Vec<(NaiveDate, f64)> {
        let per_symbol: BTreeMap<&String, BTreeMap<NaiveDate, f64>> = self
            .holdings
            .iter()
            .map(|(symbol, series)| (symbol, series.dated_returns().into_iter().collect()))
            .collect();

        let mut symbols = per_symbol.iter();
        let Some((_, first)) = symbols.next() else {
            return Vec::new();
        };
        let mut common: BTreeSet<NaiveDate> = first.keys().copied().collect();
        for (_, returns) in symbols {
            common.retain(|date| returns.contains_key(date));
        }

        common
            .into_iter()
            .map(|date| {
                let weighted = per_symbol
                    .iter()
                    .map(|(symbol, returns)| self.weights[*symbol] * returns[&date])
                    .sum();
                (date, weighted)
            })
            .collect()
    }

    /// Portfolio-level statistics, computed on demand from the aligned
    /// weighted return stream with the same primitives as per-series stats.
    pub fn stats(&self) -> PortfolioStats {
        let returns: Vec<f64> = self.portfolio_returns().into_iter().map(|(_, r)| r).collect();

        let mean_return = stats::mean(&returns);
        let std_return = stats::sample_std(&returns);
        PortfolioStats {
            mean_return,
            std_return,
            sharpe_ratio: stats::sharpe_ratio(mean_return, std_return),
            annualized_return: mean_return * TRADING_DAYS_PER_YEAR,
            annualized_volatility: std_return * TRADING_DAYS_PER_YEAR.sqrt(),
        }
    }
}
