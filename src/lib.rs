//! Descriptive and simulated risk/return statistics for price time series
//! and weighted portfolios: per-series statistics, preprocessing, portfolio
//! aggregation and Monte Carlo projection. Data acquisition and report
//! rendering live outside this crate; it consumes in-memory tabular price
//! data and hands back statistics structs and arrays.

pub mod analysis;
pub mod clean;
pub mod config;
pub mod data;
pub mod portfolio;
pub mod series;

pub use analysis::monte_carlo::{
    summarize, MonteCarloSimulator, SimulationConfig, SimulationSummary,
};
pub use data::{DataError, PriceTable};
pub use portfolio::{Portfolio, PortfolioError, PortfolioStats};
pub use series::{Bar, PriceSeries, SeriesError, SeriesStats};
