use crate::analysis::monte_carlo::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    pub path: String,
    #[serde(default = "default_asset_type")]
    pub asset_type: String,
    pub weight: f64,
}

fn default_asset_type() -> String {
    "stock".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub name: String,
    pub assets: Vec<AssetConfig>,
}

/// Optional preprocessing applied to every series before analysis.
#[derive(Debug, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Outlier method name (`iqr` or `zscore`), or absent to skip.
    pub remove_outliers: Option<String>,
    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,
    /// Gap-fill method name (`ffill` or `interpolate`), or absent to skip.
    pub fill_missing: Option<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            remove_outliers: None,
            zscore_threshold: default_zscore_threshold(),
            fill_missing: None,
        }
    }
}

fn default_zscore_threshold() -> f64 {
    crate::clean::DEFAULT_ZSCORE_THRESHOLD
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    pub simulation: SimulationConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}
