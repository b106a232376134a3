use anyhow::Context;
use market_analytics::analysis::monte_carlo::{summarize, MonteCarloSimulator};
use market_analytics::clean;
use market_analytics::config::Config;
use market_analytics::data::loader::DataLoader;
use market_analytics::portfolio::Portfolio;
use market_analytics::series::PriceSeries;
use std::collections::BTreeMap;
use std::env;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config/portfolio.yaml".to_string());
    let config = Config::load(&config_path)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("loading {config_path}"))?;

    println!(
        "Loaded portfolio '{}' with {} assets",
        config.portfolio.name,
        config.portfolio.assets.len()
    );

    let mut holdings = BTreeMap::new();
    let mut weights = BTreeMap::new();
    for asset in &config.portfolio.assets {
        let table = DataLoader::load_price_table(&asset.path)
            .with_context(|| format!("loading {}", asset.path))?;
        let mut series = PriceSeries::from_table(
            &asset.symbol,
            &asset.asset_type,
            &asset.path,
            &table,
        )
        .with_context(|| format!("building series for {}", asset.symbol))?;

        if let Some(method) = &config.cleaning.remove_outliers {
            series = clean::remove_outliers(&series, method, config.cleaning.zscore_threshold)
                .with_context(|| format!("removing outliers for {}", asset.symbol))?;
        }
        if let Some(method) = &config.cleaning.fill_missing {
            series = clean::fill_missing_dates(&series, method)
                .with_context(|| format!("filling dates for {}", asset.symbol))?;
        }

        println!(
            "\n{} ({} observations, {} to {})",
            series.symbol(),
            series.bars().len(),
            series.bars()[0].date,
            series.bars()[series.bars().len() - 1].date
        );
        let stats = series.stats();
        println!("  mean return:   {:>9.5}", stats.mean_return);
        println!("  std return:    {:>9.5}", stats.std_return);
        println!("  sharpe ratio:  {:>9.3}", stats.sharpe_ratio);
        println!("  total return:  {:>8.2}%", stats.total_return * 100.0);
        println!("  volatility:    {:>8.2}%", stats.volatility * 100.0);
        println!("  max drawdown:  {:>8.2}%", stats.max_drawdown * 100.0);

        holdings.insert(asset.symbol.clone(), series);
        weights.insert(asset.symbol.clone(), asset.weight);
    }

    let portfolio = Portfolio::new(config.portfolio.name.clone(), holdings, weights)?;
    if portfolio.rescaled() {
        println!("\nNote: supplied weights were rescaled to sum to 1.0");
    }

    let stats = portfolio.stats();
    println!("\n=== Portfolio '{}' ===", portfolio.name());
    println!(
        "  aligned return observations: {}",
        portfolio.portfolio_returns().len()
    );
    println!("  mean return:           {:>9.5}", stats.mean_return);
    println!("  std return:            {:>9.5}", stats.std_return);
    println!("  sharpe ratio:          {:>9.3}", stats.sharpe_ratio);
    println!("  annualized return:     {:>8.2}%", stats.annualized_return * 100.0);
    println!(
        "  annualized volatility: {:>8.2}%",
        stats.annualized_volatility * 100.0
    );

    let simulator = MonteCarloSimulator::fit(&portfolio)?;
    let paths = simulator.simulate(&config.simulation)?;
    let summary = summarize(&paths, config.simulation.initial_investment);

    println!(
        "\n=== Monte Carlo ({} simulations, {} days) ===",
        config.simulation.n_simulations, config.simulation.n_days
    );
    println!(
        "  initial investment:  ${:>12.2}",
        config.simulation.initial_investment
    );
    println!("  expected final:      ${:>12.2}", summary.expected_final);
    println!("  5th percentile:      ${:>12.2}", summary.p5_final);
    println!("  95th percentile:     ${:>12.2}", summary.p95_final);
    println!(
        "  probability of loss: {:>12.2}%",
        summary.probability_of_loss * 100.0
    );

    Ok(())
}
