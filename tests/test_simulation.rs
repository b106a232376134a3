use approx::assert_relative_eq;
use chrono::NaiveDate;
use market_analytics::analysis::monte_carlo::{
    summarize, MonteCarloSimulator, SimulationConfig, SimulationError,
};
use market_analytics::{Bar, Portfolio, PriceSeries};
use std::collections::BTreeMap;

fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            adj_close: None,
        })
        .collect();
    PriceSeries::from_bars(symbol, "stock", "test", bars).unwrap()
}

#[test]
fn test_fit_uses_portfolio_return_moments() {
    let holdings = BTreeMap::from([
        ("A".to_string(), series("A", &[100.0, 101.0, 102.0, 100.0])),
        ("B".to_string(), series("B", &[50.0, 49.5, 50.5, 51.0])),
    ]);
    let weights = BTreeMap::from([("A".to_string(), 0.5), ("B".to_string(), 0.5)]);
    let portfolio = Portfolio::new("P", holdings, weights).unwrap();

    let simulator = MonteCarloSimulator::fit(&portfolio).unwrap();
    let stats = portfolio.stats();
    assert_relative_eq!(simulator.mean_return(), stats.mean_return, epsilon = 1e-12);
    assert_relative_eq!(simulator.std_return(), stats.std_return, epsilon = 1e-12);
}

#[test]
fn test_fit_fails_on_empty_return_stream() {
    let portfolio = Portfolio::new("P", BTreeMap::new(), BTreeMap::new()).unwrap();
    assert!(matches!(
        MonteCarloSimulator::fit(&portfolio),
        Err(SimulationError::NoReturns)
    ));
}

#[test]
fn test_shape_and_first_day_compounding() {
    let mean = 0.001;
    let std = 0.01;
    let v0 = 10_000.0;
    let simulator = MonteCarloSimulator::from_moments(mean, std);
    let paths = simulator
        .simulate(&SimulationConfig {
            n_simulations: 5_000,
            n_days: 15,
            initial_investment: v0,
            seed: Some(2024),
        })
        .unwrap();

    assert_eq!(paths.shape(), &[5_000, 15]);

    // Every first-day value is one compounding step from v0: the implied
    // return is a normal draw, so it stays within a generous sigma band.
    for &value in paths.column(0) {
        let implied = value / v0 - 1.0;
        assert!(
            (implied - mean).abs() < 10.0 * std,
            "first-day return {implied} outside plausible band"
        );
    }
}

#[test]
fn test_final_mean_converges_to_compounded_drift() {
    let mean = 0.001;
    let std = 0.01;
    let v0 = 10_000.0;
    let n_days = 20;
    let simulator = MonteCarloSimulator::from_moments(mean, std);
    let paths = simulator
        .simulate(&SimulationConfig {
            n_simulations: 20_000,
            n_days,
            initial_investment: v0,
            seed: Some(7),
        })
        .unwrap();

    let finals: Vec<f64> = paths.column(n_days - 1).to_vec();
    let mean_final = finals.iter().sum::<f64>() / finals.len() as f64;
    let expected = v0 * (1.0 + mean).powi(n_days as i32);

    // Sampling error of the mean is ~ v0 * std * sqrt(d) / sqrt(n) ≈ 3.2
    // here; a 0.5% relative tolerance is far outside that.
    assert_relative_eq!(mean_final, expected, max_relative = 0.005);
}

#[test]
fn test_seeded_reproducibility_and_unseeded_variation() {
    let simulator = MonteCarloSimulator::from_moments(0.0005, 0.015);
    let seeded = SimulationConfig {
        n_simulations: 50,
        n_days: 30,
        initial_investment: 1_000.0,
        seed: Some(11),
    };
    assert_eq!(
        simulator.simulate(&seeded).unwrap(),
        simulator.simulate(&seeded).unwrap()
    );

    let unseeded = SimulationConfig {
        seed: None,
        ..seeded
    };
    // Statistically certain to differ somewhere in the matrix.
    assert_ne!(
        simulator.simulate(&unseeded).unwrap(),
        simulator.simulate(&unseeded).unwrap()
    );
}

#[test]
fn test_summary_percentiles_bracket_mean() {
    let simulator = MonteCarloSimulator::from_moments(0.0, 0.01);
    let v0 = 10_000.0;
    let paths = simulator
        .simulate(&SimulationConfig {
            n_simulations: 2_000,
            n_days: 50,
            initial_investment: v0,
            seed: Some(5),
        })
        .unwrap();

    let summary = summarize(&paths, v0);
    assert!(summary.p5_final < summary.expected_final);
    assert!(summary.expected_final < summary.p95_final);
    // Zero drift: roughly half the paths finish below the start.
    assert!(summary.probability_of_loss > 0.3 && summary.probability_of_loss < 0.7);
}
