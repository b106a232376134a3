use chrono::NaiveDate;
use serde::Serialize;

/// Trading days per year used to annualize daily statistics. Fixed by
/// convention, not configurable.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean of a return stream. 0.0 for an empty stream.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 divisor). 0.0 when fewer than 2 points.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Annualized Sharpe ratio of a daily return stream. A zero standard
/// deviation yields 0 rather than a division failure.
pub fn sharpe_ratio(mean_return: f64, std_return: f64) -> f64 {
    if std_return == 0.0 {
        0.0
    } else {
        mean_return / std_return * TRADING_DAYS_PER_YEAR.sqrt()
    }
}

/// Maximum drawdown of a daily return stream: the most negative relative
/// decline of the cumulative-return index from its running maximum.
/// Always <= 0; exactly 0 when the underlying prices never decline.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut running_max = 1.0;
    let mut worst = 0.0f64;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > running_max {
            running_max = cumulative;
        }
        let drawdown = (cumulative - running_max) / running_max;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}

/// Quantile with linear interpolation between order statistics, matching the
/// convention of the upstream data tooling. `q` must be in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&q));
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// One row of a rolling-statistics table, aligned to the return index.
/// Positions before the window has filled are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub sharpe: Option<f64>,
}

/// Rolling mean/std/Sharpe over a trailing window of `window` return samples.
pub fn rolling_stats(dated_returns: &[(NaiveDate, f64)], window: usize) -> Vec<RollingPoint> {
    let mut points = Vec::with_capacity(dated_returns.len());

    for (i, &(date, _)) in dated_returns.iter().enumerate() {
        if window == 0 || i + 1 < window {
            points.push(RollingPoint {
                date,
                mean: None,
                std: None,
                sharpe: None,
            });
            continue;
        }
        let slice: Vec<f64> = dated_returns[i + 1 - window..=i]
            .iter()
            .map(|&(_, r)| r)
            .collect();
        let m = mean(&slice);
        let s = sample_std(&slice);
        points.push(RollingPoint {
            date,
            mean: Some(m),
            std: Some(s),
            sharpe: Some(sharpe_ratio(m, s)),
        });
    }

    points
}
