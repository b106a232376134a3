//! Preprocessing for a single price series: statistical outlier removal on
//! the return stream and calendar-gap filling. Every operation returns a new
//! `PriceSeries`; inputs are never mutated.

use crate::series::{stats, Bar, PriceSeries, SeriesError};
use chrono::Days;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Unsupported cleaning method: {0}")]
    UnsupportedMethod(String),
    #[error(transparent)]
    Series(#[from] SeriesError),
}

pub type Result<T> = std::result::Result<T, CleanError>;

/// Default z-score cutoff for `remove_outliers("zscore", ..)`.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Drop observations whose daily return is a statistical outlier.
///
/// `"iqr"` keeps returns within `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`; `"zscore"`
/// keeps returns whose absolute standardized value is below `threshold`.
/// The mask is over the return stream, so dropping return i drops bar i + 1;
/// the first observation has no return and is always retained as anchor.
pub fn remove_outliers(series: &PriceSeries, method: &str, threshold: f64) -> Result<PriceSeries> {
    let returns = series.returns();

    let mask: Vec<bool> = match method {
        "iqr" => {
            let q1 = stats::quantile(returns, 0.25);
            let q3 = stats::quantile(returns, 0.75);
            let iqr = q3 - q1;
            let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            returns.iter().map(|r| *r >= lo && *r <= hi).collect()
        }
        "zscore" => {
            let mean = stats::mean(returns);
            let std = stats::sample_std(returns);
            if std == 0.0 {
                // Nothing deviates; keep everything.
                vec![true; returns.len()]
            } else {
                returns
                    .iter()
                    .map(|r| ((r - mean) / std).abs() < threshold)
                    .collect()
            }
        }
        other => return Err(CleanError::UnsupportedMethod(other.to_string())),
    };

    let retained: Vec<Bar> = series
        .bars()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i == 0 || mask[i - 1])
        .map(|(_, bar)| bar.clone())
        .collect();

    let dropped = series.bars().len() - retained.len();
    if dropped > 0 {
        tracing::debug!(symbol = series.symbol(), method, dropped, "removed outliers");
    }

    Ok(PriceSeries::from_bars(
        series.symbol(),
        series.asset_type(),
        series.source(),
        retained,
    )?)
}

/// Reindex the series onto the complete daily calendar spanning its min/max
/// date and fill the introduced gaps.
///
/// `"ffill"` copies the last known observation forward; `"interpolate"`
/// fills price fields linearly in calendar time between the surrounding
/// known observations. Fields absent on the relevant side of a gap stay
/// absent rather than erroring.
pub fn fill_missing_dates(series: &PriceSeries, method: &str) -> Result<PriceSeries> {
    if method != "ffill" && method != "interpolate" {
        return Err(CleanError::UnsupportedMethod(method.to_string()));
    }

    let bars = series.bars();
    let first = bars[0].date;
    let last = bars[bars.len() - 1].date;

    let mut filled = Vec::new();
    let mut known_idx = 0; // index of the latest known bar at or before `date`
    let mut date = first;
    while date <= last {
        if bars[known_idx + 1..]
            .first()
            .is_some_and(|next| next.date == date)
        {
            known_idx += 1;
        }

        if bars[known_idx].date == date {
            filled.push(bars[known_idx].clone());
        } else if method == "ffill" {
            filled.push(Bar {
                date,
                ..bars[known_idx].clone()
            });
        } else {
            let prev = &bars[known_idx];
            let next = &bars[known_idx + 1];
            let span = (next.date - prev.date).num_days() as f64;
            let frac = (date - prev.date).num_days() as f64 / span;
            let lerp = |a: f64, b: f64| a + (b - a) * frac;
            let lerp_opt = |a: Option<f64>, b: Option<f64>| match (a, b) {
                (Some(a), Some(b)) => Some(lerp(a, b)),
                _ => None,
            };
            filled.push(Bar {
                date,
                open: lerp_opt(prev.open, next.open),
                high: lerp_opt(prev.high, next.high),
                low: lerp_opt(prev.low, next.low),
                close: lerp(prev.close, next.close),
                volume: lerp_opt(prev.volume, next.volume),
                adj_close: lerp_opt(prev.adj_close, next.adj_close),
            });
        }

        date = date + Days::new(1);
    }

    Ok(PriceSeries::from_bars(
        series.symbol(),
        series.asset_type(),
        series.source(),
        filled,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bar(date: NaiveDate, close: f64) -> Bar {
        Bar {
            date,
            open: Some(close - 1.0),
            high: None,
            low: None,
            close,
            volume: Some(1000.0),
            adj_close: None,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_iqr_keeps_anchor_and_subset() {
        // Mostly flat returns with one violent spike.
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 208.0, 209.0, 210.0];
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(d(i as u32 + 1), c))
            .collect();
        let series = PriceSeries::from_bars("ACME", "stock", "test", bars).unwrap();

        let cleaned = remove_outliers(&series, "iqr", 0.0).unwrap();

        // Anchor survives and output is a subset of the input rows.
        assert_eq!(cleaned.bars()[0].date, series.bars()[0].date);
        assert!(cleaned.bars().len() < series.bars().len());
        for cleaned_bar in cleaned.bars() {
            assert!(series.bars().contains(cleaned_bar));
        }
        // The +100% day is gone.
        assert!(cleaned.bars().iter().all(|b| b.close < 200.0 || b.close > 208.0));
    }

    #[test]
    fn test_zscore_threshold() {
        let closes = [100.0, 101.0, 100.0, 101.0, 100.0, 150.0];
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(d(i as u32 + 1), c))
            .collect();
        let series = PriceSeries::from_bars("ACME", "stock", "test", bars).unwrap();

        let cleaned = remove_outliers(&series, "zscore", 1.5).unwrap();
        assert!(cleaned.bars().len() < series.bars().len());

        // A huge threshold keeps every row.
        let kept = remove_outliers(&series, "zscore", 100.0).unwrap();
        assert_eq!(kept.bars().len(), series.bars().len());
    }

    #[test]
    fn test_zscore_zero_std_keeps_every_row() {
        // Identical returns have zero dispersion; no row is an outlier.
        let bars: Vec<Bar> = (1..=5).map(|day| bar(d(day), 100.0)).collect();
        let series = PriceSeries::from_bars("ACME", "stock", "test", bars).unwrap();

        let kept = remove_outliers(&series, "zscore", 3.0).unwrap();
        assert_eq!(kept.bars(), series.bars());
    }

    #[test]
    fn test_unsupported_method() {
        let series =
            PriceSeries::from_bars("ACME", "stock", "test", vec![bar(d(1), 100.0), bar(d(2), 101.0)])
                .unwrap();
        assert!(matches!(
            remove_outliers(&series, "mad", 3.0),
            Err(CleanError::UnsupportedMethod(m)) if m == "mad"
        ));
        assert!(matches!(
            fill_missing_dates(&series, "bfill"),
            Err(CleanError::UnsupportedMethod(m)) if m == "bfill"
        ));
    }

    #[test]
    fn test_ffill_one_row_per_calendar_day() {
        let series = PriceSeries::from_bars(
            "ACME",
            "stock",
            "test",
            vec![bar(d(1), 100.0), bar(d(4), 106.0), bar(d(6), 110.0)],
        )
        .unwrap();

        let filled = fill_missing_dates(&series, "ffill").unwrap();

        assert_eq!(filled.bars().len(), 6);
        for (i, b) in filled.bars().iter().enumerate() {
            assert_eq!(b.date, d(i as u32 + 1));
        }
        // Gap days carry the previous close forward.
        assert_eq!(filled.bars()[1].close, 100.0);
        assert_eq!(filled.bars()[2].close, 100.0);
        assert_eq!(filled.bars()[4].close, 106.0);
    }

    #[test]
    fn test_fill_keeps_absent_fields_absent() {
        // First observation carries close only; the gap fills must not
        // invent the fields it never had.
        let sparse = Bar {
            date: d(1),
            open: None,
            high: None,
            low: None,
            close: 100.0,
            volume: None,
            adj_close: None,
        };
        let series = PriceSeries::from_bars(
            "ACME",
            "stock",
            "test",
            vec![sparse, bar(d(4), 106.0)],
        )
        .unwrap();

        let ffilled = fill_missing_dates(&series, "ffill").unwrap();
        for b in &ffilled.bars()[..3] {
            assert!(b.open.is_none());
            assert!(b.volume.is_none());
        }

        // Interpolation needs both endpoints; one-sided fields stay absent.
        let lerped = fill_missing_dates(&series, "interpolate").unwrap();
        for b in &lerped.bars()[..3] {
            assert!(b.open.is_none());
            assert!(b.volume.is_none());
        }
        assert_relative_eq!(lerped.bars()[1].close, 102.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_linear() {
        let series = PriceSeries::from_bars(
            "ACME",
            "stock",
            "test",
            vec![bar(d(1), 100.0), bar(d(4), 106.0)],
        )
        .unwrap();

        let filled = fill_missing_dates(&series, "interpolate").unwrap();

        assert_eq!(filled.bars().len(), 4);
        assert_relative_eq!(filled.bars()[1].close, 102.0, epsilon = 1e-12);
        assert_relative_eq!(filled.bars()[2].close, 104.0, epsilon = 1e-12);
        assert_relative_eq!(filled.bars()[1].open.unwrap(), 101.0, epsilon = 1e-12);
    }
}
