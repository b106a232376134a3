pub mod stats;

use crate::data::{DataError, PriceTable};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

pub use stats::{RollingPoint, TRADING_DAYS_PER_YEAR};

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Duplicate date in series: {0}")]
    DuplicateDate(NaiveDate),
    #[error("Non-finite close {close} on {date}")]
    NonFiniteClose { date: NaiveDate, close: f64 },
    #[error("Series has no observations")]
    Empty,
}

pub type Result<T> = std::result::Result<T, SeriesError>;

/// One daily observation. Only `close` is mandatory; providers differ on the
/// rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
    pub adj_close: Option<f64>,
}

/// Derived statistics of a price series, recomputed whenever a series is
/// constructed. All figures are over the daily return stream except
/// `total_return`, which is close-to-close over the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub mean_return: f64,
    pub std_return: f64,
    pub sharpe_ratio: f64,
    pub total_return: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
}

/// One asset's validated, time-ordered price history.
///
/// Immutable once constructed: cleaning operations hand back new instances,
/// and the return stream plus `SeriesStats` are derived eagerly at
/// construction so no partially-valid state is ever observable.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    asset_type: String,
    source: String,
    bars: Vec<Bar>,
    returns: Vec<f64>,
    stats: SeriesStats,
}

impl PriceSeries {
    /// Build a series from raw tabular data. Fails with `MissingColumns`
    /// naming which of `date`/`close` is absent, then parses, sorts by
    /// ascending date and rejects duplicates.
    pub fn from_table(
        symbol: impl Into<String>,
        asset_type: impl Into<String>,
        source: impl Into<String>,
        table: &PriceTable,
    ) -> Result<Self> {
        let missing: Vec<String> = ["date", "close"]
            .iter()
            .filter(|c| table.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing).into());
        }
        if table.is_empty() {
            return Err(DataError::EmptyTable.into());
        }

        let mut bars = Vec::with_capacity(table.rows().len());
        for row in 0..table.rows().len() {
            // Both cells are guaranteed present as columns; an empty date or
            // close cell is a parse failure, not a gap.
            let date: NaiveDate = table
                .cell(row, "date")
                .ok_or_else(|| DataError::InvalidValue {
                    column: "date".into(),
                    row,
                })?
                .parse()
                .map_err(DataError::DateParse)?;
            let close = parse_required(table, row, "close")?;

            bars.push(Bar {
                date,
                open: parse_optional(table, row, "open")?,
                high: parse_optional(table, row, "high")?,
                low: parse_optional(table, row, "low")?,
                close,
                volume: parse_optional(table, row, "volume")?,
                adj_close: parse_optional(table, row, "adj_close")?,
            });
        }

        Self::from_bars(symbol, asset_type, source, bars)
    }

    /// Build a series from already-typed observations, running the same
    /// finiteness and ordering validation and statistics derivation as
    /// `from_table`.
    pub fn from_bars(
        symbol: impl Into<String>,
        asset_type: impl Into<String>,
        source: impl Into<String>,
        mut bars: Vec<Bar>,
    ) -> Result<Self> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        if let Some(bad) = bars.iter().find(|bar| !bar.close.is_finite()) {
            return Err(SeriesError::NonFiniteClose {
                date: bad.date,
                close: bad.close,
            });
        }

        bars.sort_by_key(|bar| bar.date);
        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SeriesError::DuplicateDate(pair[0].date));
            }
        }

        let returns: Vec<f64> = bars
            .windows(2)
            .map(|pair| pair[1].close / pair[0].close - 1.0)
            .collect();

        let mean_return = stats::mean(&returns);
        let std_return = stats::sample_std(&returns);
        let stats = SeriesStats {
            mean_return,
            std_return,
            sharpe_ratio: stats::sharpe_ratio(mean_return, std_return),
            total_return: bars[bars.len() - 1].close / bars[0].close - 1.0,
            volatility: std_return * TRADING_DAYS_PER_YEAR.sqrt(),
            max_drawdown: stats::max_drawdown(&returns),
        };

        Ok(Self {
            symbol: symbol.into(),
            asset_type: asset_type.into(),
            source: source.into(),
            bars,
            returns,
            stats,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Daily return stream: `returns()[i - 1] = close[i] / close[i-1] - 1`.
    /// Length is one less than the number of observations.
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Return stream paired with the date each return lands on (the date of
    /// the later of the two closes).
    pub fn dated_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.bars[1..]
            .iter()
            .map(|bar| bar.date)
            .zip(self.returns.iter().copied())
            .collect()
    }

    pub fn stats(&self) -> &SeriesStats {
        &self.stats
    }

    /// Rolling mean/std/Sharpe over a trailing window of `window` returns,
    /// aligned to the return index. Early positions are `None`.
    pub fn rolling_stats(&self, window: usize) -> Vec<RollingPoint> {
        stats::rolling_stats(&self.dated_returns(), window)
    }
}

fn parse_required(table: &PriceTable, row: usize, column: &str) -> std::result::Result<f64, DataError> {
    table
        .cell(row, column)
        .and_then(|cell| cell.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::InvalidValue {
            column: column.into(),
            row,
        })
}

fn parse_optional(
    table: &PriceTable,
    row: usize,
    column: &str,
) -> std::result::Result<Option<f64>, DataError> {
    match table.cell(row, column) {
        None => Ok(None),
        Some(cell) => cell
            .parse::<f64>()
            .map(Some)
            .map_err(|_| DataError::InvalidValue {
                column: column.into(),
                row,
            }),
    }
}
