use super::{PriceTable, Result};
use csv::ReaderBuilder;
use std::path::Path;

pub struct DataLoader;

impl DataLoader {
    /// Read a per-asset OHLCV CSV into a `PriceTable`. Headers are
    /// canonicalized through the alias table; no further validation happens
    /// here, so the file's column set surfaces as an error only when a
    /// series is constructed from it.
    pub fn load_price_table<P: AsRef<Path>>(path: P) -> Result<PriceTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let columns: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(PriceTable::new(columns, rows))
    }
}
