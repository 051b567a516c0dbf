use std::fs::File;
use std::path::Path;

use csv::Reader;
use tracing::debug;

use crate::core::market::{PriceBar, PriceSeries};
use crate::error::{Result, VolcastError};

/// Read OHLCV bars from a CSV file with a `Date,Open,High,Low,Close,Volume`
/// header. Extra columns are ignored. Rows are returned in file order.
pub fn read_bars_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(file);
    let mut bars = Vec::new();

    for (line, record) in reader.deserialize().enumerate() {
        let bar: PriceBar = record.map_err(|e| {
            // line 1 is the header
            VolcastError::malformed(format!("{} line {}: {}", path.display(), line + 2, e))
        })?;
        bars.push(bar);
    }

    debug!(path = %path.display(), bars = bars.len(), "read price history");
    Ok(bars)
}

/// Read a price history file and normalize it to ascending date order.
pub fn load_price_series<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    PriceSeries::from_either_order(read_bars_csv(path)?)
}
