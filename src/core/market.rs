use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, VolcastError};

/// One daily OHLCV bar, named the way market-data providers export them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(
        rename = "Date",
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

impl PriceBar {
    fn validate(&self, index: usize) -> Result<()> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(VolcastError::malformed(format!(
                "non-positive price on bar {} ({})",
                index, self.date
            )));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(VolcastError::malformed(format!(
                "negative volume on bar {} ({})",
                index, self.date
            )));
        }
        if self.low > self.high {
            return Err(VolcastError::malformed(format!(
                "low above high on bar {} ({})",
                index, self.date
            )));
        }
        Ok(())
    }
}

/// Date-ascending OHLCV history, stored column-wise for the indicator functions.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl PriceSeries {
    /// Builds a series from bars that are already strictly ascending by date.
    ///
    /// The series is never re-sorted here; out-of-order input is rejected.
    pub fn new(bars: &[PriceBar]) -> Result<Self> {
        if bars.is_empty() {
            return Err(VolcastError::malformed("empty price series"));
        }

        for (i, bar) in bars.iter().enumerate() {
            bar.validate(i)?;
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(VolcastError::malformed(format!(
                    "dates not strictly ascending at bar {} ({} after {})",
                    i,
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }

        Ok(Self {
            dates: bars.iter().map(|b| b.date).collect(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            volume: bars.iter().map(|b| b.volume).collect(),
        })
    }

    /// Builds a series from bars supplied in either ascending or descending
    /// date order, as accepted at the request boundary. Mixed order is rejected.
    pub fn from_either_order(mut bars: Vec<PriceBar>) -> Result<Self> {
        let descending = bars.len() > 1 && bars.windows(2).all(|w| w[0].date > w[1].date);
        if descending {
            bars.reverse();
        }
        Self::new(&bars)
    }

    /// Keeps only the most recent `n` bars.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            dates: self.dates[start..].to_vec(),
            open: self.open[start..].to_vec(),
            high: self.high[start..].to_vec(),
            low: self.low[start..].to_vec(),
            close: self.close[start..].to_vec(),
            volume: self.volume[start..].to_vec(),
        }
    }

    /// Get the number of bars
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// Date of the most recent bar.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Parses the date formats seen in provider exports: `YYYY-MM-DD`,
/// `YYYYMMDD`, and timestamps whose first ten characters are `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .or_else(|e| match raw.get(..10) {
            Some(prefix) if raw.len() > 10 => NaiveDate::parse_from_str(prefix, "%Y-%m-%d"),
            _ => Err(e),
        })
        .map_err(|_| VolcastError::malformed(format!("invalid date '{raw}'")))
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: parse_date(date).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_new_rejects_unordered() {
        let bars = vec![bar("2024-01-02", 10.0), bar("2024-01-01", 11.0)];
        let err = PriceSeries::new(&bars).unwrap_err();
        assert!(matches!(err, VolcastError::MalformedInput(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let bars = vec![bar("2024-01-01", 10.0), bar("2024-01-01", 11.0)];
        assert!(PriceSeries::new(&bars).is_err());
    }

    #[test]
    fn test_empty_series() {
        let err = PriceSeries::new(&[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_invalid_bars() {
        let mut b = bar("2024-01-01", 10.0);
        b.close = 0.0;
        assert!(PriceSeries::new(&[b]).is_err());

        let mut b = bar("2024-01-01", 10.0);
        b.volume = -1.0;
        assert!(PriceSeries::new(&[b]).is_err());

        let mut b = bar("2024-01-01", 10.0);
        b.low = 12.0;
        assert!(PriceSeries::new(&[b]).is_err());
    }

    #[test]
    fn test_from_either_order() {
        let bars = vec![
            bar("2024-01-03", 12.0),
            bar("2024-01-02", 11.0),
            bar("2024-01-01", 10.0),
        ];
        let series = PriceSeries::from_either_order(bars).unwrap();
        assert_eq!(series.close(), &[10.0, 11.0, 12.0]);
        assert_eq!(series.last_date(), Some(parse_date("2024-01-03").unwrap()));

        let mixed = vec![
            bar("2024-01-02", 11.0),
            bar("2024-01-03", 12.0),
            bar("2024-01-01", 10.0),
        ];
        assert!(PriceSeries::from_either_order(mixed).is_err());
    }

    #[test]
    fn test_tail() {
        let bars: Vec<PriceBar> = (1..=9)
            .map(|d| bar(&format!("2024-01-0{d}"), 10.0 + d as f64))
            .collect();
        let series = PriceSeries::new(&bars).unwrap().tail(3);
        assert_eq!(series.len(), 3);
        assert_eq!(series.close(), &[17.0, 18.0, 19.0]);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15").unwrap(), expected);
        assert_eq!(parse_date("20240315").unwrap(), expected);
        assert_eq!(parse_date("2024-03-15 00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2024-03-15T00:00:00Z").unwrap(), expected);
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_bar_json_shape() {
        let json = r#"{"Date": "2024-01-01", "Open": 100, "High": 102, "Low": 99, "Close": 101, "Volume": 1000000}"#;
        let parsed: PriceBar = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.close, 101.0);

        let missing = r#"{"Date": "2024-01-01", "Open": 100, "High": 102, "Low": 99, "Volume": 1}"#;
        assert!(serde_json::from_str::<PriceBar>(missing).is_err());
    }
}
