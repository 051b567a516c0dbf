//! Feature assembly: applies the indicator library to a price series in a
//! fixed order and lays the results out as one row per bar.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use indicators::Series;
use indicators::momentum::{momentum, rate_of_change};
use indicators::oscillators::rsi;
use indicators::returns::pct_change;
use indicators::series::observed;
use indicators::trend::{exponential_moving_average, macd, moving_average};
use indicators::volatility::{atr, bollinger_bands, rolling_volatility};
use indicators::volume::volume_indicators;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::core::market::PriceSeries;
use crate::error::{Result, VolcastError};

/// History needed before every feature is defined: 60-day volatility over
/// one-day returns is first available at index 60.
pub const MAX_REQUIRED_WINDOW: usize = 60;

/// Smallest series whose latest row is guaranteed complete.
pub const MIN_COMPLETE_BARS: usize = MAX_REQUIRED_WINDOW + 1;

/// Number of canonical features.
pub const N_FEATURES: usize = 31;

macro_rules! features {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A model input, in canonical order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Feature {
            $($variant),+
        }

        impl Feature {
            /// Canonical feature order; models consume vectors in exactly this order.
            pub const ALL: [Feature; N_FEATURES] = [$(Feature::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Feature::$variant => $name),+
                }
            }
        }

        impl FromStr for Feature {
            type Err = VolcastError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($name => Ok(Feature::$variant),)+
                    other => Err(VolcastError::InvalidParameter(format!("unknown feature '{other}'"))),
                }
            }
        }
    };
}

features! {
    Returns => "returns",
    Returns5d => "returns_5d",
    Returns10d => "returns_10d",
    Returns20d => "returns_20d",
    Volatility5d => "volatility_5d",
    Volatility10d => "volatility_10d",
    Volatility20d => "volatility_20d",
    Volatility60d => "volatility_60d",
    Sma5 => "sma_5",
    Sma10 => "sma_10",
    Sma20 => "sma_20",
    Sma50 => "sma_50",
    Ema12 => "ema_12",
    Ema26 => "ema_26",
    Rsi => "rsi",
    Atr => "atr",
    VolumeSma20 => "volume_sma_20",
    VolumeRatio => "volume_ratio",
    VolumeChange => "volume_change",
    Momentum5 => "momentum_5",
    Momentum10 => "momentum_10",
    Momentum20 => "momentum_20",
    Roc5 => "roc_5",
    Roc10 => "roc_10",
    BbMiddle => "bb_middle",
    BbUpper => "bb_upper",
    BbLower => "bb_lower",
    BbWidth => "bb_width",
    Macd => "macd",
    MacdSignal => "macd_signal",
    MacdHistogram => "macd_histogram",
}

impl Feature {
    /// Position of this feature in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical feature names, in order.
    pub fn names() -> Vec<&'static str> {
        Feature::ALL.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Feature values for one bar. `None` means the feature is undefined there.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: [Option<f64>; N_FEATURES],
}

impl FeatureRow {
    pub fn new(values: [Option<f64>; N_FEATURES]) -> Self {
        Self { values }
    }

    /// A row with every feature undefined.
    pub fn empty() -> Self {
        Self { values: [None; N_FEATURES] }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: Option<f64>) {
        self.values[feature.index()] = value;
    }

    pub fn values(&self) -> &[Option<f64>; N_FEATURES] {
        &self.values
    }

    /// Undefined features, in canonical order.
    pub fn missing(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// The dense feature vector in canonical order, or `None` if any feature
    /// is undefined.
    pub fn to_vector(&self) -> Option<Vec<f64>> {
        self.values.iter().copied().collect()
    }
}

/// Feature rows aligned index-for-index with the source price series.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    dates: Vec<NaiveDate>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Builds a table from pre-computed rows, one per date.
    pub fn from_rows(dates: Vec<NaiveDate>, rows: Vec<FeatureRow>) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(VolcastError::malformed(format!(
                "{} dates for {} feature rows",
                dates.len(),
                rows.len()
            )));
        }
        Ok(Self { dates, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&FeatureRow> {
        self.rows.get(index)
    }

    /// The row for the most recent date, with that date.
    pub fn latest(&self) -> Option<(NaiveDate, &FeatureRow)> {
        Some((*self.dates.last()?, self.rows.last()?))
    }

    /// One feature across all rows.
    pub fn column(&self, feature: Feature) -> Series {
        self.rows.iter().map(|row| row.get(feature)).collect()
    }

    /// Number of rows with every feature defined.
    pub fn complete_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.is_complete()).count()
    }
}

/// Computes the canonical features for every bar of `series`.
///
/// Indicators are applied in a fixed order: returns, volatility, moving
/// averages, RSI, ATR, volume, momentum, Bollinger Bands, MACD. Rows are
/// neither dropped nor imputed; early rows simply carry undefined features.
pub fn assemble(series: &PriceSeries) -> FeatureTable {
    let closes = series.close();
    let n = series.len();

    let mut columns: Vec<(Feature, Series)> = Vec::with_capacity(N_FEATURES);

    // Returns
    let daily_returns = pct_change(closes, 1);
    columns.push((Feature::Returns, daily_returns.clone()));
    columns.push((Feature::Returns5d, pct_change(closes, 5)));
    columns.push((Feature::Returns10d, pct_change(closes, 10)));
    columns.push((Feature::Returns20d, pct_change(closes, 20)));

    // Volatility of one-day returns
    columns.push((Feature::Volatility5d, rolling_volatility(&daily_returns, 5)));
    columns.push((Feature::Volatility10d, rolling_volatility(&daily_returns, 10)));
    columns.push((Feature::Volatility20d, rolling_volatility(&daily_returns, 20)));
    columns.push((Feature::Volatility60d, rolling_volatility(&daily_returns, 60)));

    // Moving averages
    columns.push((Feature::Sma5, moving_average(closes, 5)));
    columns.push((Feature::Sma10, moving_average(closes, 10)));
    columns.push((Feature::Sma20, moving_average(closes, 20)));
    columns.push((Feature::Sma50, moving_average(closes, 50)));
    let observed_closes = observed(closes);
    columns.push((Feature::Ema12, exponential_moving_average(&observed_closes, 12)));
    columns.push((Feature::Ema26, exponential_moving_average(&observed_closes, 26)));

    // Oscillators
    columns.push((Feature::Rsi, rsi(closes, 14)));
    columns.push((Feature::Atr, atr(series.high(), series.low(), closes, 14)));

    // Volume
    let volume = volume_indicators(series.volume(), 20);
    columns.push((Feature::VolumeSma20, volume.volume_sma));
    columns.push((Feature::VolumeRatio, volume.volume_ratio));
    columns.push((Feature::VolumeChange, volume.volume_change));

    // Momentum
    columns.push((Feature::Momentum5, momentum(closes, 5)));
    columns.push((Feature::Momentum10, momentum(closes, 10)));
    columns.push((Feature::Momentum20, momentum(closes, 20)));
    columns.push((Feature::Roc5, rate_of_change(closes, 5)));
    columns.push((Feature::Roc10, rate_of_change(closes, 10)));

    // Bollinger Bands
    let bands = bollinger_bands(closes, 20, 2.0);
    columns.push((Feature::BbMiddle, bands.middle_band));
    columns.push((Feature::BbUpper, bands.upper_band));
    columns.push((Feature::BbLower, bands.lower_band));
    columns.push((Feature::BbWidth, bands.width));

    // MACD
    let macd_out = macd(closes, 12, 26, 9);
    columns.push((Feature::Macd, macd_out.macd_line));
    columns.push((Feature::MacdSignal, macd_out.signal_line));
    columns.push((Feature::MacdHistogram, macd_out.histogram));

    debug_assert_eq!(columns.len(), N_FEATURES);

    let mut rows = vec![FeatureRow::empty(); n];
    for (feature, column) in &columns {
        for (row, value) in rows.iter_mut().zip(column) {
            row.set(*feature, *value);
        }
    }

    let table = FeatureTable {
        dates: series.dates().to_vec(),
        rows,
    };
    debug!(
        bars = n,
        complete_rows = table.complete_rows(),
        "assembled feature table"
    );
    table
}
