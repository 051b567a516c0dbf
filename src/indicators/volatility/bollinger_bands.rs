use crate::series::{Series, combine, observed, rolling_std};
use crate::trend::ma::moving_average;

/// Bollinger Bands Output
#[derive(Debug, Clone)]
pub struct BollingerBandsOutput {
    /// Upper Band = Middle Band + (Multiplier * SD)
    pub upper_band: Series,
    /// Middle Band = SMA
    pub middle_band: Series,
    /// Lower Band = Middle Band - (Multiplier * SD)
    pub lower_band: Series,
    /// Band width relative to the middle band: (Upper - Lower) / Middle
    pub width: Series,
}

/// Computes Bollinger Bands.
///
/// # Arguments
///
/// * `data` - Closing prices.
/// * `period` - The window for the moving average and standard deviation (typically 20).
/// * `multiplier` - The number of standard deviations for the bands (typically 2.0).
///
/// The deviation is the sample estimator, matching `rolling_volatility`.
pub fn bollinger_bands(data: &[f64], period: usize, multiplier: f64) -> BollingerBandsOutput {
    let middle_band = moving_average(data, period);
    let std_dev = rolling_std(&observed(data), period);

    let upper_band = combine(&middle_band, &std_dev, |mid, sd| mid + multiplier * sd);
    let lower_band = combine(&middle_band, &std_dev, |mid, sd| mid - multiplier * sd);
    let spread = combine(&upper_band, &lower_band, |upper, lower| upper - lower);
    let width = combine(&spread, &middle_band, |spread, mid| spread / mid);

    BollingerBandsOutput {
        upper_band,
        middle_band,
        lower_band,
        width,
    }
}
