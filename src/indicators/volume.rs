use crate::returns::pct_change;
use crate::series::{Series, combine, observed};
use crate::trend::ma::moving_average;

/// Volume indicators
#[derive(Debug, Clone)]
pub struct VolumeOutput {
    /// Trailing simple mean of volume
    pub volume_sma: Series,
    /// Current volume over its trailing mean
    pub volume_ratio: Series,
    /// Day-over-day fractional change in volume
    pub volume_change: Series,
}

/// Computes the volume moving average, the volume ratio against it, and the
/// one-bar volume change. Zero volume averages or zero prior volumes leave the
/// affected positions undefined.
pub fn volume_indicators(volumes: &[f64], period: usize) -> VolumeOutput {
    let volume_sma = moving_average(volumes, period);
    let volume_ratio = combine(&observed(volumes), &volume_sma, |v, avg| v / avg);
    let volume_change = pct_change(volumes, 1);

    VolumeOutput {
        volume_sma,
        volume_ratio,
        volume_change,
    }
}
