use crate::series::{Series, rolling_mean};

/// RSI assigned when the average loss over the window is exactly zero.
///
/// `avg_gain / avg_loss` is then +inf (or 0/0 on a flat window) and
/// `100 - 100 / (1 + inf)` collapses to 100. Flat windows resolve the same
/// way so the column stays total wherever the window is complete.
pub const RSI_ZERO_LOSS: f64 = 100.0;

/// Calculates the Relative Strength Index (RSI) for a given data slice and period.
///
/// Gains and losses are the zero-floored positive and negative parts of the
/// one-bar change, each averaged with a trailing simple mean over `period`
/// changes (not Wilder smoothing).
///
/// # Arguments
///
/// * `data` - Closing prices.
/// * `period` - The lookback period (typically 14).
///
/// # Returns
///
/// A `Series` in [0, 100]. The first `period` values are `None` since the
/// first change is only available at index 1.
pub fn rsi(data: &[f64], period: usize) -> Series {
    let n = data.len();
    let mut gains = vec![None; n];
    let mut losses = vec![None; n];

    for i in 1..n {
        let change = data[i] - data[i - 1];
        gains[i] = Some(change.max(0.0));
        losses[i] = Some((-change).max(0.0));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(RSI_ZERO_LOSS),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect()
}
