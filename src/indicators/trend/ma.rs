use crate::series::{Series, finite, observed, rolling_mean};

/// Calculates the Simple Moving Average (SMA) for a given data slice and window.
///
/// # Arguments
///
/// * `data` - A slice of f64 values.
/// * `window` - The number of trailing bars averaged.
///
/// # Returns
///
/// A `Series` whose first `window - 1` entries are `None`.
pub fn moving_average(data: &[f64], window: usize) -> Series {
    rolling_mean(&observed(data), window)
}

/// Calculates the Exponential Moving Average with smoothing `2 / (span + 1)`.
///
/// The recursion is seeded with the first defined observation and applies
/// `ema[t] = alpha * x[t] + (1 - alpha) * ema[t-1]` with no bias adjustment,
/// so the output is defined from the first defined input onward. An undefined
/// input yields `None` at that position and leaves the running state intact.
pub fn exponential_moving_average(data: &[Option<f64>], span: usize) -> Series {
    if span == 0 {
        return vec![None; data.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;

    data.iter()
        .map(|value| {
            let x = (*value)?;
            let next = match state {
                None => x,
                Some(prev) => alpha * x + (1.0 - alpha) * prev,
            };
            state = Some(next);
            finite(next)
        })
        .collect()
}
