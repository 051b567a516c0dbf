use crate::series::{Series, observed, rolling_mean};

/// True range per bar: the largest of high - low, |high - prev_close| and
/// |low - prev_close|. The first bar has no previous close and uses high - low.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = closes.len().min(highs.len()).min(lows.len());
    let mut tr = Vec::with_capacity(n);

    for i in 0..n {
        let mut term = highs[i] - lows[i];
        if i > 0 {
            let gap_up = (highs[i] - closes[i - 1]).abs();
            let gap_down = (lows[i] - closes[i - 1]).abs();
            term = term.max(gap_up).max(gap_down);
        }
        tr.push(term);
    }

    tr
}

/// Average True Range: trailing `period`-bar mean of the true range.
///
/// Defined from index `period - 1`.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Series {
    rolling_mean(&observed(&true_range(highs, lows, closes)), period)
}
