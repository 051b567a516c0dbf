use crate::series::{Series, rolling_std};

/// Realized volatility: trailing sample standard deviation of one-bar returns.
///
/// `returns` is normally the output of `returns::pct_change(closes, 1)`, whose
/// first entry is undefined, so the first defined value sits at index `window`.
pub fn rolling_volatility(returns: &[Option<f64>], window: usize) -> Series {
    rolling_std(returns, window)
}
