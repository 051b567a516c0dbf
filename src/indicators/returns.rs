use crate::series::{Series, combine, lagged, observed};

/// Simple percentage change over `lag` bars: `(x[t] - x[t-lag]) / x[t-lag]`.
///
/// The first `lag` positions are `None`, as is any position where the base
/// value is zero.
pub fn pct_change(data: &[f64], lag: usize) -> Series {
    if lag == 0 {
        return vec![None; data.len()];
    }
    combine(&observed(data), &lagged(data, lag), |now, then| {
        (now - then) / then
    })
}

/// Close-to-close returns at each lag, in the order given.
pub fn returns(closes: &[f64], lags: &[usize]) -> Vec<Series> {
    lags.iter().map(|&lag| pct_change(closes, lag)).collect()
}
