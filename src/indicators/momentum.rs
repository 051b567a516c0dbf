use crate::series::{Series, combine, lagged, observed};

/// Absolute price change over `lag` bars.
pub fn momentum(closes: &[f64], lag: usize) -> Series {
    combine(&observed(closes), &lagged(closes, lag), |now, then| now - then)
}

/// Rate of change in percent over `lag` bars.
pub fn rate_of_change(closes: &[f64], lag: usize) -> Series {
    if lag == 0 {
        return vec![None; closes.len()];
    }
    combine(&observed(closes), &lagged(closes, lag), |now, then| {
        (now - then) / then * 100.0
    })
}
