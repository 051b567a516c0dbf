use crate::series::{Series, combine, observed};
use crate::trend::ma::exponential_moving_average;

/// MACD (Moving Average Convergence Divergence) Output
#[derive(Debug, Clone)]
pub struct MacdOutput {
    /// MACD Line = Fast EMA - Slow EMA
    pub macd_line: Series,
    /// Signal Line = EMA of MACD Line
    pub signal_line: Series,
    /// Histogram = MACD Line - Signal Line
    pub histogram: Series,
}

/// Computes the MACD indicator.
///
/// # Arguments
///
/// * `data` - Closing prices.
/// * `fast_span` - Span of the fast EMA (typically 12).
/// * `slow_span` - Span of the slow EMA (typically 26).
/// * `signal_span` - Span of the signal line EMA (typically 9).
///
/// Because the EMAs are seeded with the first observation, all three lines
/// are defined from the first bar.
pub fn macd(data: &[f64], fast_span: usize, slow_span: usize, signal_span: usize) -> MacdOutput {
    let closes = observed(data);
    let fast_ema = exponential_moving_average(&closes, fast_span);
    let slow_ema = exponential_moving_average(&closes, slow_span);

    let macd_line = combine(&fast_ema, &slow_ema, |fast, slow| fast - slow);
    let signal_line = exponential_moving_average(&macd_line, signal_span);
    let histogram = combine(&macd_line, &signal_line, |line, signal| line - signal);

    MacdOutput {
        macd_line,
        signal_line,
        histogram,
    }
}
