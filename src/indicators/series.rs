/// A derived column. `None` marks a position where the indicator is undefined.
pub type Series = Vec<Option<f64>>;

/// Keeps finite values, maps NaN and infinities to `None`.
#[inline]
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() { Some(value) } else { None }
}

/// Lifts a fully observed column into a `Series`.
pub fn observed(data: &[f64]) -> Series {
    data.iter().map(|&x| finite(x)).collect()
}

/// Shifts a column forward by `lag` positions; the first `lag` entries are `None`.
pub fn lagged(data: &[f64], lag: usize) -> Series {
    (0..data.len())
        .map(|i| if i >= lag { finite(data[i - lag]) } else { None })
        .collect()
}

/// Applies `f` elementwise where both inputs are defined.
pub fn combine<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Series
where
    F: Fn(f64, f64) -> f64,
{
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => finite(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Trailing simple mean. Defined only where all `window` inputs are defined.
pub fn rolling_mean(data: &[Option<f64>], window: usize) -> Series {
    rolling(data, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation (n - 1 denominator).
///
/// A one-element window has no sample deviation, so `window < 2` yields an
/// all-`None` column.
pub fn rolling_std(data: &[Option<f64>], window: usize) -> Series {
    if window < 2 {
        return vec![None; data.len()];
    }
    rolling(data, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss: f64 = w.iter().map(|&x| (x - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    })
}

/// Evaluates `f` over each complete trailing window.
///
/// Each output depends only on inputs at or before its own index.
fn rolling<F>(data: &[Option<f64>], window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; data.len()];
    if window == 0 || window > data.len() {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..data.len() {
        buf.clear();
        buf.extend(data[i + 1 - window..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            out[i] = finite(f(&buf));
        }
    }
    out
}
