//! Two-decimal rounding for averages.

/// Round to 2 decimals, halves away from zero (`7.125` → `7.13`).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// [`round2`] rendered with exactly two decimals and a dot separator.
#[must_use]
pub fn format2(value: f64) -> String {
    format!("{:.2}", round2(value))
}

/// Mean of the present values, or `0.0` when there are none.
#[must_use]
pub fn mean_or_zero<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0_u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}
