//! Fixed-point rendering of smallest-unit token amounts.
//!
//! Every token on the market is treated as an 18-decimal asset, so
//! `1_000_000_000_000_000_000` renders as `1.000000000000000000`.

use std::fmt::Display;

/// Decimal places assumed for every token.
pub const DEFAULT_DECIMALS: usize = 18;

/// Render an integer amount with [`DEFAULT_DECIMALS`] places.
pub fn format_amount<V: Display>(value: V) -> String {
    format_amount_with(value, DEFAULT_DECIMALS)
}

/// Render an integer amount with `decimals` places after the point.
///
/// Works on anything whose `Display` is a base-10 integer (`i64`, `i128`,
/// `U256`, `I256`). The magnitude is zero-padded to at least `decimals + 1`
/// digits so the integer part is never empty, which also keeps a negative
/// value below one as `-0.xxx` rather than `-.xxx`.
pub fn format_amount_with<V: Display>(value: V, decimals: usize) -> String {
    let digits = value.to_string();
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    if decimals == 0 {
        return format!("{sign}{magnitude}");
    }

    let padded = format!("{magnitude:0>width$}", width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    format!("{sign}{int_part}.{frac_part}")
}
