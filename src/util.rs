// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" cell/number handling so the rest of the
// pipeline can assume clean, typed values (`Option<f64>`, never raw strings).
use num_format::{Locale, ToFormattedString};

/// Parse a raw cell into `f64` while being forgiving about formatting issues
/// that are common in government CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through absent cells.
/// - Trims whitespace, strips thousands separators and a trailing `%`.
/// - Returns `None` for blanks, text placeholders (`NA`, `-`, `N.A.`) and
///   anything that parses to a non-finite value (`NaN`, `inf`).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.trim_end_matches('%').trim().replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round half away from zero to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `numerator / denominator * scale`, missing when either side is missing or
/// the denominator is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let r = n / d * scale;
    r.is_finite().then(|| round2(r))
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Mean of the present values, `None` when every value is missing.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(average(&present))
    }
}

pub fn median(mut v: Vec<f64>) -> f64 {
    // We accept `Vec<f64>` by value so the function can sort in-place without
    // cloning at the call site.
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// Pearson correlation of two equally long series, 2 decimals. `None` with
/// fewer than two points or when either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (mx, my) = (average(x), average(y));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| round2(r))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimals plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Render an optional metric, `-` when missing.
pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `1,234 rows read`).
    n.to_formatted_string(&Locale::en)
}
