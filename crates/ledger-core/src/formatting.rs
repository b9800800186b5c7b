use chrono::{Datelike, NaiveDate, Weekday};

/// Placeholder for a missing or non-finite value.
pub const MISSING: &str = "–";

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use ledger_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// assert_eq!(format_number(f64::NAN, 2), "–");
/// ```
///
/// Non-finite values render as `"–"`, like missing ones.
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    let factor = 10_f64.powi(decimals as i32);
    let abs_value = value.abs();
    let scaled = abs_value * factor;
    // From 2^53 on, the value carries no digits below the requested precision.
    let rounded = if scaled < MAX_EXACT_INTEGER {
        // Nudge by a relative epsilon so exact midpoints like 1.005 round up.
        (scaled + f64::EPSILON * scaled).round() / factor
    } else {
        abs_value
    };

    let grouped = group_thousands(&format!("{:.0}", rounded.trunc()));
    let body = if decimals == 0 {
        grouped
    } else {
        let frac = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        // `frac` looks like "0.50"; keep ".50".
        format!("{}{}", grouped, &frac[1..])
    };

    // A value that rounds to zero is printed without a sign.
    if value < 0.0 && rounded != 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format a monetary amount with two decimals, prefixed by the currency label.
///
/// The currency is a display label only; no conversion happens.
///
/// # Examples
///
/// ```
/// use ledger_core::formatting::format_amount;
///
/// assert_eq!(format_amount(1234.56, "CHF"), "CHF 1,234.56");
/// assert_eq!(format_amount(-9.99, "CHF"), "CHF -9.99");
/// assert_eq!(format_amount(3.0, ""), "3.00");
/// ```
pub fn format_amount(amount: f64, currency: &str) -> String {
    let number = format_number(amount, 2);
    if currency.is_empty() {
        number
    } else {
        format!("{} {}", currency, number)
    }
}

/// Format an optional value, rendering a missing one as `"–"`.
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    value
        .map(|v| format_number(v, decimals))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Short axis-tick label: `1,500` → `"1.5k"`, `2,000,000` → `"2M"`.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1_000_000.0 {
        (value / 1_000_000.0, "M")
    } else if abs >= 1_000.0 {
        (value / 1_000.0, "k")
    } else {
        (value, "")
    };
    let text = format!("{:.1}", scaled);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    if text == "-0" {
        format!("0{}", suffix)
    } else {
        format!("{}{}", text, suffix)
    }
}

/// Display label of the month containing `date`, e.g. `"January 2024"`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let len = s.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
