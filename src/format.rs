//! Rendering and parsing of ranking values.
//!
//! [`format_number`] turns a raw number into the canonical text for a criterion;
//! [`parse_value`] reads that text back. [`display_value`] decorates values that arrive
//! from the backend as bare strings.

use crate::core::{Criterion, ValueFormat};

/// Placeholder shown for missing values.
pub const EMPTY_VALUE: &str = "—";

/// Renders `value` the canonical way for `criterion`.
///
/// ```
/// use cryptorank_rs::{Criterion, format::format_number};
/// assert_eq!(format_number(1234567.0, &Criterion::MarketCap), "$1,234,567");
/// assert_eq!(format_number(42.5, &Criterion::Sentiment), "42.5%");
/// assert_eq!(format_number(3.0, &Criterion::AltRank), "3");
/// ```
pub fn format_number(value: f64, criterion: &Criterion) -> String {
    match criterion.value_format() {
        ValueFormat::Currency { decimals, grouped } => {
            let body = fixed(value.abs(), decimals, grouped);
            if value < 0.0 && body.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
                format!("-${body}")
            } else {
                format!("${body}")
            }
        }
        ValueFormat::Percent { decimals } => format!("{}%", fixed_signed(value, decimals, false)),
        ValueFormat::Rank => format!("{}", value.round() as i64),
        ValueFormat::Number { decimals, grouped } => fixed_signed(value, decimals, grouped),
    }
}

/// Reads a formatted value back into a number.
///
/// Accepts the decorations any criterion may carry (`$`, `#`, `%`, thousands separators),
/// so `format_number(parse_value(s)?, c) == s` for every `s` produced by [`format_number`].
pub fn parse_value(text: &str) -> Option<f64> {
    let t = text.trim();
    let (negative, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let t = t.strip_prefix('$').or_else(|| t.strip_prefix('#')).unwrap_or(t);
    let t = t.strip_suffix('%').unwrap_or(t);
    let cleaned: String = t.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    let n: f64 = cleaned.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(if negative { -n } else { n })
}

/// Decorates a raw backend value for display. Idempotent.
///
/// Bare numbers get the criterion's decoration (`#` for ranks, `%` for percentages,
/// `$` plus grouping for currency); anything already decorated or non-numeric passes
/// through untouched. Empty values and `—` render as `—`.
pub fn display_value(raw: &str, criterion: &Criterion) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw == EMPTY_VALUE {
        return EMPTY_VALUE.to_string();
    }
    if !is_bare_number(raw) {
        return raw.to_string();
    }
    match criterion.value_format() {
        ValueFormat::Rank => format!("#{raw}"),
        ValueFormat::Percent { .. } => format!("{raw}%"),
        ValueFormat::Currency { .. } => match raw.strip_prefix('-') {
            Some(rest) => format!("-${}", group_decimal_text(rest)),
            None => format!("${}", group_decimal_text(raw)),
        },
        ValueFormat::Number { .. } => raw.to_string(),
    }
}

/// Splits a `"Name (SYM)"` label. Without parentheses the symbol is the upper-cased first word.
///
/// ```
/// use cryptorank_rs::format::split_coin_label;
/// assert_eq!(split_coin_label("Bitcoin (BTC)"), ("Bitcoin", "BTC".to_string()));
/// assert_eq!(split_coin_label("dogecoin"), ("dogecoin", "DOGECOIN".to_string()));
/// ```
pub fn split_coin_label(label: &str) -> (&str, String) {
    let label = label.trim();
    if let Some(open) = label.rfind('(')
        && label.ends_with(')')
        && open + 1 < label.len() - 1
    {
        let name = label[..open].trim();
        let sym = &label[open + 1..label.len() - 1];
        if !name.is_empty() {
            return (name, sym.to_string());
        }
    }
    let first = label.split_whitespace().next().unwrap_or_default();
    (label, first.to_uppercase())
}

fn is_bare_number(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit())
}

fn fixed_signed(value: f64, decimals: usize, grouped: bool) -> String {
    let body = fixed(value.abs(), decimals, grouped);
    if value < 0.0 && body.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        format!("-{body}")
    } else {
        body
    }
}

fn fixed(value: f64, decimals: usize, grouped: bool) -> String {
    let text = format!("{value:.decimals$}");
    if grouped { group_decimal_text(&text) } else { text }
}

fn group_decimal_text(text: &str) -> String {
    let (int, frac) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    let mut out = String::with_capacity(text.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(f) = frac {
        out.push('.');
        out.push_str(f);
    }
    out
}
