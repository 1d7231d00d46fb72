//! # Decimal Normalization
//!
//! Canonicalizes locale-flexible numeric text into a fixed-precision
//! string. Operators type prices and dimensions with commas, stray
//! spaces and unit letters; the form contract wants `"1234.50"`.
//!
//! Normalization is best-effort: input that cannot be parsed as a
//! number is returned unchanged, never coerced to zero and never an
//! error. The full pass runs on loss of focus; at keystroke time only
//! [`live`] runs, rewriting commas so numeric widgets keep accepting
//! the value.
//!
//! ## Example
//!
//! ```
//! use pozform::decimal;
//!
//! assert_eq!(decimal::normalize("1 234,5", Some(2)), "1234.50");
//! assert_eq!(decimal::normalize("abc", Some(2)), "abc");
//! assert_eq!(decimal::parse("5,5"), Some(5.5));
//! ```

/// Keystroke-time pass: rewrite commas to periods, nothing else.
///
/// Returns `None` when the value needs no rewrite, so callers can skip
/// the write-back (and any change notification) entirely.
pub fn live(raw: &str) -> Option<String> {
    if raw.contains(',') {
        Some(raw.replace(',', "."))
    } else {
        None
    }
}

/// Clean raw text down to a parseable numeric string.
///
/// Trims, strips internal whitespace, converts the comma decimal
/// separator, preserves a single leading minus, drops every other
/// non-digit/non-period character, and folds surplus periods into the
/// fraction (`"1.2.3"` → `"1.23"`).
fn cleanup(raw: &str) -> String {
    let mut s: String = raw.split_whitespace().collect();
    s = s.replace(',', ".");

    let neg = s.starts_with('-');
    if neg {
        s.remove(0);
    }

    s.retain(|c| c.is_ascii_digit() || c == '.');

    if s.matches('.').count() > 1 {
        let mut parts = s.split('.');
        let head = parts.next().unwrap_or_default().to_string();
        let tail: String = parts.collect();
        s = format!("{head}.{tail}");
    }

    if neg && !s.is_empty() {
        s.insert(0, '-');
    }
    s
}

/// The parsing step alone, without formatting.
///
/// Used by derived-value rules (volume preview) that need the number,
/// not the canonical string. Returns `None` for empty or unparseable
/// input and for non-finite results.
pub fn parse(raw: &str) -> Option<f64> {
    let cleaned = cleanup(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Normalize raw numeric text to a fixed-precision string.
///
/// `decimals` is the field's declared precision; `None` means 0.
/// Unparseable input comes back unchanged — normalization must never
/// destroy what the user typed. Whitespace-only input normalizes to
/// the empty string.
pub fn normalize(raw: &str, decimals: Option<u8>) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    match parse(raw) {
        Some(n) => {
            let d = usize::from(decimals.unwrap_or(0));
            format!("{n:.d$}")
        }
        None => raw.to_string(),
    }
}
