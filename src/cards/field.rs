/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Fixed-column field access and numeric formatting
//!
//! Every value in a parameter file lives in a fixed byte-column range of its
//! line. [`FixedField`] names such a range and knows how to pull typed
//! values out of it. Formatting helpers produce the `1.2340E+00` scientific
//! shape the files use.

use crate::cards::errors::{CardError, Result};
use crate::cards::flags::VaryFlag;

/// A named half-open column range `[start, end)` on a card line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedField {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

impl FixedField {
    pub const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Self { name, start, end }
    }

    /// Raw slice of the line, clamped to the line length. Short lines yield
    /// an empty slice rather than an error; trailing columns are optional in
    /// the file format.
    pub fn raw<'a>(&self, line: &'a str) -> &'a str {
        let len = line.len();
        let start = self.start.min(len);
        let end = self.end.min(len);
        line.get(start..end).unwrap_or("")
    }

    pub fn trimmed<'a>(&self, line: &'a str) -> &'a str {
        self.raw(line).trim()
    }

    pub fn is_blank(&self, line: &str) -> bool {
        self.trimmed(line).is_empty()
    }

    /// Trimmed text content, blank columns map to `None`
    pub fn parse_text(&self, line: &str) -> Option<String> {
        let text = self.trimmed(line);
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn parse_float(&self, line: &str) -> Result<Option<f64>> {
        let text = self.trimmed(line);
        if text.is_empty() {
            return Ok(None);
        }
        parse_float_text(text)
            .map(Some)
            .ok_or_else(|| CardError::MalformedField {
                field: self.name,
                text: text.to_string(),
            })
    }

    pub fn require_float(&self, line: &str) -> Result<f64> {
        self.parse_float(line)?
            .ok_or(CardError::MissingRequiredField { field: self.name })
    }

    pub fn parse_int(&self, line: &str) -> Result<Option<i32>> {
        let text = self.trimmed(line);
        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<i32>()
            .map(Some)
            .map_err(|_| CardError::MalformedField {
                field: self.name,
                text: text.to_string(),
            })
    }

    pub fn require_int(&self, line: &str) -> Result<i32> {
        self.parse_int(line)?
            .ok_or(CardError::MissingRequiredField { field: self.name })
    }

    /// Lenient flag parse. Blank or unparsable columns read as `No`; this is
    /// what SAMMY itself does for the common flag columns.
    pub fn parse_flag(&self, line: &str) -> VaryFlag {
        self.trimmed(line)
            .parse::<i8>()
            .ok()
            .and_then(VaryFlag::from_value)
            .unwrap_or(VaryFlag::No)
    }

    /// Strict flag parse against an allowed subset. Used where a bad flag
    /// silently changes the card's meaning (radius true-flag, Gaussian
    /// broadening flags). Blank columns still read as `No`; strictness is
    /// about out-of-set values, not absence.
    pub fn parse_flag_in(&self, line: &str, allowed: &[VaryFlag]) -> Result<VaryFlag> {
        let text = self.trimmed(line);
        if text.is_empty() {
            return Ok(VaryFlag::No);
        }
        let flag = text
            .parse::<i8>()
            .ok()
            .and_then(VaryFlag::from_value)
            .ok_or_else(|| CardError::InvalidFlagValue {
                field: self.name,
                value: text.to_string(),
            })?;
        if allowed.contains(&flag) {
            Ok(flag)
        } else {
            Err(CardError::InvalidFlagValue {
                field: self.name,
                value: text.to_string(),
            })
        }
    }
}

/// Parse a float, accepting Fortran spellings.
///
/// `D` exponent letters are normalized to `e`, and "pseudo scientific"
/// values with an elided exponent letter (`5.00000-5` meaning 5.0e-5) are
/// repaired before parsing.
pub fn parse_float_text(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    let normalized: String = t
        .chars()
        .map(|c| if c == 'd' || c == 'D' { 'e' } else { c })
        .collect();
    if let Ok(v) = normalized.parse::<f64>() {
        return Some(v);
    }
    repair_pseudo_scientific(&normalized)
}

/// `mantissa±NN` with no exponent letter. The sign must not open the string
/// and must not already follow an exponent letter.
fn repair_pseudo_scientific(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut split = None;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        if b == b'+' || b == b'-' {
            let prev = bytes[i - 1].to_ascii_lowercase();
            if prev != b'e' {
                split = Some(i);
            }
        }
    }
    let i = split?;
    let repaired = format!("{}e{}", &text[..i], &text[i..]);
    repaired.parse::<f64>().ok()
}

/// Scientific rendering with an explicit two-digit signed exponent,
/// `1.2340E+00` for precision 4.
pub fn format_scientific(value: f64, precision: usize) -> String {
    let rendered = format!("{:.*e}", precision, value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            format!("{}E{:+03}", mantissa, exp)
        }
        None => rendered,
    }
}

/// Render an optional value into a fixed-width column.
///
/// Blank-fills for `None`. Precision starts at `width - 6` (the widest that
/// fits a positive value with a two-digit exponent) and shrinks until the
/// text fits, so negative values and three-digit exponents never overflow
/// into the neighboring field. Left-justified, as SAMMY writes them.
pub fn format_float(value: Option<f64>, width: usize) -> String {
    let v = match value {
        Some(v) => v,
        None => return " ".repeat(width),
    };
    let mut precision = width.saturating_sub(6);
    loop {
        let rendered = format_scientific(v, precision);
        if rendered.len() <= width {
            return format!("{:<1$}", rendered, width);
        }
        if precision == 0 {
            return rendered;
        }
        precision -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VALUE: FixedField = FixedField::new("value", 10, 20);

    #[test]
    fn test_raw_clamps_short_lines() {
        assert_eq!(VALUE.raw("short"), "");
        assert_eq!(VALUE.raw("0123456789abc"), "abc");
    }

    #[test]
    fn test_parse_float_blank_is_none() {
        assert_eq!(VALUE.parse_float("          ").unwrap(), None);
    }

    #[test]
    fn test_parse_float_malformed() {
        let err = VALUE.parse_float("          not-a-num ").unwrap_err();
        assert!(matches!(
            err,
            CardError::MalformedField { field: "value", .. }
        ));
    }

    #[test]
    fn test_pseudo_scientific() {
        assert_relative_eq!(parse_float_text("5.00000-5").unwrap(), 5.0e-5);
        assert_relative_eq!(parse_float_text("1.2345+6").unwrap(), 1.2345e6);
        assert_relative_eq!(parse_float_text("-2.5000-3").unwrap(), -2.5e-3);
        assert_relative_eq!(parse_float_text("1.5D+02").unwrap(), 150.0);
    }

    #[test]
    fn test_strict_flag_blank_reads_as_no() {
        assert_eq!(
            VALUE.parse_flag_in("          ", VaryFlag::WITH_PARFILE).unwrap(),
            VaryFlag::No
        );
        assert!(VALUE
            .parse_flag_in("          9", VaryFlag::WITH_PARFILE)
            .is_err());
    }

    #[test]
    fn test_format_float_shapes() {
        assert_eq!(format_float(Some(3.2), 9), "3.200E+00");
        assert_eq!(format_float(Some(3.2), 10), "3.2000E+00");
        assert_eq!(format_float(None, 9), "         ");
    }

    #[test]
    fn test_format_float_shrinks_for_negatives() {
        let s = format_float(Some(-1.234567e-5), 9);
        assert_eq!(s.len(), 9);
        assert!(s.starts_with("-1.23"));
        assert!(s.ends_with("E-05"));
    }

    #[test]
    fn test_format_scientific_round_trips() {
        let s = format_scientific(2.98e2, 4);
        assert_eq!(s, "2.9800E+02");
        assert_relative_eq!(parse_float_text(&s).unwrap(), 298.0);
    }
}
