/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Card models and codecs
//!
//! One module per card family. Each exposes the same surface: an
//! `is_header_line` predicate on the five-character card keyword, a
//! `from_lines` decoder taking the blank-line-delimited block, and a
//! `to_lines` encoder whose output ends with the blank separator line.

pub mod broadening;
pub mod data_reduction;
pub mod errors;
pub mod external_r;
pub mod field;
pub mod flags;
pub mod isotope;
pub mod misc;
pub mod normalization;
pub mod orres;
pub mod paramagnetic;
pub mod radius;
pub mod resonance;
pub mod unused_var;
pub mod user_resolution;

pub use errors::{CardError, Result};
pub use field::{format_float, format_scientific, parse_float_text, FixedField};
pub use flags::VaryFlag;

/// Case-insensitive match on the five-character card keyword opening a
/// header line.
pub(crate) fn header_matches(line: &str, keyword: &str) -> bool {
    let head = line.get(..keyword.len()).unwrap_or("");
    head.eq_ignore_ascii_case(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_matches_is_case_insensitive() {
        assert!(header_matches("BROADening parameters may be varied", "BROAD"));
        assert!(header_matches("broadening parameters may be varied", "BROAD"));
        assert!(!header_matches("BROA", "BROAD"));
        assert!(!header_matches("NORMAlization and background are next", "BROAD"));
    }
}
