/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Isotopic abundances and masses (card set 10)
//!
//! One entry per isotope: mass, fractional abundance, optional uncertainty,
//! a treatment flag, and the spin groups belonging to the isotope. The
//! standard layout packs two-column group numbers from column 32; when any
//! group number needs more than two digits the whole card switches to the
//! extended layout with five-column integers from column 35.
//!
//! A new isotope starts at any line opening with a digit; other lines
//! continue the previous isotope's group list. Full group lines end with a
//! `-1` continuation marker appended after the payload.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "ISOTOpic abundances and masses";
pub const HEADER_NUCLIDE: &str = "NUCLIde abundances and masses";

const MASS: FixedField = FixedField::new("mass", 0, 10);
const ABUNDANCE: FixedField = FixedField::new("abundance", 10, 20);
const UNCERTAINTY: FixedField = FixedField::new("abundance_uncertainty", 20, 30);
const FLAG_STANDARD: FixedField = FixedField::new("flag", 30, 32);
const FLAG_EXTENDED: FixedField = FixedField::new("flag", 30, 35);

const GROUPS_START_STANDARD: usize = 32;
const GROUPS_START_EXTENDED: usize = 35;
const GROUP_WIDTH_STANDARD: usize = 2;
const GROUP_WIDTH_EXTENDED: usize = 5;
const GROUPS_PER_LINE_STANDARD: usize = 24;
const GROUPS_PER_LINE_EXTENDED: usize = 9;

/// One isotope entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsotopeEntry {
    pub mass: f64,
    pub abundance: f64,
    pub uncertainty: Option<f64>,
    pub flag: VaryFlag,
    pub spin_groups: Vec<i32>,
}

impl IsotopeEntry {
    fn validate(&self) -> Result<()> {
        if self.mass <= 0.0 {
            return Err(CardError::InvalidCard(format!(
                "isotope mass must be positive, got {}",
                self.mass
            )));
        }
        if !(0.0..=1.0).contains(&self.abundance) {
            return Err(CardError::InvalidCard(format!(
                "isotope abundance must lie in [0, 1], got {}",
                self.abundance
            )));
        }
        if self.spin_groups.contains(&0) {
            return Err(CardError::InvalidCard(
                "isotope spin group number cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Isotope card; `extended` selects the wide layout for the whole card
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IsotopeCard {
    pub isotopes: Vec<IsotopeEntry>,
    pub extended: bool,
}

impl IsotopeCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "ISOTO") || header_matches(line, "NUCLI")
    }

    /// Decide the layout. The flag column settles it for lines this codec
    /// wrote (standard flags fill columns 30-32, extended flags leave them
    /// blank); the fallback looks for any group number above two digits.
    fn detect_extended(content: &[&String]) -> bool {
        for line in content {
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            if !FLAG_STANDARD.is_blank(line) {
                return false;
            }
            if !FLAG_EXTENDED.is_blank(line) {
                return true;
            }
        }
        content.iter().any(|line| {
            line.split_whitespace()
                .filter_map(|t| t.parse::<i32>().ok())
                .any(|n| n.abs() > 99)
        })
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "isotope card needs its header line".to_string(),
            ));
        }
        let content: Vec<&String> = lines[1..].iter().filter(|l| !l.trim().is_empty()).collect();
        if content.is_empty() {
            return Err(CardError::InvalidCard(
                "isotope card has no parameter lines".to_string(),
            ));
        }
        let extended = Self::detect_extended(&content);
        let (flag_field, group_start, group_width) = if extended {
            (FLAG_EXTENDED, GROUPS_START_EXTENDED, GROUP_WIDTH_EXTENDED)
        } else {
            (FLAG_STANDARD, GROUPS_START_STANDARD, GROUP_WIDTH_STANDARD)
        };

        let mut isotopes = Vec::new();
        let mut idx = 0;
        while idx < content.len() {
            let main = content[idx];
            if !main.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(CardError::InvalidCard(format!(
                    "expected an isotope line starting with a digit: {main:?}"
                )));
            }
            let mut stream = read_group_slots(main, group_start, group_width)?;
            idx += 1;
            while stream.last() == Some(&-1) {
                stream.pop();
                let next = content.get(idx).ok_or_else(|| {
                    CardError::InvalidCard(
                        "isotope continuation marker with no following line".to_string(),
                    )
                })?;
                let prefix = FixedField::new("continuation_prefix", 0, group_start);
                let start = if prefix.is_blank(next) { group_start } else { 0 };
                stream.extend(read_group_slots(next, start, group_width)?);
                idx += 1;
            }

            let entry = IsotopeEntry {
                mass: MASS.require_float(main)?,
                abundance: ABUNDANCE.require_float(main)?,
                uncertainty: UNCERTAINTY.parse_float(main)?,
                flag: flag_field.parse_flag(main),
                spin_groups: stream,
            };
            entry.validate()?;
            isotopes.push(entry);
        }

        let card = Self { isotopes, extended };
        card.validate_total_abundance()?;
        Ok(card)
    }

    fn validate_total_abundance(&self) -> Result<()> {
        let total: f64 = self.isotopes.iter().map(|i| i.abundance).sum();
        if total > 1.0 {
            warn!("isotope abundances sum to {total}");
            return Err(CardError::InvalidCard(format!(
                "total isotope abundance {total} exceeds 1.0"
            )));
        }
        Ok(())
    }

    pub fn to_lines(&self) -> Vec<String> {
        let (group_start, group_width, per_line, flag_width) = if self.extended {
            (GROUPS_START_EXTENDED, GROUP_WIDTH_EXTENDED, GROUPS_PER_LINE_EXTENDED, 5)
        } else {
            (GROUPS_START_STANDARD, GROUP_WIDTH_STANDARD, GROUPS_PER_LINE_STANDARD, 2)
        };
        let mut lines = vec![HEADER.to_string()];
        for isotope in &self.isotopes {
            let mut line = format!(
                "{}{}{}{:>fw$}",
                format_float(Some(isotope.mass), 10),
                format_float(Some(isotope.abundance), 10),
                format_float(isotope.uncertainty, 10),
                isotope.flag.value(),
                fw = flag_width,
            );
            let chunks: Vec<&[i32]> = isotope.spin_groups.chunks(per_line).collect();
            if chunks.is_empty() {
                lines.push(line.clone());
            }
            for (i, chunk) in chunks.iter().enumerate() {
                if i > 0 {
                    line = " ".repeat(group_start);
                }
                for group in *chunk {
                    line.push_str(&format!("{:>1$}", group, group_width));
                }
                if i + 1 < chunks.len() {
                    line.push_str(&format!("{:>1$}", -1, group_width));
                }
                lines.push(line.clone());
            }
        }
        lines.push(String::new());
        lines
    }
}

fn read_group_slots(line: &str, start: usize, width: usize) -> Result<Vec<i32>> {
    let mut values = Vec::new();
    let mut pos = start;
    while pos < line.len() {
        let slot = FixedField::new("spin_group", pos, pos + width);
        match slot.parse_int(line)? {
            Some(value) => values.push(value),
            None => break,
        }
        pos += width;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oxygen() -> IsotopeEntry {
        IsotopeEntry {
            mass: 16.0,
            abundance: 0.5,
            uncertainty: Some(2.0e-5),
            flag: VaryFlag::No,
            spin_groups: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_standard_round_trip() {
        let card = IsotopeCard {
            isotopes: vec![oxygen()],
            extended: false,
        };
        let parsed = IsotopeCard::from_lines(&card.to_lines()).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_continuation_splits_after_24_groups() {
        let mut entry = oxygen();
        entry.spin_groups = (1..=30).collect();
        let card = IsotopeCard {
            isotopes: vec![entry],
            extended: false,
        };
        let lines = card.to_lines();
        assert!(lines[1].ends_with("-1"));
        assert_eq!(lines[1].len(), 82);
        let parsed = IsotopeCard::from_lines(&lines).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_extended_round_trip() {
        let mut entry = oxygen();
        entry.spin_groups = vec![100, 101, 250];
        entry.flag = VaryFlag::UseFromOthers;
        let card = IsotopeCard {
            isotopes: vec![entry],
            extended: true,
        };
        let lines = card.to_lines();
        let parsed = IsotopeCard::from_lines(&lines).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_abundance_sum_is_checked() {
        let mut heavy = oxygen();
        heavy.abundance = 0.7;
        let card = IsotopeCard {
            isotopes: vec![oxygen(), heavy],
            extended: false,
        };
        assert!(IsotopeCard::from_lines(&card.to_lines()).is_err());
    }
}
