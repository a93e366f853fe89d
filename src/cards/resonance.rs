/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Resonance table (card set 1)
//!
//! The resonance table opens the file and carries no header line. Each line
//! is one resonance: energy, capture width, up to three channel widths,
//! five vary flags, the spin-group number, and an optional extra value
//! whose sign selects single- or multi-line entries. Multi-line entries
//! (negative extra value) are not supported and are rejected.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_scientific, FixedField};
use crate::cards::flags::VaryFlag;

const ENERGY: FixedField = FixedField::new("resonance_energy", 0, 11);
const CAPTURE: FixedField = FixedField::new("capture_width", 11, 22);
const CHANNEL1: FixedField = FixedField::new("channel1_width", 22, 33);
const CHANNEL2: FixedField = FixedField::new("channel2_width", 33, 44);
const CHANNEL3: FixedField = FixedField::new("channel3_width", 44, 55);
const VARY_ENERGY: FixedField = FixedField::new("vary_energy", 55, 57);
const VARY_CAPTURE: FixedField = FixedField::new("vary_capture", 57, 59);
const VARY_CHANNEL1: FixedField = FixedField::new("vary_channel1", 59, 61);
const VARY_CHANNEL2: FixedField = FixedField::new("vary_channel2", 61, 63);
const VARY_CHANNEL3: FixedField = FixedField::new("vary_channel3", 63, 65);
const IGROUP: FixedField = FixedField::new("igroup", 65, 67);
const X_VALUE: FixedField = FixedField::new("x_value", 67, 80);

/// One resonance line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceEntry {
    pub resonance_energy: f64,
    pub capture_width: Option<f64>,
    pub channel1_width: Option<f64>,
    pub channel2_width: Option<f64>,
    pub channel3_width: Option<f64>,
    pub vary_energy: VaryFlag,
    pub vary_capture: VaryFlag,
    pub vary_channel1: VaryFlag,
    pub vary_channel2: VaryFlag,
    pub vary_channel3: VaryFlag,
    pub igroup: i32,
    pub x_value: Option<f64>,
}

impl ResonanceEntry {
    pub fn from_line(line: &str) -> Result<Self> {
        let x_value = X_VALUE.parse_float(line)?;
        if let Some(x) = x_value {
            if x < 0.0 {
                return Err(CardError::UnsupportedFormat(
                    "multi-line resonance entries (negative extra value) are not supported"
                        .to_string(),
                ));
            }
        }
        Ok(Self {
            resonance_energy: ENERGY.require_float(line)?,
            capture_width: CAPTURE.parse_float(line)?,
            channel1_width: CHANNEL1.parse_float(line)?,
            channel2_width: CHANNEL2.parse_float(line)?,
            channel3_width: CHANNEL3.parse_float(line)?,
            vary_energy: VARY_ENERGY.parse_flag(line),
            vary_capture: VARY_CAPTURE.parse_flag(line),
            vary_channel1: VARY_CHANNEL1.parse_flag(line),
            vary_channel2: VARY_CHANNEL2.parse_flag(line),
            vary_channel3: VARY_CHANNEL3.parse_flag(line),
            igroup: IGROUP.require_int(line)?,
            x_value,
        })
    }

    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(80);
        line.push_str(&format!(
            "{:>11}",
            format_scientific(self.resonance_energy, 4)
        ));
        for width in [
            self.capture_width,
            self.channel1_width,
            self.channel2_width,
            self.channel3_width,
        ] {
            match width {
                Some(v) => line.push_str(&format!("{:>11}", format_scientific(v, 4))),
                None => line.push_str(&" ".repeat(11)),
            }
        }
        for flag in [
            self.vary_energy,
            self.vary_capture,
            self.vary_channel1,
            self.vary_channel2,
            self.vary_channel3,
        ] {
            line.push_str(&format!("{:>2}", flag.value()));
        }
        line.push_str(&format!("{:>2}", self.igroup));
        if let Some(x) = self.x_value {
            line.push_str(&format!("{:>13}", format_scientific(x, 4)));
        }
        line.trim_end().to_string()
    }
}

/// The full resonance table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResonanceCard {
    pub resonances: Vec<ResonanceEntry>,
}

impl ResonanceCard {
    /// A line belongs to the resonance table when its energy columns hold a
    /// number. Used by the file-level dispatcher for the headerless card.
    pub fn is_resonance_line(line: &str) -> bool {
        matches!(ENERGY.parse_float(line), Ok(Some(_)))
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        let mut resonances = Vec::with_capacity(lines.len());
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            resonances.push(ResonanceEntry::from_line(line)?);
        }
        if resonances.is_empty() {
            return Err(CardError::InvalidCard(
                "resonance table has no entries".to_string(),
            ));
        }
        Ok(Self { resonances })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.resonances.iter().map(|r| r.to_line()).collect();
        lines.push(String::new());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_single_line() {
        let entry = ResonanceEntry {
            resonance_energy: -3.6616e6,
            capture_width: Some(1.5877e6),
            channel1_width: Some(3.6985e9),
            channel2_width: None,
            channel3_width: None,
            vary_energy: VaryFlag::No,
            vary_capture: VaryFlag::Yes,
            vary_channel1: VaryFlag::Yes,
            vary_channel2: VaryFlag::No,
            vary_channel3: VaryFlag::No,
            igroup: 1,
            x_value: None,
        };
        let line = entry.to_line();
        let parsed = ResonanceEntry::from_line(&line).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_negative_x_value_rejected() {
        let mut line = format!("{:>11}", format_scientific(1.0, 4));
        line.push_str(&" ".repeat(44));
        line.push_str(&format!("{:>2}{:>2}{:>2}{:>2}{:>2}", 0, 0, 0, 0, 0));
        line.push_str(&format!("{:>2}", 1));
        line.push_str(&format!("{:>13}", format_scientific(-2.0, 4)));
        let err = ResonanceEntry::from_line(&line).unwrap_err();
        assert!(matches!(err, CardError::UnsupportedFormat(_)));
    }
}
