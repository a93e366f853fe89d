/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Paramagnetic cross-section parameters
//!
//! Each entry is a pair of lines: a main line naming the nuclide (TM, ER,
//! or HO) with the A, B, and P terms, then an isotope line with the C term.
//! The isotope line leaves its first five columns blank, which is how the
//! two are told apart.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "PARAMagnetic cross section parameters follow";

const NUCLIDE: FixedField = FixedField::new("nuclide", 0, 5);
const FLAG_A: FixedField = FixedField::new("flag_a", 6, 7);
const FLAG_B: FixedField = FixedField::new("flag_b", 8, 9);
const FLAG_P: FixedField = FixedField::new("flag_p", 9, 10);
const A_VALUE: FixedField = FixedField::new("a_value", 10, 20);
const A_UNC: FixedField = FixedField::new("a_uncertainty", 20, 30);
const B_VALUE: FixedField = FixedField::new("b_value", 30, 40);
const B_UNC: FixedField = FixedField::new("b_uncertainty", 40, 50);
const P_VALUE: FixedField = FixedField::new("p_value", 50, 60);
const P_UNC: FixedField = FixedField::new("p_uncertainty", 60, 70);

const ISO_NUMBER: FixedField = FixedField::new("isotope_number", 6, 7);
const FLAG_C: FixedField = FixedField::new("flag_c", 8, 9);
const C_VALUE: FixedField = FixedField::new("c_value", 10, 20);
const C_UNC: FixedField = FixedField::new("c_uncertainty", 20, 30);

/// Nuclides with tabulated paramagnetic cross sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NuclideType {
    Tm,
    Er,
    Ho,
}

impl NuclideType {
    fn parse(text: &str) -> Result<Self> {
        match text.to_ascii_uppercase().as_str() {
            "TM" => Ok(NuclideType::Tm),
            "ER" => Ok(NuclideType::Er),
            "HO" => Ok(NuclideType::Ho),
            other => Err(CardError::MalformedField {
                field: "nuclide",
                text: other.to_string(),
            }),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            NuclideType::Tm => "TM",
            NuclideType::Er => "ER",
            NuclideType::Ho => "HO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamagneticEntry {
    pub nuclide: NuclideType,
    pub flag_a: VaryFlag,
    pub flag_b: VaryFlag,
    pub flag_p: VaryFlag,
    pub a_value: f64,
    pub a_uncertainty: Option<f64>,
    pub b_value: f64,
    pub b_uncertainty: Option<f64>,
    pub p_value: f64,
    pub p_uncertainty: Option<f64>,
    pub isotope_number: i32,
    pub flag_c: VaryFlag,
    pub c_value: f64,
    pub c_uncertainty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamagneticCard {
    pub entries: Vec<ParamagneticEntry>,
}

impl ParamagneticCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "PARAM")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "paramagnetic card needs its header line".to_string(),
            ));
        }
        let content: Vec<&String> = lines[1..].iter().filter(|l| !l.trim().is_empty()).collect();
        if content.len() % 2 != 0 {
            return Err(CardError::InvalidCard(
                "paramagnetic card needs main/isotope line pairs".to_string(),
            ));
        }
        let mut entries = Vec::new();
        for pair in content.chunks(2) {
            let (main, iso) = (pair[0], pair[1]);
            let nuclide_text = NUCLIDE.parse_text(main).ok_or(CardError::MissingRequiredField {
                field: "nuclide",
            })?;
            if !NUCLIDE.is_blank(iso) {
                return Err(CardError::InvalidCard(
                    "paramagnetic isotope line must leave its first columns blank".to_string(),
                ));
            }
            entries.push(ParamagneticEntry {
                nuclide: NuclideType::parse(&nuclide_text)?,
                flag_a: FLAG_A.parse_flag(main),
                flag_b: FLAG_B.parse_flag(main),
                flag_p: FLAG_P.parse_flag(main),
                a_value: A_VALUE.require_float(main)?,
                a_uncertainty: A_UNC.parse_float(main)?,
                b_value: B_VALUE.require_float(main)?,
                b_uncertainty: B_UNC.parse_float(main)?,
                p_value: P_VALUE.require_float(main)?,
                p_uncertainty: P_UNC.parse_float(main)?,
                isotope_number: ISO_NUMBER.require_int(iso)?,
                flag_c: FLAG_C.parse_flag(iso),
                c_value: C_VALUE.require_float(iso)?,
                c_uncertainty: C_UNC.parse_float(iso)?,
            });
        }
        if entries.is_empty() {
            return Err(CardError::InvalidCard(
                "paramagnetic card has no entries".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        for entry in &self.entries {
            lines.push(
                format!(
                    "{:<5} {} {}{}{}{}{}{}{}{}",
                    entry.nuclide.as_str(),
                    entry.flag_a.value(),
                    entry.flag_b.value(),
                    entry.flag_p.value(),
                    format_float(Some(entry.a_value), 10),
                    format_float(entry.a_uncertainty, 10),
                    format_float(Some(entry.b_value), 10),
                    format_float(entry.b_uncertainty, 10),
                    format_float(Some(entry.p_value), 10),
                    format_float(entry.p_uncertainty, 10),
                )
                .trim_end()
                .to_string(),
            );
            lines.push(
                format!(
                    "      {} {} {}{}",
                    entry.isotope_number,
                    entry.flag_c.value(),
                    format_float(Some(entry.c_value), 10),
                    format_float(entry.c_uncertainty, 10),
                )
                .trim_end()
                .to_string(),
            );
        }
        lines.push(String::new());
        lines
    }
}
