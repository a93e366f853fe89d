/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! External R-function parameters (card set 3 / 3a)
//!
//! Two incompatible layouts share this card family. Format 3 spreads five
//! values over width-11 columns with trailing spaced flags; format 3a packs
//! seven flags right after the channel number and seven width-10 values
//! behind them. The header keyword picks the layout, so the card is a
//! tagged union.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER_FORMAT3: &str = "EXTERnal R-function parameters follow";
pub const HEADER_FORMAT3A: &str = "R-EXTernal parameters follow";

// Format 3 columns
const F3_SPIN_GROUP: FixedField = FixedField::new("spin_group", 0, 3);
const F3_CHANNEL: FixedField = FixedField::new("channel", 3, 5);
const F3_E_DOWN: FixedField = FixedField::new("e_down", 5, 16);
const F3_E_UP: FixedField = FixedField::new("e_up", 16, 27);
const F3_R_CON: FixedField = FixedField::new("r_con", 27, 38);
const F3_R_LIN: FixedField = FixedField::new("r_lin", 38, 49);
const F3_S_ALPHA: FixedField = FixedField::new("s_alpha", 49, 60);
const F3_VARY_E_DOWN: FixedField = FixedField::new("vary_e_down", 61, 62);
const F3_VARY_E_UP: FixedField = FixedField::new("vary_e_up", 63, 64);
const F3_VARY_R_CON: FixedField = FixedField::new("vary_r_con", 65, 66);
const F3_VARY_R_LIN: FixedField = FixedField::new("vary_r_lin", 67, 68);
const F3_VARY_S_ALPHA: FixedField = FixedField::new("vary_s_alpha", 69, 70);

// Format 3a columns
const F3A_SPIN_GROUP: FixedField = FixedField::new("spin_group", 0, 2);
const F3A_CHANNEL: FixedField = FixedField::new("channel", 2, 3);
const F3A_VARY: [FixedField; 7] = [
    FixedField::new("vary_e_down", 3, 4),
    FixedField::new("vary_e_up", 4, 5),
    FixedField::new("vary_r_con", 5, 6),
    FixedField::new("vary_r_lin", 6, 7),
    FixedField::new("vary_s_con", 7, 8),
    FixedField::new("vary_s_lin", 8, 9),
    FixedField::new("vary_r_q", 9, 10),
];
const F3A_E_DOWN: FixedField = FixedField::new("e_down", 10, 20);
const F3A_E_UP: FixedField = FixedField::new("e_up", 20, 30);
const F3A_R_CON: FixedField = FixedField::new("r_con", 30, 40);
const F3A_R_LIN: FixedField = FixedField::new("r_lin", 40, 50);
const F3A_S_CON: FixedField = FixedField::new("s_con", 50, 60);
const F3A_S_LIN: FixedField = FixedField::new("s_lin", 60, 70);
const F3A_R_Q: FixedField = FixedField::new("r_q", 70, 80);

/// Format 3 entry: logarithmic parametrization with a single s_alpha term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalR3Entry {
    pub spin_group: i32,
    pub channel: i32,
    pub e_down: Option<f64>,
    pub e_up: Option<f64>,
    pub r_con: Option<f64>,
    pub r_lin: Option<f64>,
    pub s_alpha: Option<f64>,
    pub vary_e_down: VaryFlag,
    pub vary_e_up: VaryFlag,
    pub vary_r_con: VaryFlag,
    pub vary_r_lin: VaryFlag,
    pub vary_s_alpha: VaryFlag,
}

impl ExternalR3Entry {
    fn from_line(line: &str) -> Result<Self> {
        Ok(Self {
            spin_group: F3_SPIN_GROUP.require_int(line)?,
            channel: F3_CHANNEL.require_int(line)?,
            e_down: F3_E_DOWN.parse_float(line)?,
            e_up: F3_E_UP.parse_float(line)?,
            r_con: F3_R_CON.parse_float(line)?,
            r_lin: F3_R_LIN.parse_float(line)?,
            s_alpha: F3_S_ALPHA.parse_float(line)?,
            vary_e_down: F3_VARY_E_DOWN.parse_flag(line),
            vary_e_up: F3_VARY_E_UP.parse_flag(line),
            vary_r_con: F3_VARY_R_CON.parse_flag(line),
            vary_r_lin: F3_VARY_R_LIN.parse_flag(line),
            vary_s_alpha: F3_VARY_S_ALPHA.parse_flag(line),
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!("{:>2} {:>1} ", self.spin_group, self.channel);
        for value in [self.e_down, self.e_up, self.r_con, self.r_lin, self.s_alpha] {
            line.push_str(&format_float(value, 11));
        }
        line.push(' ');
        let flags = [
            self.vary_e_down,
            self.vary_e_up,
            self.vary_r_con,
            self.vary_r_lin,
            self.vary_s_alpha,
        ];
        let flag_text: Vec<String> = flags.iter().map(|f| f.value().to_string()).collect();
        line.push_str(&flag_text.join(" "));
        line.trim_end().to_string()
    }
}

/// Format 3a entry: packed layout with separate constant and linear s terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalR3aEntry {
    pub spin_group: i32,
    pub channel: i32,
    pub e_down: Option<f64>,
    pub e_up: Option<f64>,
    pub r_con: Option<f64>,
    pub r_lin: Option<f64>,
    pub s_con: Option<f64>,
    pub s_lin: Option<f64>,
    pub r_q: Option<f64>,
    pub vary_e_down: VaryFlag,
    pub vary_e_up: VaryFlag,
    pub vary_r_con: VaryFlag,
    pub vary_r_lin: VaryFlag,
    pub vary_s_con: VaryFlag,
    pub vary_s_lin: VaryFlag,
    pub vary_r_q: VaryFlag,
}

impl ExternalR3aEntry {
    fn from_line(line: &str) -> Result<Self> {
        let flags: Vec<VaryFlag> = F3A_VARY.iter().map(|f| f.parse_flag(line)).collect();
        Ok(Self {
            spin_group: F3A_SPIN_GROUP.require_int(line)?,
            channel: F3A_CHANNEL.require_int(line)?,
            e_down: F3A_E_DOWN.parse_float(line)?,
            e_up: F3A_E_UP.parse_float(line)?,
            r_con: F3A_R_CON.parse_float(line)?,
            r_lin: F3A_R_LIN.parse_float(line)?,
            s_con: F3A_S_CON.parse_float(line)?,
            s_lin: F3A_S_LIN.parse_float(line)?,
            r_q: F3A_R_Q.parse_float(line)?,
            vary_e_down: flags[0],
            vary_e_up: flags[1],
            vary_r_con: flags[2],
            vary_r_lin: flags[3],
            vary_s_con: flags[4],
            vary_s_lin: flags[5],
            vary_r_q: flags[6],
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!("{:>2}{:>1}", self.spin_group, self.channel);
        for flag in [
            self.vary_e_down,
            self.vary_e_up,
            self.vary_r_con,
            self.vary_r_lin,
            self.vary_s_con,
            self.vary_s_lin,
            self.vary_r_q,
        ] {
            line.push_str(&flag.value().to_string());
        }
        for value in [
            self.e_down, self.e_up, self.r_con, self.r_lin, self.s_con, self.s_lin, self.r_q,
        ] {
            line.push_str(&format_float(value, 10));
        }
        line.trim_end().to_string()
    }
}

/// External R-function card, tagged by layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExternalRCard {
    Format3 { entries: Vec<ExternalR3Entry> },
    Format3a { entries: Vec<ExternalR3aEntry> },
}

impl ExternalRCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "EXTER") || header_matches(line, "R-EXT")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        let header = lines
            .first()
            .ok_or_else(|| CardError::InvalidCard("external R card is empty".to_string()))?;
        let body: Vec<&String> = lines[1..]
            .iter()
            .filter(|l| !l.trim().is_empty())
            .collect();
        if body.is_empty() {
            return Err(CardError::InvalidCard(
                "external R card has no entries".to_string(),
            ));
        }
        if header_matches(header, "EXTER") {
            let entries = body
                .iter()
                .map(|l| ExternalR3Entry::from_line(l))
                .collect::<Result<Vec<_>>>()?;
            Ok(ExternalRCard::Format3 { entries })
        } else if header_matches(header, "R-EXT") {
            let entries = body
                .iter()
                .map(|l| ExternalR3aEntry::from_line(l))
                .collect::<Result<Vec<_>>>()?;
            Ok(ExternalRCard::Format3a { entries })
        } else {
            Err(CardError::InvalidCard(format!(
                "not an external R header: {header:?}"
            )))
        }
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            ExternalRCard::Format3 { entries } => {
                lines.push(HEADER_FORMAT3.to_string());
                lines.extend(entries.iter().map(|e| e.to_line()));
            }
            ExternalRCard::Format3a { entries } => {
                lines.push(HEADER_FORMAT3A.to_string());
                lines.extend(entries.iter().map(|e| e.to_line()));
            }
        }
        lines.push(String::new());
        lines
    }
}
