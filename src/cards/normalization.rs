/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Normalization and background (card set 6)
//!
//! One angle set per detector angle: a main line with the normalization and
//! five background terms plus six vary flags, optionally followed by an
//! uncertainty line. An uncertainty line carries no flags, which is how it
//! is told apart from the next angle set's main line.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "NORMAlization and background are next";

const ANORM: FixedField = FixedField::new("anorm", 0, 10);
const BACKA: FixedField = FixedField::new("backa", 10, 20);
const BACKB: FixedField = FixedField::new("backb", 20, 30);
const BACKC: FixedField = FixedField::new("backc", 30, 40);
const BACKD: FixedField = FixedField::new("backd", 40, 50);
const BACKF: FixedField = FixedField::new("backf", 50, 60);
const FLAGS: [FixedField; 6] = [
    FixedField::new("flag_anorm", 60, 62),
    FixedField::new("flag_backa", 62, 64),
    FixedField::new("flag_backb", 64, 66),
    FixedField::new("flag_backc", 66, 68),
    FixedField::new("flag_backd", 68, 70),
    FixedField::new("flag_backf", 70, 72),
];
const FLAG_REGION: FixedField = FixedField::new("flag_region", 60, 72);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationAngleSet {
    pub anorm: f64,
    pub backa: Option<f64>,
    pub backb: Option<f64>,
    pub backc: Option<f64>,
    pub backd: Option<f64>,
    pub backf: Option<f64>,
    pub flag_anorm: VaryFlag,
    pub flag_backa: VaryFlag,
    pub flag_backb: VaryFlag,
    pub flag_backc: VaryFlag,
    pub flag_backd: VaryFlag,
    pub flag_backf: VaryFlag,
    pub d_anorm: Option<f64>,
    pub d_backa: Option<f64>,
    pub d_backb: Option<f64>,
    pub d_backc: Option<f64>,
    pub d_backd: Option<f64>,
    pub d_backf: Option<f64>,
}

impl NormalizationAngleSet {
    fn from_main_line(line: &str) -> Result<Self> {
        let flags: Vec<VaryFlag> = FLAGS.iter().map(|f| f.parse_flag(line)).collect();
        Ok(Self {
            anorm: ANORM.require_float(line)?,
            backa: BACKA.parse_float(line)?,
            backb: BACKB.parse_float(line)?,
            backc: BACKC.parse_float(line)?,
            backd: BACKD.parse_float(line)?,
            backf: BACKF.parse_float(line)?,
            flag_anorm: flags[0],
            flag_backa: flags[1],
            flag_backb: flags[2],
            flag_backc: flags[3],
            flag_backd: flags[4],
            flag_backf: flags[5],
            d_anorm: None,
            d_backa: None,
            d_backb: None,
            d_backc: None,
            d_backd: None,
            d_backf: None,
        })
    }

    fn read_uncertainty_line(&mut self, line: &str) -> Result<()> {
        self.d_anorm = ANORM.parse_float(line)?;
        self.d_backa = BACKA.parse_float(line)?;
        self.d_backb = BACKB.parse_float(line)?;
        self.d_backc = BACKC.parse_float(line)?;
        self.d_backd = BACKD.parse_float(line)?;
        self.d_backf = BACKF.parse_float(line)?;
        Ok(())
    }

    fn has_uncertainties(&self) -> bool {
        [
            self.d_anorm,
            self.d_backa,
            self.d_backb,
            self.d_backc,
            self.d_backd,
            self.d_backf,
        ]
        .iter()
        .any(Option::is_some)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizationCard {
    pub angle_sets: Vec<NormalizationAngleSet>,
}

impl NormalizationCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "NORMA")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "normalization card needs its header line".to_string(),
            ));
        }
        let mut angle_sets: Vec<NormalizationAngleSet> = Vec::new();
        for line in lines[1..].iter().filter(|l| !l.trim().is_empty()) {
            if FLAG_REGION.is_blank(line) {
                match angle_sets.last_mut() {
                    Some(set) if !set.has_uncertainties() => {
                        set.read_uncertainty_line(line)?;
                    }
                    _ => {
                        return Err(CardError::InvalidCard(
                            "normalization uncertainty line without a parameter line"
                                .to_string(),
                        ))
                    }
                }
            } else {
                angle_sets.push(NormalizationAngleSet::from_main_line(line)?);
            }
        }
        if angle_sets.is_empty() {
            return Err(CardError::InvalidCard(
                "normalization card has no angle sets".to_string(),
            ));
        }
        Ok(Self { angle_sets })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        for set in &self.angle_sets {
            let values = [
                Some(set.anorm),
                set.backa,
                set.backb,
                set.backc,
                set.backd,
                set.backf,
            ];
            let texts: Vec<String> = values.iter().map(|v| format_float(*v, 9)).collect();
            let flags = [
                set.flag_anorm,
                set.flag_backa,
                set.flag_backb,
                set.flag_backc,
                set.flag_backd,
                set.flag_backf,
            ];
            let flag_texts: Vec<String> = flags.iter().map(|f| f.value().to_string()).collect();
            lines.push(format!("{}  {}", texts.join(" "), flag_texts.join(" ")));

            if set.has_uncertainties() {
                let uncs = [
                    set.d_anorm,
                    set.d_backa,
                    set.d_backb,
                    set.d_backc,
                    set.d_backd,
                    set.d_backf,
                ];
                let texts: Vec<String> = uncs.iter().map(|v| format_float(*v, 9)).collect();
                lines.push(texts.join(" ").trim_end().to_string());
            }
        }
        lines.push(String::new());
        lines
    }
}
