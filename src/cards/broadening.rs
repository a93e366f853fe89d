/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Broadening parameters (card set 4)
//!
//! One main line with six values (matching radius, temperature, thickness,
//! and three resolution widths) and their vary flags, an optional
//! uncertainty line, and an optional Gaussian resolution line with its own
//! flags and uncertainty line. The Gaussian pair is both-or-neither and its
//! flags are mandatory, so bad flag columns there are a hard error instead
//! of reading as "fixed".

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "BROADening parameters may be varied";

const CRFN: FixedField = FixedField::new("crfn", 0, 10);
const TEMP: FixedField = FixedField::new("temp", 10, 20);
const THICK: FixedField = FixedField::new("thick", 20, 30);
const DELTAL: FixedField = FixedField::new("deltal", 30, 40);
const DELTAG: FixedField = FixedField::new("deltag", 40, 50);
const DELTAE: FixedField = FixedField::new("deltae", 50, 60);
const FLAG_COLS: [FixedField; 6] = [
    FixedField::new("flag_crfn", 60, 62),
    FixedField::new("flag_temp", 62, 64),
    FixedField::new("flag_thick", 64, 66),
    FixedField::new("flag_deltal", 66, 68),
    FixedField::new("flag_deltag", 68, 70),
    FixedField::new("flag_deltae", 70, 72),
];

const DELTC1: FixedField = FixedField::new("deltc1", 0, 10);
const DELTC2: FixedField = FixedField::new("deltc2", 10, 20);
const FLAG_DELTC1: FixedField = FixedField::new("flag_deltc1", 60, 62);
const FLAG_DELTC2: FixedField = FixedField::new("flag_deltc2", 62, 64);

/// Optional Gaussian resolution extension of the broadening card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBroadening {
    pub deltc1: f64,
    pub deltc2: f64,
    pub flag_deltc1: VaryFlag,
    pub flag_deltc2: VaryFlag,
    pub d_deltc1: Option<f64>,
    pub d_deltc2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadeningCard {
    pub crfn: f64,
    pub temp: f64,
    pub thick: f64,
    pub deltal: f64,
    pub deltag: f64,
    pub deltae: f64,
    pub flag_crfn: VaryFlag,
    pub flag_temp: VaryFlag,
    pub flag_thick: VaryFlag,
    pub flag_deltal: VaryFlag,
    pub flag_deltag: VaryFlag,
    pub flag_deltae: VaryFlag,
    pub d_crfn: Option<f64>,
    pub d_temp: Option<f64>,
    pub d_thick: Option<f64>,
    pub d_deltal: Option<f64>,
    pub d_deltag: Option<f64>,
    pub d_deltae: Option<f64>,
    pub gaussian: Option<GaussianBroadening>,
}

impl BroadeningCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "BROAD")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.len() < 2 || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "broadening card needs a header and a parameter line".to_string(),
            ));
        }
        let main = &lines[1];
        let flags: Vec<VaryFlag> = FLAG_COLS.iter().map(|f| f.parse_flag(main)).collect();
        let mut card = Self {
            crfn: CRFN.require_float(main)?,
            temp: TEMP.require_float(main)?,
            thick: THICK.require_float(main)?,
            deltal: DELTAL.require_float(main)?,
            deltag: DELTAG.require_float(main)?,
            deltae: DELTAE.require_float(main)?,
            flag_crfn: flags[0],
            flag_temp: flags[1],
            flag_thick: flags[2],
            flag_deltal: flags[3],
            flag_deltag: flags[4],
            flag_deltae: flags[5],
            d_crfn: None,
            d_temp: None,
            d_thick: None,
            d_deltal: None,
            d_deltag: None,
            d_deltae: None,
            gaussian: None,
        };

        let mut seen_uncertainty = false;
        for line in lines[2..].iter().filter(|l| !l.trim().is_empty()) {
            let has_gaussian_flags =
                !FLAG_DELTC1.is_blank(line) || !FLAG_DELTC2.is_blank(line);
            match &mut card.gaussian {
                None if has_gaussian_flags => {
                    card.gaussian = Some(GaussianBroadening {
                        deltc1: DELTC1.require_float(line)?,
                        deltc2: DELTC2.require_float(line)?,
                        flag_deltc1: FLAG_DELTC1
                            .parse_flag_in(line, VaryFlag::FIXED_OR_VARIED)?,
                        flag_deltc2: FLAG_DELTC2
                            .parse_flag_in(line, VaryFlag::FIXED_OR_VARIED)?,
                        d_deltc1: None,
                        d_deltc2: None,
                    });
                }
                None if !seen_uncertainty => {
                    card.d_crfn = CRFN.parse_float(line)?;
                    card.d_temp = TEMP.parse_float(line)?;
                    card.d_thick = THICK.parse_float(line)?;
                    card.d_deltal = DELTAL.parse_float(line)?;
                    card.d_deltag = DELTAG.parse_float(line)?;
                    card.d_deltae = DELTAE.parse_float(line)?;
                    seen_uncertainty = true;
                }
                Some(gaussian) if gaussian.d_deltc1.is_none() && gaussian.d_deltc2.is_none() => {
                    gaussian.d_deltc1 = DELTC1.parse_float(line)?;
                    gaussian.d_deltc2 = DELTC2.parse_float(line)?;
                }
                _ => {
                    return Err(CardError::InvalidCard(format!(
                        "unexpected extra broadening line: {line:?}"
                    )))
                }
            }
        }
        Ok(card)
    }

    fn has_uncertainties(&self) -> bool {
        [
            self.d_crfn,
            self.d_temp,
            self.d_thick,
            self.d_deltal,
            self.d_deltag,
            self.d_deltae,
        ]
        .iter()
        .any(Option::is_some)
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];

        let values = [
            Some(self.crfn),
            Some(self.temp),
            Some(self.thick),
            Some(self.deltal),
            Some(self.deltag),
            Some(self.deltae),
        ];
        let flags = [
            self.flag_crfn,
            self.flag_temp,
            self.flag_thick,
            self.flag_deltal,
            self.flag_deltag,
            self.flag_deltae,
        ];
        lines.push(main_line(&values, &flags));

        if self.has_uncertainties() {
            let uncs = [
                self.d_crfn,
                self.d_temp,
                self.d_thick,
                self.d_deltal,
                self.d_deltag,
                self.d_deltae,
            ];
            lines.push(floats_only_line(&uncs));
        }

        if let Some(gaussian) = &self.gaussian {
            let values = [Some(gaussian.deltc1), Some(gaussian.deltc2), None, None, None, None];
            let mut line = String::new();
            let texts: Vec<String> = values.iter().map(|v| format_float(*v, 9)).collect();
            line.push_str(&texts.join(" "));
            line.push_str("  ");
            line.push_str(&format!(
                "{} {}",
                gaussian.flag_deltc1.value(),
                gaussian.flag_deltc2.value()
            ));
            lines.push(line);

            if gaussian.d_deltc1.is_some() || gaussian.d_deltc2.is_some() {
                lines.push(floats_only_line(&[
                    gaussian.d_deltc1,
                    gaussian.d_deltc2,
                    None,
                    None,
                    None,
                    None,
                ]));
            }
        }

        lines.push(String::new());
        lines
    }
}

fn main_line(values: &[Option<f64>; 6], flags: &[VaryFlag; 6]) -> String {
    let texts: Vec<String> = values.iter().map(|v| format_float(*v, 9)).collect();
    let flag_texts: Vec<String> = flags.iter().map(|f| f.value().to_string()).collect();
    format!("{}  {}", texts.join(" "), flag_texts.join(" "))
}

fn floats_only_line(values: &[Option<f64>; 6]) -> String {
    let texts: Vec<String> = values.iter().map(|v| format_float(*v, 9)).collect();
    texts.join(" ").trim_end().to_string()
}
