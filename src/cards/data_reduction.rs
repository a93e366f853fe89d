/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Data reduction parameters (card set 12)
//!
//! Named parameters with a value, an optional uncertainty, and an optional
//! partial-derivative coefficient, one per line.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "DATA reduction parameters are next";

const NAME: FixedField = FixedField::new("parameter_name", 0, 5);
const FLAG: FixedField = FixedField::new("flag", 6, 7);
const VALUE: FixedField = FixedField::new("value", 10, 20);
const UNCERTAINTY: FixedField = FixedField::new("uncertainty", 20, 30);
const DERIVATIVE: FixedField = FixedField::new("derivative", 30, 40);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataReductionParameter {
    pub name: String,
    pub flag: VaryFlag,
    pub value: f64,
    pub uncertainty: Option<f64>,
    pub derivative: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataReductionCard {
    pub parameters: Vec<DataReductionParameter>,
}

impl DataReductionCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "DATA")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "data reduction card needs its header line".to_string(),
            ));
        }
        let mut parameters = Vec::new();
        for line in lines[1..].iter().filter(|l| !l.trim().is_empty()) {
            let name = NAME.parse_text(line).ok_or(CardError::MissingRequiredField {
                field: "parameter_name",
            })?;
            parameters.push(DataReductionParameter {
                name,
                flag: FLAG.parse_flag(line),
                value: VALUE.require_float(line)?,
                uncertainty: UNCERTAINTY.parse_float(line)?,
                derivative: DERIVATIVE.parse_float(line)?,
            });
        }
        if parameters.is_empty() {
            return Err(CardError::InvalidCard(
                "data reduction card has no parameters".to_string(),
            ));
        }
        Ok(Self { parameters })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        for parameter in &self.parameters {
            lines.push(
                format!(
                    "{:<5} {}   {}{}{}",
                    parameter.name,
                    parameter.flag.value(),
                    format_float(Some(parameter.value), 10),
                    format_float(parameter.uncertainty, 10),
                    format_float(parameter.derivative, 10),
                )
                .trim_end()
                .to_string(),
            );
        }
        lines.push(String::new());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let card = DataReductionCard {
            parameters: vec![
                DataReductionParameter {
                    name: "BKG".to_string(),
                    flag: VaryFlag::Yes,
                    value: 0.75,
                    uncertainty: Some(0.05),
                    derivative: None,
                },
                DataReductionParameter {
                    name: "NORM".to_string(),
                    flag: VaryFlag::No,
                    value: 1.25,
                    uncertainty: None,
                    derivative: Some(-0.5),
                },
            ],
        };
        let parsed = DataReductionCard::from_lines(&card.to_lines()).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let lines = vec![
            HEADER.to_string(),
            format!("{} 1   {}", "     ", "1.0000E+00"),
        ];
        assert!(DataReductionCard::from_lines(&lines).is_err());
    }
}
