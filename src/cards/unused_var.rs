/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Unused but correlated variables
//!
//! Pairs of lines: a name line with up to eight five-character names on a
//! ten-column grid, then a value line with the matching width-10 values.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_scientific, FixedField};
use crate::cards::header_matches;

pub const HEADER: &str = "UNUSEd but correlated variables come next";

const PER_LINE: usize = 8;
const SLOT: usize = 10;
const NAME_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusedVariable {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnusedCorrelatedCard {
    pub variables: Vec<UnusedVariable>,
}

impl UnusedCorrelatedCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "UNUSE")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "unused-variable card needs its header line".to_string(),
            ));
        }
        let body: Vec<&String> = lines[1..].iter().filter(|l| !l.trim().is_empty()).collect();
        if body.len() % 2 != 0 {
            return Err(CardError::InvalidCard(
                "unused-variable card needs name/value line pairs".to_string(),
            ));
        }
        let mut variables = Vec::new();
        for pair in body.chunks(2) {
            let (names, values) = (pair[0], pair[1]);
            for slot in 0..PER_LINE {
                let name_field =
                    FixedField::new("variable_name", slot * SLOT, slot * SLOT + NAME_WIDTH);
                let value_field =
                    FixedField::new("variable_value", slot * SLOT, (slot + 1) * SLOT);
                if let Some(name) = name_field.parse_text(names) {
                    variables.push(UnusedVariable {
                        name,
                        value: value_field.require_float(values)?,
                    });
                }
            }
        }
        Ok(Self { variables })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        for chunk in self.variables.chunks(PER_LINE) {
            let mut names = String::new();
            let mut values = String::new();
            for variable in chunk {
                names.push_str(&format!("{:<1$}", variable.name, SLOT));
                values.push_str(&format!("{:>10}", format_scientific(variable.value, 4)));
            }
            lines.push(names.trim_end().to_string());
            lines.push(values);
        }
        lines.push(String::new());
        lines
    }
}
