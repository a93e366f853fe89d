/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! User-defined resolution function (card set 16)
//!
//! An optional BURST line, channel-dependent CHANN lines, and the `FILE=`
//! lines pointing at the tabulated resolution data.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "USER-Defined resolution function";

const MAX_FILENAME: usize = 70;

const BURST_FLAG: FixedField = FixedField::new("burst_flag", 6, 7);
const BURST_WIDTH: FixedField = FixedField::new("burst_width", 10, 20);
const BURST_UNC: FixedField = FixedField::new("burst_uncertainty", 20, 30);

const CHANN_FLAG: FixedField = FixedField::new("channel_flag", 6, 7);
const CHANN_ENERGY: FixedField = FixedField::new("channel_energy", 10, 20);
const CHANN_WIDTH: FixedField = FixedField::new("channel_width", 20, 30);
const CHANN_UNC: FixedField = FixedField::new("channel_uncertainty", 30, 40);

/// Burst-width portion of the card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBurst {
    pub flag: VaryFlag,
    pub width: f64,
    pub uncertainty: Option<f64>,
}

/// One channel-dependent resolution entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChannel {
    pub flag: VaryFlag,
    pub energy: f64,
    pub width: f64,
    pub uncertainty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserResolutionCard {
    pub burst: Option<UserBurst>,
    pub channels: Vec<UserChannel>,
    pub filenames: Vec<String>,
}

impl UserResolutionCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "USER-")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "user-resolution card needs its header line".to_string(),
            ));
        }
        let mut card = Self::default();
        for line in lines[1..].iter().filter(|l| !l.trim().is_empty()) {
            if line.starts_with("BURST") {
                if card.burst.is_some() {
                    return Err(CardError::InvalidCard(
                        "duplicate BURST line in user-resolution card".to_string(),
                    ));
                }
                card.burst = Some(UserBurst {
                    flag: BURST_FLAG.parse_flag(line),
                    width: BURST_WIDTH.require_float(line)?,
                    uncertainty: BURST_UNC.parse_float(line)?,
                });
            } else if line.starts_with("CHANN") {
                card.channels.push(UserChannel {
                    flag: CHANN_FLAG.parse_flag(line),
                    energy: CHANN_ENERGY.require_float(line)?,
                    width: CHANN_WIDTH.require_float(line)?,
                    uncertainty: CHANN_UNC.parse_float(line)?,
                });
            } else if let Some(name) = line.strip_prefix("FILE=") {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(CardError::MissingRequiredField { field: "filename" });
                }
                if name.len() > MAX_FILENAME {
                    return Err(CardError::InvalidCard(format!(
                        "resolution filename longer than {MAX_FILENAME} characters: {name:?}"
                    )));
                }
                card.filenames.push(name);
            } else {
                return Err(CardError::InvalidCard(format!(
                    "unrecognized user-resolution line: {line:?}"
                )));
            }
        }
        if card.filenames.is_empty() {
            return Err(CardError::InvalidCard(
                "user-resolution card needs at least one FILE= line".to_string(),
            ));
        }
        Ok(card)
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        if let Some(burst) = &self.burst {
            lines.push(
                format!(
                    "BURST {}   {}{}",
                    burst.flag.value(),
                    format_float(Some(burst.width), 10),
                    format_float(burst.uncertainty, 10),
                )
                .trim_end()
                .to_string(),
            );
        }
        for channel in &self.channels {
            lines.push(
                format!(
                    "CHANN {}   {}{}{}",
                    channel.flag.value(),
                    format_float(Some(channel.energy), 10),
                    format_float(Some(channel.width), 10),
                    format_float(channel.uncertainty, 10),
                )
                .trim_end()
                .to_string(),
            );
        }
        for filename in &self.filenames {
            lines.push(format!("FILE={filename}"));
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
        let card = UserResolutionCard {
            burst: Some(UserBurst {
                flag: VaryFlag::Yes,
                width: 0.25,
                uncertainty: Some(0.0625),
            }),
            channels: vec![
                UserChannel {
                    flag: VaryFlag::No,
                    energy: 100.0,
                    width: 0.5,
                    uncertainty: None,
                },
                UserChannel {
                    flag: VaryFlag::Pup,
                    energy: 2000.0,
                    width: 0.75,
                    uncertainty: Some(0.125),
                },
            ],
            filenames: vec!["resolution.dat".to_string()],
        };
        let parsed = UserResolutionCard::from_lines(&card.to_lines()).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_file_line_is_required() {
        let lines = vec![
            HEADER.to_string(),
            format!("BURST 1   {}", "2.5000E-01"),
        ];
        assert!(UserResolutionCard::from_lines(&lines).is_err());
    }
}
