/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Whole-file model
//!
//! A parameter file is a sequence of card blocks separated by blank lines.
//! Two blocks carry no header keyword: the resonance table, which comes
//! first when present, and the single-line fudge factor that follows it.
//! Every other card opens with a five-character keyword and is dispatched
//! through an ordered predicate table.

use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::cards::broadening::BroadeningCard;
use crate::cards::data_reduction::DataReductionCard;
use crate::cards::errors::{CardError, Result};
use crate::cards::external_r::ExternalRCard;
use crate::cards::isotope::IsotopeCard;
use crate::cards::misc::MiscellaneousCard;
use crate::cards::normalization::NormalizationCard;
use crate::cards::orres::OrresCard;
use crate::cards::paramagnetic::ParamagneticCard;
use crate::cards::radius::RadiusCard;
use crate::cards::resonance::ResonanceCard;
use crate::cards::unused_var::UnusedCorrelatedCard;
use crate::cards::user_resolution::UserResolutionCard;

pub const DEFAULT_FUDGE: f64 = 0.1;

const SNIPPET_LEN: usize = 60;

/// Card families a parameter file may carry, in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardKind {
    ExternalR,
    Broadening,
    UnusedCorrelated,
    Normalization,
    Radius,
    DataReduction,
    Orres,
    Isotope,
    Paramagnetic,
    UserResolution,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardKind::ExternalR => "external R-function",
            CardKind::Broadening => "broadening",
            CardKind::UnusedCorrelated => "unused correlated variables",
            CardKind::Normalization => "normalization",
            CardKind::Radius => "radius",
            CardKind::DataReduction => "data reduction",
            CardKind::Orres => "Oak Ridge resolution",
            CardKind::Isotope => "isotope",
            CardKind::Paramagnetic => "paramagnetic",
            CardKind::UserResolution => "user-defined resolution",
        };
        f.write_str(name)
    }
}

type HeaderPredicate = fn(&str) -> bool;

static DISPATCH: Lazy<Vec<(CardKind, HeaderPredicate)>> = Lazy::new(|| {
    vec![
        (CardKind::ExternalR, ExternalRCard::is_header_line),
        (CardKind::Broadening, BroadeningCard::is_header_line),
        (CardKind::UnusedCorrelated, UnusedCorrelatedCard::is_header_line),
        (CardKind::Normalization, NormalizationCard::is_header_line),
        (CardKind::Radius, RadiusCard::is_header_line),
        (CardKind::DataReduction, DataReductionCard::is_header_line),
        (CardKind::Orres, OrresCard::is_header_line),
        (CardKind::Isotope, IsotopeCard::is_header_line),
        (CardKind::Paramagnetic, ParamagneticCard::is_header_line),
        (CardKind::UserResolution, UserResolutionCard::is_header_line),
    ]
});

/// A full parameter file. Every card is optional, the resonance table
/// included; the fudge factor always carries a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterFile {
    pub resonances: Option<ResonanceCard>,
    pub fudge: f64,
    pub external_r: Option<ExternalRCard>,
    pub broadening: Option<BroadeningCard>,
    pub unused_correlated: Option<UnusedCorrelatedCard>,
    pub normalization: Option<NormalizationCard>,
    pub radius: Option<RadiusCard>,
    pub data_reduction: Option<DataReductionCard>,
    pub orres: Option<OrresCard>,
    pub isotope: Option<IsotopeCard>,
    pub paramagnetic: Option<ParamagneticCard>,
    pub user_resolution: Option<UserResolutionCard>,
}

impl Default for ParameterFile {
    fn default() -> Self {
        Self {
            resonances: None,
            fudge: DEFAULT_FUDGE,
            external_r: None,
            broadening: None,
            unused_correlated: None,
            normalization: None,
            radius: None,
            data_reduction: None,
            orres: None,
            isotope: None,
            paramagnetic: None,
            user_resolution: None,
        }
    }
}

impl ParameterFile {
    pub fn new(resonances: ResonanceCard) -> Self {
        Self {
            resonances: Some(resonances),
            ..Self::default()
        }
    }

    pub fn from_string(text: &str) -> Result<Self> {
        let mut resonances: Option<ResonanceCard> = None;
        let mut fudge: Option<f64> = None;
        let mut builder = CardSlots::default();

        for block in split_blocks(text) {
            let first = &block.lines[0];
            if let Some(kind) = DISPATCH
                .iter()
                .find(|(_, matches)| matches(first))
                .map(|(kind, _)| *kind)
            {
                builder.accept(kind, &block)?;
            } else if MiscellaneousCard::is_header_line(first) {
                return Err(CardError::UnsupportedFormat(format!(
                    "miscellaneous card at line {} is not part of a parameter file",
                    block.start_line
                )));
            } else if let Some(value) = fudge_value(&block) {
                if fudge.is_some() {
                    return Err(CardError::InvalidCard(format!(
                        "duplicate fudge factor at line {}",
                        block.start_line
                    )));
                }
                if !(0.0..=1.0).contains(&value) {
                    return Err(CardError::InvalidCard(format!(
                        "fudge factor {value} is outside [0, 1]"
                    )));
                }
                fudge = Some(value);
            } else if ResonanceCard::is_resonance_line(first) {
                if resonances.is_some() {
                    return Err(CardError::InvalidCard(format!(
                        "duplicate resonance table at line {}",
                        block.start_line
                    )));
                }
                resonances = Some(ResonanceCard::from_lines(&block.lines)?);
            } else {
                return Err(CardError::UnrecognizedCard {
                    line: block.start_line,
                    snippet: snippet(first),
                });
            }
        }

        Ok(Self {
            resonances,
            fudge: fudge.unwrap_or(DEFAULT_FUDGE),
            external_r: builder.external_r,
            broadening: builder.broadening,
            unused_correlated: builder.unused_correlated,
            normalization: builder.normalization,
            radius: builder.radius,
            data_reduction: builder.data_reduction,
            orres: builder.orres,
            isotope: builder.isotope,
            paramagnetic: builder.paramagnetic,
            user_resolution: builder.user_resolution,
        })
    }

    pub fn to_string(&self) -> String {
        let mut lines = match &self.resonances {
            Some(card) => card.to_lines(),
            None => Vec::new(),
        };
        lines.push(format!("{:>10.4}", self.fudge));
        lines.push(String::new());
        if let Some(card) = &self.external_r {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.broadening {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.unused_correlated {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.normalization {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.radius {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.data_reduction {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.orres {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.isotope {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.paramagnetic {
            lines.extend(card.to_lines());
        }
        if let Some(card) = &self.user_resolution {
            lines.extend(card.to_lines());
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_string(&text)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }
}

/// Optional-card staging area used while parsing, so duplicate detection
/// lives in one place.
#[derive(Default)]
struct CardSlots {
    external_r: Option<ExternalRCard>,
    broadening: Option<BroadeningCard>,
    unused_correlated: Option<UnusedCorrelatedCard>,
    normalization: Option<NormalizationCard>,
    radius: Option<RadiusCard>,
    data_reduction: Option<DataReductionCard>,
    orres: Option<OrresCard>,
    isotope: Option<IsotopeCard>,
    paramagnetic: Option<ParamagneticCard>,
    user_resolution: Option<UserResolutionCard>,
}

impl CardSlots {
    fn accept(&mut self, kind: CardKind, block: &Block) -> Result<()> {
        let occupied = match kind {
            CardKind::ExternalR => self.external_r.is_some(),
            CardKind::Broadening => self.broadening.is_some(),
            CardKind::UnusedCorrelated => self.unused_correlated.is_some(),
            CardKind::Normalization => self.normalization.is_some(),
            CardKind::Radius => self.radius.is_some(),
            CardKind::DataReduction => self.data_reduction.is_some(),
            CardKind::Orres => self.orres.is_some(),
            CardKind::Isotope => self.isotope.is_some(),
            CardKind::Paramagnetic => self.paramagnetic.is_some(),
            CardKind::UserResolution => self.user_resolution.is_some(),
        };
        if occupied {
            return Err(CardError::InvalidCard(format!(
                "duplicate {kind} card at line {}",
                block.start_line
            )));
        }
        match kind {
            CardKind::ExternalR => {
                self.external_r = Some(ExternalRCard::from_lines(&block.lines)?);
            }
            CardKind::Broadening => {
                self.broadening = Some(BroadeningCard::from_lines(&block.lines)?);
            }
            CardKind::UnusedCorrelated => {
                self.unused_correlated = Some(UnusedCorrelatedCard::from_lines(&block.lines)?);
            }
            CardKind::Normalization => {
                self.normalization = Some(NormalizationCard::from_lines(&block.lines)?);
            }
            CardKind::Radius => {
                self.radius = Some(RadiusCard::from_lines(&block.lines)?);
            }
            CardKind::DataReduction => {
                self.data_reduction = Some(DataReductionCard::from_lines(&block.lines)?);
            }
            CardKind::Orres => {
                self.orres = Some(OrresCard::from_lines(&block.lines)?);
            }
            CardKind::Isotope => {
                self.isotope = Some(IsotopeCard::from_lines(&block.lines)?);
            }
            CardKind::Paramagnetic => {
                self.paramagnetic = Some(ParamagneticCard::from_lines(&block.lines)?);
            }
            CardKind::UserResolution => {
                self.user_resolution = Some(UserResolutionCard::from_lines(&block.lines)?);
            }
        }
        Ok(())
    }
}

struct Block {
    start_line: usize,
    lines: Vec<String>,
}

fn split_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        let line = raw.trim_end_matches(['\r']).to_string();
        match &mut current {
            Some(block) => block.lines.push(line),
            None => {
                current = Some(Block {
                    start_line: index + 1,
                    lines: vec![line],
                });
            }
        }
    }
    if let Some(block) = current.take() {
        blocks.push(block);
    }
    blocks
}

/// The fudge factor is a single-line block holding exactly one float token.
fn fudge_value(block: &Block) -> Option<f64> {
    if block.lines.len() != 1 {
        return None;
    }
    let mut tokens = block.lines[0].split_whitespace();
    let value = tokens.next()?.parse::<f64>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(value)
}

fn snippet(line: &str) -> String {
    let mut snippet: String = line.chars().take(SNIPPET_LEN).collect();
    if line.chars().count() > SNIPPET_LEN {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::resonance::ResonanceEntry;
    use crate::cards::VaryFlag;

    fn resonance_table() -> ResonanceCard {
        ResonanceCard {
            resonances: vec![ResonanceEntry {
                resonance_energy: -3.125,
                capture_width: Some(32.0),
                channel1_width: Some(2.5),
                channel2_width: None,
                channel3_width: None,
                vary_energy: VaryFlag::Yes,
                vary_capture: VaryFlag::No,
                vary_channel1: VaryFlag::Yes,
                vary_channel2: VaryFlag::No,
                vary_channel3: VaryFlag::No,
                igroup: 1,
                x_value: None,
            }],
        }
    }

    #[test]
    fn test_minimal_file_round_trip() {
        let file = ParameterFile::new(resonance_table());
        let text = file.to_string();
        let parsed = ParameterFile::from_string(&text).unwrap();
        assert_eq!(parsed, file);
    }

    #[test]
    fn test_file_without_resonance_table_parses() {
        let text = "0.1000\n\
                    \n\
                    BROADening parameters may be varied\n\
                    1.234E+00 2.980E+02 1.500E-01 2.500E-02 1.000E+00 5.000E-01  1 0 1 0 1 0\n";
        let file = ParameterFile::from_string(text).unwrap();
        assert_eq!(file.resonances, None);
        assert!(file.broadening.is_some());
        let reparsed = ParameterFile::from_string(&file.to_string()).unwrap();
        assert_eq!(reparsed, file);
    }

    #[test]
    fn test_fudge_line_is_right_justified() {
        let file = ParameterFile::new(resonance_table());
        let text = file.to_string();
        assert!(text.lines().any(|l| l == "    0.1000"));
    }

    #[test]
    fn test_unrecognized_block_reports_line_number() {
        let file = ParameterFile::new(resonance_table());
        let text = format!("{}GARBAGE that matches no card\n", file.to_string());
        match ParameterFile::from_string(&text) {
            Err(CardError::UnrecognizedCard { line, snippet }) => {
                assert!(line > 1);
                assert!(snippet.starts_with("GARBAGE"));
            }
            other => panic!("expected UnrecognizedCard, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_card_is_rejected() {
        let file = ParameterFile::new(resonance_table());
        let broadening_text = "BROADening parameters may be varied\n\
             1.234E+00 2.980E+02 1.500E-01 2.500E-02 1.000E+00 5.000E-01  1 0 1 0 1 0\n";
        let text = format!(
            "{}{}\n{}",
            file.to_string(),
            broadening_text,
            broadening_text
        );
        let err = ParameterFile::from_string(&text).unwrap_err();
        assert!(matches!(err, CardError::InvalidCard(_)));
    }

    #[test]
    fn test_fudge_must_stay_in_range() {
        let file = ParameterFile::new(resonance_table());
        let text = file.to_string().replace("0.1000", "1.5000");
        let err = ParameterFile::from_string(&text).unwrap_err();
        assert!(matches!(err, CardError::InvalidCard(_)));
    }
}
