/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Miscellaneous parameters (card set 11)
//!
//! A grab bag of single-purpose records, each tagged by an identifier in
//! columns 0-5 of its line. All records are one line except NONUN, whose
//! consecutive lines describe a non-uniform sample thickness profile. This
//! card stands alone; the file-level aggregator does not carry it.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "MISCEllaneous parameters follow";

const IDENTIFIER: FixedField = FixedField::new("identifier", 0, 5);

// Most records put one-column flags at 6 and 8; the numeric payload starts
// at column 10 in contiguous width-10 fields.
const F10: [FixedField; 6] = [
    FixedField::new("value1", 10, 20),
    FixedField::new("value2", 20, 30),
    FixedField::new("value3", 30, 40),
    FixedField::new("value4", 40, 50),
    FixedField::new("value5", 50, 60),
    FixedField::new("value6", 60, 70),
];
const FLAG_A: FixedField = FixedField::new("flag_a", 6, 7);
const FLAG_B: FixedField = FixedField::new("flag_b", 8, 9);
const FLAG_C: FixedField = FixedField::new("flag_c", 9, 10);

/// DELTA: flight-path length corrections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub l1_flag: VaryFlag,
    pub l0_flag: VaryFlag,
    pub l1_coefficient: f64,
    pub l1_uncertainty: Option<f64>,
    pub l0_constant: f64,
    pub l0_uncertainty: Option<f64>,
}

/// ETA: normalization coefficient at a reference energy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaRecord {
    pub flag: VaryFlag,
    pub nu_value: f64,
    pub nu_uncertainty: Option<f64>,
    pub energy: Option<f64>,
}

/// FINIT: finite-size corrections for incoming and outgoing neutrons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinitRecord {
    pub flag_in: VaryFlag,
    pub flag_out: VaryFlag,
    pub attn_in: f64,
    pub d_attn_in: Option<f64>,
    pub attn_out: f64,
    pub d_attn_out: Option<f64>,
}

/// GAMMA: radiation width for one spin group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaRecord {
    pub spin_group: i32,
    pub flag: VaryFlag,
    pub width: f64,
    pub uncertainty: Option<f64>,
}

/// TZERO: time offset and flight-path scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TzeroRecord {
    pub flag_t0: VaryFlag,
    pub flag_l0: VaryFlag,
    pub t0: f64,
    pub t0_uncertainty: Option<f64>,
    pub l0: f64,
    pub l0_uncertainty: Option<f64>,
    pub flight_path_length: Option<f64>,
}

/// SIABN: self-indication abundances for up to three nuclides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiabnRecord {
    pub flag1: VaryFlag,
    pub flag2: VaryFlag,
    pub flag3: VaryFlag,
    pub abundance1: f64,
    pub uncertainty1: Option<f64>,
    pub abundance2: Option<f64>,
    pub uncertainty2: Option<f64>,
    pub abundance3: Option<f64>,
    pub uncertainty3: Option<f64>,
}

/// SELFI: self-indication transmission sample conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfiRecord {
    pub flag_temp: VaryFlag,
    pub flag_thick: VaryFlag,
    pub temperature: f64,
    pub temp_uncertainty: Option<f64>,
    pub thickness: f64,
    pub thick_uncertainty: Option<f64>,
}

/// EFFIC: capture and fission detection efficiencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficRecord {
    pub flag_capture: VaryFlag,
    pub flag_fission: VaryFlag,
    pub capture_efficiency: f64,
    pub fission_efficiency: f64,
    pub capture_uncertainty: Option<f64>,
    pub fission_uncertainty: Option<f64>,
}

/// DELTE: energy-dependent flight-path corrections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelteRecord {
    pub flag_e1: VaryFlag,
    pub flag_e0: VaryFlag,
    pub flag_log: VaryFlag,
    pub dele1: f64,
    pub dd1: Option<f64>,
    pub dele0: Option<f64>,
    pub dd0: Option<f64>,
    pub delel: Option<f64>,
    pub ddl: Option<f64>,
}

/// DRCAP: direct-capture component coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrcapRecord {
    pub flag: VaryFlag,
    pub nuclide: i32,
    pub coefficient: f64,
    pub uncertainty: Option<f64>,
}

/// One radius/thickness point of a NONUN profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonunPoint {
    pub radius: f64,
    pub thickness: f64,
    pub uncertainty: Option<f64>,
}

/// NONUN: non-uniform sample thickness profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonunRecord {
    pub points: Vec<NonunPoint>,
}

impl NonunRecord {
    fn validate(&self) -> Result<()> {
        if self.points.len() < 2 {
            return Err(CardError::InvalidCard(
                "NONUN needs at least two points (center and edge)".to_string(),
            ));
        }
        if self.points[0].radius != 0.0 {
            return Err(CardError::InvalidCard(
                "first NONUN radius must be zero".to_string(),
            ));
        }
        for pair in self.points.windows(2) {
            if pair[1].radius <= pair[0].radius {
                return Err(CardError::InvalidCard(
                    "NONUN radii must be strictly increasing".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MiscRecord {
    Delta(DeltaRecord),
    Eta(EtaRecord),
    Finit(FinitRecord),
    Gamma(GammaRecord),
    Tzero(TzeroRecord),
    Siabn(SiabnRecord),
    Selfi(SelfiRecord),
    Effic(EfficRecord),
    Delte(DelteRecord),
    Drcap(DrcapRecord),
    Nonun(NonunRecord),
}

impl MiscRecord {
    pub fn identifier(&self) -> &'static str {
        match self {
            MiscRecord::Delta(_) => "DELTA",
            MiscRecord::Eta(_) => "ETA",
            MiscRecord::Finit(_) => "FINIT",
            MiscRecord::Gamma(_) => "GAMMA",
            MiscRecord::Tzero(_) => "TZERO",
            MiscRecord::Siabn(_) => "SIABN",
            MiscRecord::Selfi(_) => "SELFI",
            MiscRecord::Effic(_) => "EFFIC",
            MiscRecord::Delte(_) => "DELTE",
            MiscRecord::Drcap(_) => "DRCAP",
            MiscRecord::Nonun(_) => "NONUN",
        }
    }

    fn from_line(line: &str) -> Result<Self> {
        let id = IDENTIFIER.trimmed(line).to_ascii_uppercase();
        match id.as_str() {
            "DELTA" => Ok(MiscRecord::Delta(DeltaRecord {
                l1_flag: FLAG_A.parse_flag(line),
                l0_flag: FLAG_B.parse_flag(line),
                l1_coefficient: F10[0].require_float(line)?,
                l1_uncertainty: F10[1].parse_float(line)?,
                l0_constant: F10[2].require_float(line)?,
                l0_uncertainty: F10[3].parse_float(line)?,
            })),
            "ETA" => Ok(MiscRecord::Eta(EtaRecord {
                flag: FLAG_A.parse_flag(line),
                nu_value: F10[0].require_float(line)?,
                nu_uncertainty: F10[1].parse_float(line)?,
                energy: F10[2].parse_float(line)?,
            })),
            "FINIT" => Ok(MiscRecord::Finit(FinitRecord {
                flag_in: FLAG_A.parse_flag(line),
                flag_out: FLAG_B.parse_flag(line),
                attn_in: F10[0].require_float(line)?,
                d_attn_in: F10[1].parse_float(line)?,
                attn_out: F10[2].require_float(line)?,
                d_attn_out: F10[3].parse_float(line)?,
            })),
            "GAMMA" => Ok(MiscRecord::Gamma(GammaRecord {
                spin_group: FixedField::new("spin_group", 5, 7).require_int(line)?,
                flag: FixedField::new("flag", 7, 9).parse_flag(line),
                width: F10[0].require_float(line)?,
                uncertainty: F10[1].parse_float(line)?,
            })),
            "TZERO" => Ok(MiscRecord::Tzero(TzeroRecord {
                flag_t0: FLAG_A.parse_flag(line),
                flag_l0: FLAG_B.parse_flag(line),
                t0: F10[0].require_float(line)?,
                t0_uncertainty: F10[1].parse_float(line)?,
                l0: F10[2].require_float(line)?,
                l0_uncertainty: F10[3].parse_float(line)?,
                flight_path_length: F10[4].parse_float(line)?,
            })),
            "SIABN" => Ok(MiscRecord::Siabn(SiabnRecord {
                flag1: FLAG_A.parse_flag(line),
                flag2: FLAG_B.parse_flag(line),
                flag3: FLAG_C.parse_flag(line),
                abundance1: F10[0].require_float(line)?,
                uncertainty1: F10[1].parse_float(line)?,
                abundance2: F10[2].parse_float(line)?,
                uncertainty2: F10[3].parse_float(line)?,
                abundance3: F10[4].parse_float(line)?,
                uncertainty3: F10[5].parse_float(line)?,
            })),
            "SELFI" => Ok(MiscRecord::Selfi(SelfiRecord {
                flag_temp: FLAG_A.parse_flag(line),
                flag_thick: FLAG_B.parse_flag(line),
                temperature: F10[0].require_float(line)?,
                temp_uncertainty: F10[1].parse_float(line)?,
                thickness: F10[2].require_float(line)?,
                thick_uncertainty: F10[3].parse_float(line)?,
            })),
            "EFFIC" => Ok(MiscRecord::Effic(EfficRecord {
                flag_capture: FLAG_A.parse_flag(line),
                flag_fission: FLAG_B.parse_flag(line),
                capture_efficiency: F10[0].require_float(line)?,
                fission_efficiency: F10[1].require_float(line)?,
                capture_uncertainty: F10[2].parse_float(line)?,
                fission_uncertainty: F10[3].parse_float(line)?,
            })),
            "DELTE" => Ok(MiscRecord::Delte(DelteRecord {
                flag_e1: FLAG_A.parse_flag(line),
                flag_e0: FLAG_B.parse_flag(line),
                flag_log: FLAG_C.parse_flag(line),
                dele1: F10[0].require_float(line)?,
                dd1: F10[1].parse_float(line)?,
                dele0: F10[2].parse_float(line)?,
                dd0: F10[3].parse_float(line)?,
                delel: F10[4].parse_float(line)?,
                ddl: F10[5].parse_float(line)?,
            })),
            "DRCAP" => Ok(MiscRecord::Drcap(DrcapRecord {
                flag: FLAG_A.parse_flag(line),
                nuclide: FixedField::new("nuclide", 8, 9).require_int(line)?,
                coefficient: F10[0].require_float(line)?,
                uncertainty: F10[1].parse_float(line)?,
            })),
            other => Err(CardError::InvalidCard(format!(
                "unknown miscellaneous record identifier: {other:?}"
            ))),
        }
    }

    pub fn to_lines(&self) -> Vec<String> {
        match self {
            MiscRecord::Delta(r) => vec![format!(
                "DELTA {} {} {}{}{}{}",
                r.l1_flag.value(),
                r.l0_flag.value(),
                format_float(Some(r.l1_coefficient), 10),
                format_float(r.l1_uncertainty, 10),
                format_float(Some(r.l0_constant), 10),
                format_float(r.l0_uncertainty, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Eta(r) => vec![format!(
                "ETA   {}   {}{}{}",
                r.flag.value(),
                format_float(Some(r.nu_value), 10),
                format_float(r.nu_uncertainty, 10),
                format_float(r.energy, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Finit(r) => vec![format!(
                "FINIT {} {} {}{}{}{}",
                r.flag_in.value(),
                r.flag_out.value(),
                format_float(Some(r.attn_in), 10),
                format_float(r.d_attn_in, 10),
                format_float(Some(r.attn_out), 10),
                format_float(r.d_attn_out, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Gamma(r) => vec![format!(
                "GAMMA{:>2}{:>2} {}{}",
                r.spin_group,
                r.flag.value(),
                format_float(Some(r.width), 10),
                format_float(r.uncertainty, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Tzero(r) => vec![format!(
                "TZERO {} {} {}{}{}{}{}",
                r.flag_t0.value(),
                r.flag_l0.value(),
                format_float(Some(r.t0), 10),
                format_float(r.t0_uncertainty, 10),
                format_float(Some(r.l0), 10),
                format_float(r.l0_uncertainty, 10),
                format_float(r.flight_path_length, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Siabn(r) => vec![format!(
                "SIABN {} {}{}{}{}{}{}{}{}",
                r.flag1.value(),
                r.flag2.value(),
                r.flag3.value(),
                format_float(Some(r.abundance1), 10),
                format_float(r.uncertainty1, 10),
                format_float(r.abundance2, 10),
                format_float(r.uncertainty2, 10),
                format_float(r.abundance3, 10),
                format_float(r.uncertainty3, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Selfi(r) => vec![format!(
                "SELFI {} {} {}{}{}{}",
                r.flag_temp.value(),
                r.flag_thick.value(),
                format_float(Some(r.temperature), 10),
                format_float(r.temp_uncertainty, 10),
                format_float(Some(r.thickness), 10),
                format_float(r.thick_uncertainty, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Effic(r) => vec![format!(
                "EFFIC {} {} {}{}{}{}",
                r.flag_capture.value(),
                r.flag_fission.value(),
                format_float(Some(r.capture_efficiency), 10),
                format_float(Some(r.fission_efficiency), 10),
                format_float(r.capture_uncertainty, 10),
                format_float(r.fission_uncertainty, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Delte(r) => vec![format!(
                "DELTE {} {}{}{}{}{}{}{}{}",
                r.flag_e1.value(),
                r.flag_e0.value(),
                r.flag_log.value(),
                format_float(Some(r.dele1), 10),
                format_float(r.dd1, 10),
                format_float(r.dele0, 10),
                format_float(r.dd0, 10),
                format_float(r.delel, 10),
                format_float(r.ddl, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Drcap(r) => vec![format!(
                "DRCAP {} {} {}{}",
                r.flag.value(),
                r.nuclide,
                format_float(Some(r.coefficient), 10),
                format_float(r.uncertainty, 10),
            )
            .trim_end()
            .to_string()],
            MiscRecord::Nonun(r) => r
                .points
                .iter()
                .map(|p| {
                    format!(
                        "NONUN{}{}{}{}",
                        " ".repeat(15),
                        format_float(Some(p.radius), 10),
                        format_float(Some(p.thickness), 10),
                        format_float(p.uncertainty, 10),
                    )
                    .trim_end()
                    .to_string()
                })
                .collect(),
        }
    }
}

/// Card set 11 container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MiscellaneousCard {
    pub records: Vec<MiscRecord>,
}

impl MiscellaneousCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "MISCE")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "miscellaneous card needs its header line".to_string(),
            ));
        }
        let content: Vec<&String> = lines[1..].iter().filter(|l| !l.trim().is_empty()).collect();
        let mut records = Vec::new();
        let mut idx = 0;
        while idx < content.len() {
            let id = IDENTIFIER.trimmed(content[idx]).to_ascii_uppercase();
            if id == "NONUN" {
                let mut points = Vec::new();
                while idx < content.len()
                    && IDENTIFIER.trimmed(content[idx]).eq_ignore_ascii_case("NONUN")
                {
                    let line = content[idx];
                    points.push(NonunPoint {
                        radius: FixedField::new("radius", 20, 30).require_float(line)?,
                        thickness: FixedField::new("thickness", 30, 40).require_float(line)?,
                        uncertainty: FixedField::new("thickness_uncertainty", 40, 50)
                            .parse_float(line)?,
                    });
                    idx += 1;
                }
                let record = NonunRecord { points };
                record.validate()?;
                records.push(MiscRecord::Nonun(record));
            } else {
                records.push(MiscRecord::from_line(content[idx])?);
                idx += 1;
            }
        }
        if records.is_empty() {
            return Err(CardError::InvalidCard(
                "miscellaneous card has no records".to_string(),
            ));
        }
        Ok(Self { records })
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        for record in &self.records {
            lines.extend(record.to_lines());
        }
        lines.push(String::new());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_parses_documented_layout() {
        let line = "DELTA 1 0 1.234E+00 2.345E-03 3.456E+00 4.567E-03".to_string();
        let parsed = MiscRecord::from_line(&line).unwrap();
        match parsed {
            MiscRecord::Delta(record) => {
                assert_eq!(record.l1_flag, VaryFlag::Yes);
                assert_eq!(record.l0_flag, VaryFlag::No);
                assert_eq!(record.l1_coefficient, 1.234);
                assert_eq!(record.l1_uncertainty, Some(2.345e-3));
                assert_eq!(record.l0_constant, 3.456);
                assert_eq!(record.l0_uncertainty, Some(4.567e-3));
            }
            other => panic!("expected a DELTA record, got {other:?}"),
        }
    }

    #[test]
    fn test_delta_emission_re_parses() {
        let record = MiscRecord::Delta(DeltaRecord {
            l1_flag: VaryFlag::Yes,
            l0_flag: VaryFlag::No,
            l1_coefficient: 1.234,
            l1_uncertainty: Some(2.345e-3),
            l0_constant: 3.456,
            l0_uncertainty: Some(4.567e-3),
        });
        let line = record.to_lines()[0].clone();
        assert_eq!(MiscRecord::from_line(&line).unwrap(), record);
    }

    #[test]
    fn test_card_round_trip() {
        let card = MiscellaneousCard {
            records: vec![
                MiscRecord::Delta(DeltaRecord {
                    l1_flag: VaryFlag::Yes,
                    l0_flag: VaryFlag::No,
                    l1_coefficient: 1.234,
                    l1_uncertainty: None,
                    l0_constant: 3.456,
                    l0_uncertainty: None,
                }),
                MiscRecord::Gamma(GammaRecord {
                    spin_group: 12,
                    flag: VaryFlag::Pup,
                    width: 0.5,
                    uncertainty: Some(0.025),
                }),
                MiscRecord::Nonun(NonunRecord {
                    points: vec![
                        NonunPoint {
                            radius: 0.0,
                            thickness: 0.25,
                            uncertainty: None,
                        },
                        NonunPoint {
                            radius: 1.5,
                            thickness: 0.125,
                            uncertainty: Some(0.0625),
                        },
                    ],
                }),
            ],
        };
        let parsed = MiscellaneousCard::from_lines(&card.to_lines()).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_nonun_needs_zero_center() {
        let lines = vec![
            HEADER.to_string(),
            format!("NONUN{}{}{}", " ".repeat(15), "1.000E+00 ", "2.500E-01"),
            format!("NONUN{}{}{}", " ".repeat(15), "2.000E+00 ", "1.250E-01"),
        ];
        let err = MiscellaneousCard::from_lines(&lines).unwrap_err();
        assert!(matches!(err, CardError::InvalidCard(_)));
    }
}
