/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Oak Ridge resolution function (card set 9)
//!
//! Sections keyed by a five-character identifier at the start of each line:
//! BURST (electron burst width), one moderator (WATER or TANTA), one
//! detector (LITHI or NE110), and any number of CHANN channel-width lines.
//! Lines that open with blank identifier columns continue the current
//! section (tantalum position/shape lines, NE110 cross-section points,
//! uncertainty lines).
//!
//! Uncertainty lines are written only when an uncertainty is actually
//! present, and are recognized on input by their blank first ten columns;
//! parameter continuation lines always carry a flag digit in columns 6-9.

use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER: &str = "ORRES";

pub const DEFAULT_WATR0: f64 = 3.614;
pub const DEFAULT_WATR1: f64 = -0.089;
pub const DEFAULT_WATR2: f64 = 0.037;
pub const DEFAULT_WATER_DOF: i32 = 4;
pub const DEFAULT_NE110_DENSITY: f64 = 0.0047;

const FLAG_1: FixedField = FixedField::new("flag", 6, 7);
const FLAG_2: FixedField = FixedField::new("flag2", 7, 8);
const FLAG_3: FixedField = FixedField::new("flag3", 8, 9);
const FLAG_4: FixedField = FixedField::new("flag4", 9, 10);
const VALUE_1: FixedField = FixedField::new("value1", 10, 20);
const VALUE_2: FixedField = FixedField::new("value2", 20, 30);
const VALUE_3: FixedField = FixedField::new("value3", 30, 40);
const VALUE_4: FixedField = FixedField::new("value4", 40, 50);
const NUM_POINTS: FixedField = FixedField::new("num_points", 7, 10);
const LEADING: FixedField = FixedField::new("leading_columns", 0, 10);

/// Electron burst width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSection {
    pub flag: VaryFlag,
    pub burst: f64,
    pub d_burst: Option<f64>,
}

/// Water moderator mean-free-path coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSection {
    pub flag_watr0: VaryFlag,
    pub flag_watr1: VaryFlag,
    pub flag_watr2: VaryFlag,
    pub dof: i32,
    pub watr0: f64,
    pub watr1: f64,
    pub watr2: f64,
    pub d_watr0: Option<f64>,
    pub d_watr1: Option<f64>,
    pub d_watr2: Option<f64>,
}

impl Default for WaterSection {
    fn default() -> Self {
        Self {
            flag_watr0: VaryFlag::No,
            flag_watr1: VaryFlag::No,
            flag_watr2: VaryFlag::No,
            dof: DEFAULT_WATER_DOF,
            watr0: DEFAULT_WATR0,
            watr1: DEFAULT_WATR1,
            watr2: DEFAULT_WATR2,
            d_watr0: None,
            d_watr1: None,
            d_watr2: None,
        }
    }
}

/// Tantalum target moderator: main width, four position terms, two shape
/// terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TantalumSection {
    pub flag_tanta: VaryFlag,
    pub tanta: f64,
    pub d_tanta: Option<f64>,
    pub flag_x1: VaryFlag,
    pub flag_x2: VaryFlag,
    pub flag_x3: VaryFlag,
    pub flag_x0: VaryFlag,
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
    pub x0: f64,
    pub d_x1: Option<f64>,
    pub d_x2: Option<f64>,
    pub d_x3: Option<f64>,
    pub d_x0: Option<f64>,
    pub flag_beta: VaryFlag,
    pub flag_alpha: VaryFlag,
    pub beta: f64,
    pub alpha: f64,
    pub d_beta: Option<f64>,
    pub d_alpha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Moderator {
    Water(WaterSection),
    Tantalum(TantalumSection),
}

/// Lithium glass detector timing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LithiumSection {
    pub flag_d: VaryFlag,
    pub flag_f: VaryFlag,
    pub flag_g: VaryFlag,
    pub d: f64,
    pub f: f64,
    pub g: f64,
    pub d_d: Option<f64>,
    pub d_f: Option<f64>,
    pub d_g: Option<f64>,
}

/// One energy/cross-section point of the NE110 table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionPoint {
    pub energy: f64,
    pub sigma: f64,
}

/// NE110 scintillator detector parameters with an optional tabulated
/// cross section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ne110Section {
    pub flag_delta: VaryFlag,
    pub delta: f64,
    pub d_delta: Option<f64>,
    pub density: f64,
    pub cross_sections: Vec<CrossSectionPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Detector {
    Lithium(LithiumSection),
    Ne110(Ne110Section),
}

/// One channel-width region, valid up to `max_energy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWidth {
    pub flag: VaryFlag,
    pub max_energy: f64,
    pub width: f64,
    pub uncertainty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrresCard {
    pub burst: Option<BurstSection>,
    pub moderator: Option<Moderator>,
    pub detector: Option<Detector>,
    pub channels: Vec<ChannelWidth>,
}

impl OrresCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "ORRES")
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        if lines.is_empty() || !Self::is_header_line(&lines[0]) {
            return Err(CardError::InvalidCard(
                "resolution card needs its ORRES header line".to_string(),
            ));
        }
        let content: Vec<&String> = lines[1..].iter().filter(|l| !l.trim().is_empty()).collect();

        let mut card = Self::default();
        let mut section: Vec<&String> = Vec::new();
        let mut keyword: Option<String> = None;
        for line in content {
            let id = line.get(..5).unwrap_or("").trim().to_ascii_uppercase();
            match id.as_str() {
                "CHANN" => {
                    card.flush_section(&keyword, &section)?;
                    keyword = None;
                    section.clear();
                    card.channels.push(ChannelWidth {
                        flag: FLAG_1.parse_flag(line),
                        max_energy: VALUE_1.require_float(line)?,
                        width: VALUE_2.require_float(line)?,
                        uncertainty: VALUE_3.parse_float(line)?,
                    });
                }
                "BURST" | "WATER" | "TANTA" | "LITHI" | "NE110" => {
                    card.flush_section(&keyword, &section)?;
                    keyword = Some(id);
                    section = vec![line];
                }
                _ => {
                    if keyword.is_none() {
                        return Err(CardError::InvalidCard(format!(
                            "resolution line outside any section: {line:?}"
                        )));
                    }
                    section.push(line);
                }
            }
        }
        card.flush_section(&keyword, &section)?;
        card.validate()?;
        Ok(card)
    }

    fn flush_section(&mut self, keyword: &Option<String>, section: &[&String]) -> Result<()> {
        let keyword = match keyword {
            Some(k) => k.as_str(),
            None => return Ok(()),
        };
        match keyword {
            "BURST" => {
                let line = section[0];
                self.burst = Some(BurstSection {
                    flag: FLAG_1.parse_flag(line),
                    burst: VALUE_1.require_float(line)?,
                    d_burst: VALUE_2.parse_float(line)?,
                });
            }
            "WATER" => {
                if self.set_moderator(Moderator::Water(parse_water(section)?)) {
                    return Err(CardError::InvalidCard(
                        "resolution card cannot carry both WATER and TANTA moderators"
                            .to_string(),
                    ));
                }
            }
            "TANTA" => {
                if self.set_moderator(Moderator::Tantalum(parse_tantalum(section)?)) {
                    return Err(CardError::InvalidCard(
                        "resolution card cannot carry both WATER and TANTA moderators"
                            .to_string(),
                    ));
                }
            }
            "LITHI" => {
                if self.set_detector(Detector::Lithium(parse_lithium(section)?)) {
                    return Err(CardError::InvalidCard(
                        "resolution card cannot carry both LITHI and NE110 detectors"
                            .to_string(),
                    ));
                }
            }
            "NE110" => {
                if self.set_detector(Detector::Ne110(parse_ne110(section)?)) {
                    return Err(CardError::InvalidCard(
                        "resolution card cannot carry both LITHI and NE110 detectors"
                            .to_string(),
                    ));
                }
            }
            _ => unreachable!("section keywords are filtered by the caller"),
        }
        Ok(())
    }

    fn set_moderator(&mut self, moderator: Moderator) -> bool {
        let conflict = self.moderator.is_some();
        self.moderator = Some(moderator);
        conflict
    }

    fn set_detector(&mut self, detector: Detector) -> bool {
        let conflict = self.detector.is_some();
        self.detector = Some(detector);
        conflict
    }

    fn validate(&self) -> Result<()> {
        for pair in self.channels.windows(2) {
            if pair[1].max_energy <= pair[0].max_energy {
                return Err(CardError::InvalidCard(
                    "channel-width energies must be strictly increasing".to_string(),
                ));
            }
        }
        if let Some(Detector::Ne110(ne110)) = &self.detector {
            for pair in ne110.cross_sections.windows(2) {
                if pair[1].energy <= pair[0].energy {
                    return Err(CardError::InvalidCard(
                        "NE110 cross-section energies must be strictly increasing".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        if let Some(burst) = &self.burst {
            lines.push(
                format!(
                    "BURST {}   {}{}",
                    burst.flag.value(),
                    format_float(Some(burst.burst), 10),
                    format_float(burst.d_burst, 10),
                )
                .trim_end()
                .to_string(),
            );
        }
        match &self.moderator {
            Some(Moderator::Water(water)) => emit_water(water, &mut lines),
            Some(Moderator::Tantalum(tantalum)) => emit_tantalum(tantalum, &mut lines),
            None => {}
        }
        match &self.detector {
            Some(Detector::Lithium(lithium)) => emit_lithium(lithium, &mut lines),
            Some(Detector::Ne110(ne110)) => emit_ne110(ne110, &mut lines),
            None => {}
        }
        for channel in &self.channels {
            lines.push(
                format!(
                    "CHANN {}   {}{}{}",
                    channel.flag.value(),
                    format_float(Some(channel.max_energy), 10),
                    format_float(Some(channel.width), 10),
                    format_float(channel.uncertainty, 10),
                )
                .trim_end()
                .to_string(),
            );
        }
        lines.push(String::new());
        lines
    }
}

fn parse_water(section: &[&String]) -> Result<WaterSection> {
    if section.len() > 2 {
        return Err(CardError::InvalidCard(
            "too many lines in WATER section".to_string(),
        ));
    }
    let line = section[0];
    let mut water = WaterSection {
        flag_watr0: FLAG_1.parse_flag(line),
        flag_watr1: FLAG_2.parse_flag(line),
        flag_watr2: FLAG_3.parse_flag(line),
        dof: FLAG_4.parse_int(line)?.unwrap_or(DEFAULT_WATER_DOF),
        watr0: VALUE_1.parse_float(line)?.unwrap_or(DEFAULT_WATR0),
        watr1: VALUE_2.parse_float(line)?.unwrap_or(DEFAULT_WATR1),
        watr2: VALUE_3.parse_float(line)?.unwrap_or(DEFAULT_WATR2),
        ..WaterSection::default()
    };
    if let Some(unc_line) = section.get(1) {
        water.d_watr0 = VALUE_1.parse_float(unc_line)?;
        water.d_watr1 = VALUE_2.parse_float(unc_line)?;
        water.d_watr2 = VALUE_3.parse_float(unc_line)?;
    }
    Ok(water)
}

fn emit_water(water: &WaterSection, lines: &mut Vec<String>) {
    lines.push(
        format!(
            "WATER {}{}{}{}{}{}{}",
            water.flag_watr0.value(),
            water.flag_watr1.value(),
            water.flag_watr2.value(),
            water.dof,
            format_float(Some(water.watr0), 10),
            format_float(Some(water.watr1), 10),
            format_float(Some(water.watr2), 10),
        )
        .trim_end()
        .to_string(),
    );
    if water.d_watr0.is_some() || water.d_watr1.is_some() || water.d_watr2.is_some() {
        lines.push(
            format!(
                "{}{}{}{}",
                " ".repeat(10),
                format_float(water.d_watr0, 10),
                format_float(water.d_watr1, 10),
                format_float(water.d_watr2, 10),
            )
            .trim_end()
            .to_string(),
        );
    }
}

fn parse_tantalum(section: &[&String]) -> Result<TantalumSection> {
    let main = section[0];
    // Continuation lines: flag lines carry digits in columns 6-9,
    // uncertainty lines are blank through column 10.
    let mut position: Option<&String> = None;
    let mut position_unc: Option<&String> = None;
    let mut shape: Option<&String> = None;
    let mut shape_unc: Option<&String> = None;
    for &line in &section[1..] {
        if LEADING.is_blank(line) {
            if shape.is_some() && shape_unc.is_none() {
                shape_unc = Some(line);
            } else if position.is_some() && position_unc.is_none() && shape.is_none() {
                position_unc = Some(line);
            } else {
                return Err(CardError::InvalidCard(
                    "unexpected uncertainty line in TANTA section".to_string(),
                ));
            }
        } else if position.is_none() {
            position = Some(line);
        } else if shape.is_none() {
            shape = Some(line);
        } else {
            return Err(CardError::InvalidCard(
                "too many parameter lines in TANTA section".to_string(),
            ));
        }
    }
    let position = position.ok_or_else(|| {
        CardError::InvalidCard("TANTA section is missing its position line".to_string())
    })?;
    let shape = shape.ok_or_else(|| {
        CardError::InvalidCard("TANTA section is missing its shape line".to_string())
    })?;

    let mut tantalum = TantalumSection {
        flag_tanta: FLAG_1.parse_flag(main),
        tanta: VALUE_1.require_float(main)?,
        d_tanta: VALUE_2.parse_float(main)?,
        flag_x1: FLAG_1.parse_flag(position),
        flag_x2: FLAG_2.parse_flag(position),
        flag_x3: FLAG_3.parse_flag(position),
        flag_x0: FLAG_4.parse_flag(position),
        x1: VALUE_1.require_float(position)?,
        x2: VALUE_2.require_float(position)?,
        x3: VALUE_3.require_float(position)?,
        x0: VALUE_4.require_float(position)?,
        d_x1: None,
        d_x2: None,
        d_x3: None,
        d_x0: None,
        flag_beta: FLAG_1.parse_flag(shape),
        flag_alpha: FLAG_2.parse_flag(shape),
        beta: VALUE_1.require_float(shape)?,
        alpha: VALUE_2.require_float(shape)?,
        d_beta: None,
        d_alpha: None,
    };
    if let Some(line) = position_unc {
        tantalum.d_x1 = VALUE_1.parse_float(line)?;
        tantalum.d_x2 = VALUE_2.parse_float(line)?;
        tantalum.d_x3 = VALUE_3.parse_float(line)?;
        tantalum.d_x0 = VALUE_4.parse_float(line)?;
    }
    if let Some(line) = shape_unc {
        tantalum.d_beta = VALUE_1.parse_float(line)?;
        tantalum.d_alpha = VALUE_2.parse_float(line)?;
    }
    Ok(tantalum)
}

fn emit_tantalum(tantalum: &TantalumSection, lines: &mut Vec<String>) {
    lines.push(
        format!(
            "TANTA {}   {}{}",
            tantalum.flag_tanta.value(),
            format_float(Some(tantalum.tanta), 10),
            format_float(tantalum.d_tanta, 10),
        )
        .trim_end()
        .to_string(),
    );
    lines.push(
        format!(
            "      {}{}{}{}{}{}{}{}",
            tantalum.flag_x1.value(),
            tantalum.flag_x2.value(),
            tantalum.flag_x3.value(),
            tantalum.flag_x0.value(),
            format_float(Some(tantalum.x1), 10),
            format_float(Some(tantalum.x2), 10),
            format_float(Some(tantalum.x3), 10),
            format_float(Some(tantalum.x0), 10),
        )
        .trim_end()
        .to_string(),
    );
    if [tantalum.d_x1, tantalum.d_x2, tantalum.d_x3, tantalum.d_x0]
        .iter()
        .any(Option::is_some)
    {
        lines.push(
            format!(
                "{}{}{}{}{}",
                " ".repeat(10),
                format_float(tantalum.d_x1, 10),
                format_float(tantalum.d_x2, 10),
                format_float(tantalum.d_x3, 10),
                format_float(tantalum.d_x0, 10),
            )
            .trim_end()
            .to_string(),
        );
    }
    lines.push(
        format!(
            "      {}{}  {}{}",
            tantalum.flag_beta.value(),
            tantalum.flag_alpha.value(),
            format_float(Some(tantalum.beta), 10),
            format_float(Some(tantalum.alpha), 10),
        )
        .trim_end()
        .to_string(),
    );
    if tantalum.d_beta.is_some() || tantalum.d_alpha.is_some() {
        lines.push(
            format!(
                "{}{}{}",
                " ".repeat(10),
                format_float(tantalum.d_beta, 10),
                format_float(tantalum.d_alpha, 10),
            )
            .trim_end()
            .to_string(),
        );
    }
}

fn parse_lithium(section: &[&String]) -> Result<LithiumSection> {
    if section.len() > 2 {
        return Err(CardError::InvalidCard(
            "too many lines in LITHI section".to_string(),
        ));
    }
    let line = section[0];
    let mut lithium = LithiumSection {
        flag_d: FLAG_1.parse_flag(line),
        flag_f: FLAG_2.parse_flag(line),
        flag_g: FLAG_3.parse_flag(line),
        d: VALUE_1.require_float(line)?,
        f: VALUE_2.require_float(line)?,
        g: VALUE_3.require_float(line)?,
        d_d: None,
        d_f: None,
        d_g: None,
    };
    if let Some(unc_line) = section.get(1) {
        lithium.d_d = VALUE_1.parse_float(unc_line)?;
        lithium.d_f = VALUE_2.parse_float(unc_line)?;
        lithium.d_g = VALUE_3.parse_float(unc_line)?;
    }
    Ok(lithium)
}

fn emit_lithium(lithium: &LithiumSection, lines: &mut Vec<String>) {
    lines.push(
        format!(
            "LITHI {}{}{} {}{}{}",
            lithium.flag_d.value(),
            lithium.flag_f.value(),
            lithium.flag_g.value(),
            format_float(Some(lithium.d), 10),
            format_float(Some(lithium.f), 10),
            format_float(Some(lithium.g), 10),
        )
        .trim_end()
        .to_string(),
    );
    if lithium.d_d.is_some() || lithium.d_f.is_some() || lithium.d_g.is_some() {
        lines.push(
            format!(
                "{}{}{}{}",
                " ".repeat(10),
                format_float(lithium.d_d, 10),
                format_float(lithium.d_f, 10),
                format_float(lithium.d_g, 10),
            )
            .trim_end()
            .to_string(),
        );
    }
}

fn parse_ne110(section: &[&String]) -> Result<Ne110Section> {
    let main = section[0];
    let num_points = NUM_POINTS.parse_int(main)?.unwrap_or(0);
    let mut ne110 = Ne110Section {
        flag_delta: FLAG_1.parse_flag(main),
        delta: VALUE_1.require_float(main)?,
        d_delta: VALUE_2.parse_float(main)?,
        density: VALUE_3.parse_float(main)?.unwrap_or(DEFAULT_NE110_DENSITY),
        cross_sections: Vec::new(),
    };
    for line in &section[1..] {
        ne110.cross_sections.push(CrossSectionPoint {
            energy: VALUE_1.require_float(line)?,
            sigma: VALUE_2.require_float(line)?,
        });
    }
    if num_points as usize != ne110.cross_sections.len() {
        return Err(CardError::InvalidCard(format!(
            "NE110 declares {} cross-section points but {} lines follow",
            num_points,
            ne110.cross_sections.len()
        )));
    }
    Ok(ne110)
}

fn emit_ne110(ne110: &Ne110Section, lines: &mut Vec<String>) {
    lines.push(
        format!(
            "NE110 {}{:>3}{}{}{}",
            ne110.flag_delta.value(),
            ne110.cross_sections.len(),
            format_float(Some(ne110.delta), 10),
            format_float(ne110.d_delta, 10),
            format_float(Some(ne110.density), 10),
        )
        .trim_end()
        .to_string(),
    );
    for point in &ne110.cross_sections {
        lines.push(
            format!(
                "{}{}{}",
                " ".repeat(10),
                format_float(Some(point.energy), 10),
                format_float(Some(point.sigma), 10),
            )
            .trim_end()
            .to_string(),
        );
    }
}
