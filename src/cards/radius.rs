/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Channel radii (card set 7 / 7a)
//!
//! Three layouts share this family. The default fixed format packs
//! two-column spin-group numbers from column 24; the alternate fixed format
//! widens every integer to five columns for group numbers above 99; the
//! key-word format spells everything out as `key = values` lines.
//!
//! In both fixed formats the group number stream uses sentinels: `-1` at the
//! end of a full line means the stream continues on the next line, and `0`
//! switches the stream from spin groups to channel numbers. Continuation
//! lines written by this codec start at the group column so that emitted
//! cards re-parse identically; lines continuing at column 0 are accepted on
//! input.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cards::errors::{CardError, Result};
use crate::cards::field::{format_float, FixedField};
use crate::cards::flags::VaryFlag;
use crate::cards::header_matches;

pub const HEADER_FIXED: &str = "RADIUs parameters follow";
pub const HEADER_KEYWORD: &str = "RADII are in KEY-WORD format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadiusFormat {
    Default,
    Alternate,
    Keyword,
}

/// Orbital momentum selector used by the key-word format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orbital {
    Odd,
    Even,
    All,
    L(i32),
}

impl Orbital {
    fn parse(text: &str) -> Result<Self> {
        match text.to_ascii_lowercase().as_str() {
            "odd" => Ok(Orbital::Odd),
            "even" => Ok(Orbital::Even),
            "all" => Ok(Orbital::All),
            other => other
                .parse::<i32>()
                .map(Orbital::L)
                .map_err(|_| CardError::MalformedField {
                    field: "orbital_momentum",
                    text: text.to_string(),
                }),
        }
    }
}

impl std::fmt::Display for Orbital {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orbital::Odd => write!(f, "odd"),
            Orbital::Even => write!(f, "even"),
            Orbital::All => write!(f, "all"),
            Orbital::L(l) => write!(f, "{l}"),
        }
    }
}

/// One radius assignment: the radii, their vary flags, and the spin groups
/// (optionally restricted to particular channels) they apply to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusParameters {
    pub effective_radius: f64,
    pub true_radius: f64,
    pub vary_effective: VaryFlag,
    pub vary_true: VaryFlag,
    pub spin_groups: Vec<i32>,
    pub channels: Option<Vec<i32>>,
}

impl RadiusParameters {
    pub fn validate(&self) -> Result<()> {
        if self.spin_groups.is_empty() {
            return Err(CardError::InconsistentRadius(
                "no spin groups assigned".to_string(),
            ));
        }
        if self.spin_groups.iter().any(|&g| g <= 0) {
            return Err(CardError::InconsistentRadius(
                "spin group numbers must be positive".to_string(),
            ));
        }
        if self.effective_radius < 0.0 {
            return Err(CardError::InconsistentRadius(
                "effective radius must be non-negative".to_string(),
            ));
        }
        if let Some(&g) = self.spin_groups.iter().find(|&&g| g > 500) {
            warn!("spin group {g} is above 500; SAMMY treats it as an omitted-resonance group");
        }
        if self.vary_true == VaryFlag::UseFromParFile {
            if self.true_radius <= 0.0 {
                return Err(CardError::InconsistentRadius(
                    "true radius must be positive when copied from the file".to_string(),
                ));
            }
            if self.true_radius != self.effective_radius {
                return Err(CardError::InconsistentRadius(
                    "true radius must equal effective radius when copied from the file"
                        .to_string(),
                ));
            }
        }
        if let Some(channels) = &self.channels {
            if channels.is_empty() {
                return Err(CardError::InconsistentRadius(
                    "channel list present but empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

struct FixedLayout {
    pareff: FixedField,
    partru: FixedField,
    ichan: FixedField,
    ifleff: FixedField,
    ifltru: FixedField,
    group_start: usize,
    group_width: usize,
    groups_per_line: usize,
}

const DEFAULT_LAYOUT: FixedLayout = FixedLayout {
    pareff: FixedField::new("effective_radius", 0, 10),
    partru: FixedField::new("true_radius", 10, 20),
    ichan: FixedField::new("ichan", 20, 21),
    ifleff: FixedField::new("vary_effective", 21, 22),
    ifltru: FixedField::new("vary_true", 22, 24),
    group_start: 24,
    group_width: 2,
    groups_per_line: 28,
};

const ALTERNATE_LAYOUT: FixedLayout = FixedLayout {
    pareff: FixedField::new("effective_radius", 0, 10),
    partru: FixedField::new("true_radius", 10, 20),
    ichan: FixedField::new("ichan", 20, 25),
    ifleff: FixedField::new("vary_effective", 25, 30),
    ifltru: FixedField::new("vary_true", 30, 35),
    group_start: 35,
    group_width: 5,
    groups_per_line: 9,
};

/// Channel radii card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusCard {
    pub format: RadiusFormat,
    pub parameters: Vec<RadiusParameters>,
    // Key-word-only extras
    pub particle_pair: Option<String>,
    pub orbital_momentum: Option<Vec<Orbital>>,
    pub relative_uncertainty: Option<f64>,
    pub absolute_uncertainty: Option<f64>,
}

impl RadiusCard {
    pub fn is_header_line(line: &str) -> bool {
        header_matches(line, "RADIU") || header_matches(line, "RADII")
    }

    /// Pick the layout from the header and the first content line. The
    /// fixed formats share a header; they are told apart by the integer
    /// columns, which the default format fills from column 21 and the
    /// alternate format leaves blank until column 24.
    pub fn detect_format(lines: &[String]) -> Result<RadiusFormat> {
        let header = lines.first().ok_or_else(|| {
            CardError::FormatDetectionAmbiguous("radius card is empty".to_string())
        })?;
        if header.to_ascii_uppercase().contains("KEY-WORD") {
            return Ok(RadiusFormat::Keyword);
        }
        if !header_matches(header, "RADIU") {
            return Err(CardError::InvalidCard(format!(
                "not a radius header: {header:?}"
            )));
        }
        let content = lines
            .iter()
            .skip(1)
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| {
                CardError::FormatDetectionAmbiguous(
                    "radius card has no content line".to_string(),
                )
            })?;
        let tight = FixedField::new("format_probe", 21, 24);
        let wide = FixedField::new("format_probe", 25, 30);
        if !tight.is_blank(content) {
            Ok(RadiusFormat::Default)
        } else if content.len() >= 35 && !wide.is_blank(content) {
            Ok(RadiusFormat::Alternate)
        } else {
            Ok(RadiusFormat::Default)
        }
    }

    pub fn from_lines(lines: &[String]) -> Result<Self> {
        let format = Self::detect_format(lines)?;
        match format {
            RadiusFormat::Keyword => Self::from_keyword_lines(lines),
            RadiusFormat::Default => Self::from_fixed_lines(lines, format, &DEFAULT_LAYOUT),
            RadiusFormat::Alternate => Self::from_fixed_lines(lines, format, &ALTERNATE_LAYOUT),
        }
    }

    fn from_fixed_lines(
        lines: &[String],
        format: RadiusFormat,
        layout: &FixedLayout,
    ) -> Result<Self> {
        let body: Vec<&String> = lines[1..].iter().filter(|l| !l.trim().is_empty()).collect();
        let mut parameters = Vec::new();
        let mut idx = 0;
        while idx < body.len() {
            let (entry, consumed) = parse_fixed_entry(&body[idx..], layout)?;
            entry.validate()?;
            parameters.push(entry);
            idx += consumed;
        }
        if parameters.is_empty() {
            return Err(CardError::InvalidCard(
                "radius card has no parameter lines".to_string(),
            ));
        }
        Ok(Self {
            format,
            parameters,
            particle_pair: None,
            orbital_momentum: None,
            relative_uncertainty: None,
            absolute_uncertainty: None,
        })
    }

    fn from_keyword_lines(lines: &[String]) -> Result<Self> {
        let mut effective = None;
        let mut true_radius = None;
        let mut vary_effective = VaryFlag::No;
        let mut vary_true = VaryFlag::No;
        let mut spin_groups: Vec<i32> = Vec::new();
        let mut channels: Vec<i32> = Vec::new();
        let mut particle_pair = None;
        let mut orbital_momentum: Option<Vec<Orbital>> = None;
        let mut relative_uncertainty = None;
        let mut absolute_uncertainty = None;

        for line in lines[1..].iter().filter(|l| !l.trim().is_empty()) {
            let (key, rest) = line.split_once('=').ok_or_else(|| {
                CardError::InvalidCard(format!("key-word radius line without '=': {line:?}"))
            })?;
            let key = key.trim().to_ascii_lowercase();
            // A group line may carry its own channel list after a second '='.
            let (value_text, channel_text) = match rest.to_ascii_lowercase().find("channel") {
                Some(pos) if key.starts_with("group") => {
                    let (v, c) = rest.split_at(pos);
                    let c = c.split_once('=').map(|(_, t)| t).unwrap_or("");
                    (v.to_string(), Some(c.to_string()))
                }
                _ => (rest.to_string(), None),
            };
            let values: Vec<&str> = value_text
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .collect();

            match key.as_str() {
                "radius" | "radii" => {
                    let parsed = parse_keyword_floats("radius", &values)?;
                    effective = parsed.first().copied();
                    true_radius = parsed.get(1).copied().or(effective);
                }
                "flags" | "flag" => {
                    let parsed = parse_keyword_flags(&values)?;
                    vary_effective = parsed.first().copied().unwrap_or(VaryFlag::No);
                    vary_true = parsed.get(1).copied().unwrap_or(vary_effective);
                }
                "relative" => {
                    relative_uncertainty =
                        parse_keyword_floats("relative_uncertainty", &values)?.first().copied();
                }
                "absolute" => {
                    absolute_uncertainty =
                        parse_keyword_floats("absolute_uncertainty", &values)?.first().copied();
                }
                "particle-pair" | "pp" => {
                    particle_pair = values.first().map(|s| s.to_string());
                }
                "orbital" | "l" => {
                    let parsed = values
                        .iter()
                        .map(|v| Orbital::parse(v))
                        .collect::<Result<Vec<_>>>()?;
                    orbital_momentum = Some(parsed);
                }
                k if k.starts_with("group") => {
                    spin_groups.extend(parse_keyword_ints("spin_group", &values)?);
                    if let Some(text) = channel_text {
                        let parts: Vec<&str> = text
                            .split(|c: char| c.is_whitespace() || c == ',')
                            .filter(|t| !t.is_empty())
                            .collect();
                        channels.extend(parse_keyword_ints("channel", &parts)?);
                    }
                }
                other => {
                    return Err(CardError::InvalidCard(format!(
                        "unknown key-word radius key: {other:?}"
                    )))
                }
            }
        }

        let effective = effective.ok_or(CardError::MissingRequiredField {
            field: "effective_radius",
        })?;
        let true_radius = true_radius.ok_or(CardError::MissingRequiredField {
            field: "true_radius",
        })?;
        if spin_groups.is_empty() && (particle_pair.is_none() || orbital_momentum.is_none()) {
            return Err(CardError::InconsistentRadius(
                "key-word radius needs spin groups or a particle-pair with orbital momentum"
                    .to_string(),
            ));
        }

        let parameters = RadiusParameters {
            effective_radius: effective,
            true_radius,
            vary_effective,
            vary_true,
            spin_groups,
            channels: if channels.is_empty() {
                None
            } else {
                Some(channels)
            },
        };
        if !parameters.spin_groups.is_empty() {
            parameters.validate()?;
        }
        Ok(Self {
            format: RadiusFormat::Keyword,
            parameters: vec![parameters],
            particle_pair,
            orbital_momentum,
            relative_uncertainty,
            absolute_uncertainty,
        })
    }

    pub fn to_lines(&self) -> Vec<String> {
        match self.format {
            RadiusFormat::Default => self.to_fixed_lines(&DEFAULT_LAYOUT),
            RadiusFormat::Alternate => self.to_fixed_lines(&ALTERNATE_LAYOUT),
            RadiusFormat::Keyword => self.to_keyword_lines(),
        }
    }

    fn to_fixed_lines(&self, layout: &FixedLayout) -> Vec<String> {
        let mut lines = vec![HEADER_FIXED.to_string()];
        for entry in &self.parameters {
            let mut stream: Vec<i32> = entry.spin_groups.clone();
            if let Some(channels) = &entry.channels {
                stream.push(0);
                stream.extend(channels);
            }
            let ichan = i32::from(entry.channels.is_some());

            let int_width = layout.ichan.end - layout.ichan.start;
            let mut line = format!(
                "{}{}{:>iw$}{:>iw$}{:>fw$}",
                format_float(Some(entry.effective_radius), 10),
                format_float(Some(entry.true_radius), 10),
                ichan,
                entry.vary_effective.value(),
                entry.vary_true.value(),
                iw = int_width,
                fw = layout.group_start - layout.ifltru.start,
            );
            let chunks: Vec<&[i32]> = stream.chunks(layout.groups_per_line).collect();
            if chunks.is_empty() {
                lines.push(line.clone());
            }
            for (i, chunk) in chunks.iter().enumerate() {
                if i > 0 {
                    line = " ".repeat(layout.group_start);
                }
                for value in *chunk {
                    line.push_str(&format!("{:>1$}", value, layout.group_width));
                }
                if i + 1 < chunks.len() {
                    line.push_str(&format!("{:>1$}", -1, layout.group_width));
                }
                lines.push(line.clone());
            }
        }
        lines.push(String::new());
        lines
    }

    fn to_keyword_lines(&self) -> Vec<String> {
        let mut lines = vec![HEADER_KEYWORD.to_string()];
        for entry in &self.parameters {
            if entry.true_radius == entry.effective_radius {
                lines.push(format!("Radius = {}", entry.effective_radius));
            } else {
                lines.push(format!(
                    "Radius = {} {}",
                    entry.effective_radius, entry.true_radius
                ));
            }
            lines.push(format!(
                "Flags = {} {}",
                entry.vary_effective.value(),
                entry.vary_true.value()
            ));
            if let Some(unc) = self.relative_uncertainty {
                lines.push(format!("Relative = {unc}"));
            }
            if let Some(unc) = self.absolute_uncertainty {
                lines.push(format!("Absolute = {unc}"));
            }
            if let Some(pp) = &self.particle_pair {
                lines.push(format!("Particle-pair = {pp}"));
            }
            if let Some(orbitals) = &self.orbital_momentum {
                let texts: Vec<String> = orbitals.iter().map(|o| o.to_string()).collect();
                lines.push(format!("Orbital = {}", texts.join(" ")));
            }
            if !entry.spin_groups.is_empty() {
                let groups: Vec<String> =
                    entry.spin_groups.iter().map(|g| g.to_string()).collect();
                match &entry.channels {
                    Some(channels) => {
                        let texts: Vec<String> =
                            channels.iter().map(|c| c.to_string()).collect();
                        lines.push(format!(
                            "Group = {} Channels = {}",
                            groups.join(" "),
                            texts.join(" ")
                        ));
                    }
                    None => lines.push(format!("Group = {}", groups.join(" "))),
                }
            }
        }
        lines.push(String::new());
        lines
    }
}

/// Parse one fixed-format entry starting at `body[0]`, returning it and the
/// number of lines consumed.
fn parse_fixed_entry(
    body: &[&String],
    layout: &FixedLayout,
) -> Result<(RadiusParameters, usize)> {
    let main = body[0];
    let mut stream = read_int_slots(main, layout.group_start, layout.group_width)?;
    let mut consumed = 1;
    while stream.last() == Some(&-1) {
        stream.pop();
        let next = body.get(consumed).ok_or_else(|| {
            CardError::InvalidCard(
                "radius continuation marker with no following line".to_string(),
            )
        })?;
        let prefix = FixedField::new("continuation_prefix", 0, layout.group_start);
        let start = if prefix.is_blank(next) {
            layout.group_start
        } else {
            0
        };
        stream.extend(read_int_slots(next, start, layout.group_width)?);
        consumed += 1;
    }

    let mut spin_groups = Vec::new();
    let mut channels: Option<Vec<i32>> = None;
    for value in stream {
        match &mut channels {
            None if value == 0 => channels = Some(Vec::new()),
            None => spin_groups.push(value),
            Some(list) => list.push(value),
        }
    }

    let ichan = layout.ichan.parse_int(main)?.unwrap_or(0);
    if (ichan == 1) != channels.is_some() {
        return Err(CardError::InconsistentRadius(
            "channel-mode column disagrees with the channel list".to_string(),
        ));
    }

    let entry = RadiusParameters {
        effective_radius: layout.pareff.require_float(main)?,
        true_radius: layout.partru.require_float(main)?,
        vary_effective: layout.ifleff.parse_flag(main),
        vary_true: layout.ifltru.parse_flag_in(main, VaryFlag::WITH_PARFILE)?,
        spin_groups,
        channels,
    };
    Ok((entry, consumed))
}

fn read_int_slots(line: &str, start: usize, width: usize) -> Result<Vec<i32>> {
    let mut values = Vec::new();
    let mut pos = start;
    while pos < line.len() {
        let slot = FixedField::new("spin_group", pos, pos + width);
        match slot.parse_int(line)? {
            Some(value) => values.push(value),
            None => break,
        }
        pos += width;
    }
    Ok(values)
}

fn parse_keyword_floats(field: &'static str, values: &[&str]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            crate::cards::field::parse_float_text(v).ok_or_else(|| CardError::MalformedField {
                field,
                text: v.to_string(),
            })
        })
        .collect()
}

fn parse_keyword_ints(field: &'static str, values: &[&str]) -> Result<Vec<i32>> {
    values
        .iter()
        .map(|v| {
            v.parse::<i32>().map_err(|_| CardError::MalformedField {
                field,
                text: v.to_string(),
            })
        })
        .collect()
}

fn parse_keyword_flags(values: &[&str]) -> Result<Vec<VaryFlag>> {
    values
        .iter()
        .map(|v| {
            v.parse::<i8>()
                .ok()
                .and_then(VaryFlag::from_value)
                .ok_or_else(|| CardError::InvalidFlagValue {
                    field: "radius_flags",
                    value: v.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_card(groups: Vec<i32>) -> RadiusCard {
        RadiusCard {
            format: RadiusFormat::Default,
            parameters: vec![RadiusParameters {
                effective_radius: 3.2,
                true_radius: 3.2,
                vary_effective: VaryFlag::Yes,
                vary_true: VaryFlag::UseFromParFile,
                spin_groups: groups,
                channels: None,
            }],
            particle_pair: None,
            orbital_momentum: None,
            relative_uncertainty: None,
            absolute_uncertainty: None,
        }
    }

    #[test]
    fn test_default_line_layout() {
        let lines = default_card(vec![1, 2, 3]).to_lines();
        let content = &lines[1];
        assert_eq!(&content[0..10], "3.2000E+00");
        assert_eq!(&content[10..20], "3.2000E+00");
        assert_eq!(&content[20..21], "0");
        assert_eq!(&content[21..22], "1");
        assert_eq!(&content[22..24], "-1");
        assert_eq!(&content[24..26], " 1");
        assert_eq!(&content[26..28], " 2");
        assert_eq!(&content[28..30], " 3");
    }

    #[test]
    fn test_default_round_trip_with_continuation() {
        let card = default_card((1..=30).collect());
        let lines = card.to_lines();
        // 28 groups fit the first line; the marker pushes 29 and 30 onward
        assert!(lines[1].ends_with("-1"));
        assert_eq!(lines[1].len(), 82);
        let parsed = RadiusCard::from_lines(&lines).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_channel_switch_round_trip() {
        let mut card = default_card(vec![4, 5]);
        card.parameters[0].channels = Some(vec![1, 2]);
        let parsed = RadiusCard::from_lines(&card.to_lines()).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_detection_is_idempotent() {
        for card in [
            default_card((1..=40).collect()),
            RadiusCard {
                format: RadiusFormat::Alternate,
                ..default_card(vec![101, 102])
            },
        ] {
            let lines = card.to_lines();
            assert_eq!(RadiusCard::detect_format(&lines).unwrap(), card.format);
        }
    }

    #[test]
    fn test_blank_flag_columns_read_as_no() {
        let lines = vec![
            HEADER_FIXED.to_string(),
            "3.2000E+003.2000E+000    1 2 3".to_string(),
        ];
        let card = RadiusCard::from_lines(&lines).unwrap();
        let entry = &card.parameters[0];
        assert_eq!(entry.vary_effective, VaryFlag::No);
        assert_eq!(entry.vary_true, VaryFlag::No);
        assert_eq!(entry.spin_groups, vec![1, 2, 3]);
    }

    #[test]
    fn test_group_numbers_above_500_still_parse() {
        let card = RadiusCard {
            format: RadiusFormat::Alternate,
            ..default_card(vec![499, 501])
        };
        let parsed = RadiusCard::from_lines(&card.to_lines()).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_negative_effective_radius_is_rejected() {
        let mut card = default_card(vec![1]);
        card.parameters[0].effective_radius = -3.2;
        card.parameters[0].true_radius = 3.2;
        card.parameters[0].vary_true = VaryFlag::Yes;
        let err = RadiusCard::from_lines(&card.to_lines()).unwrap_err();
        assert!(matches!(err, CardError::InconsistentRadius(_)));
    }

    #[test]
    fn test_parfile_flag_needs_matching_radii() {
        let mut card = default_card(vec![1]);
        card.parameters[0].true_radius = 2.0;
        let err = RadiusCard::from_lines(&card.to_lines()).unwrap_err();
        assert!(matches!(err, CardError::InconsistentRadius(_)));
    }

    #[test]
    fn test_keyword_round_trip() {
        let card = RadiusCard {
            format: RadiusFormat::Keyword,
            parameters: vec![RadiusParameters {
                effective_radius: 3.5,
                true_radius: 3.5,
                vary_effective: VaryFlag::Yes,
                vary_true: VaryFlag::Yes,
                spin_groups: vec![1, 2],
                channels: Some(vec![1, 3]),
            }],
            particle_pair: Some("n+181Ta".to_string()),
            orbital_momentum: Some(vec![Orbital::Odd]),
            relative_uncertainty: Some(0.05),
            absolute_uncertainty: None,
        };
        let lines = card.to_lines();
        assert_eq!(RadiusCard::detect_format(&lines).unwrap(), RadiusFormat::Keyword);
        let parsed = RadiusCard::from_lines(&lines).unwrap();
        assert_eq!(parsed, card);
    }
}
