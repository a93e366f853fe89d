/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Vary flags shared by every card family
//!
//! Each fitted quantity carries a small integer telling SAMMY whether to
//! hold it fixed, vary it, or treat it as a propagated-uncertainty
//! parameter. Cards accept different subsets of these values.

use serde::{Deserialize, Serialize};

/// How a parameter participates in the fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VaryFlag {
    /// Value is taken from other isotopes (-2)
    UseFromOthers,
    /// Value is taken from the parameter file (-1)
    UseFromParFile,
    /// Held fixed (0)
    #[default]
    No,
    /// Varied (1)
    Yes,
    /// Propagated-uncertainty parameter (3)
    Pup,
}

impl VaryFlag {
    /// Numeric value as written in the file
    pub fn value(self) -> i8 {
        match self {
            VaryFlag::UseFromOthers => -2,
            VaryFlag::UseFromParFile => -1,
            VaryFlag::No => 0,
            VaryFlag::Yes => 1,
            VaryFlag::Pup => 3,
        }
    }

    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            -2 => Some(VaryFlag::UseFromOthers),
            -1 => Some(VaryFlag::UseFromParFile),
            0 => Some(VaryFlag::No),
            1 => Some(VaryFlag::Yes),
            3 => Some(VaryFlag::Pup),
            _ => None,
        }
    }

    /// Flags accepted by most cards
    pub const FIXED_OR_VARIED: &'static [VaryFlag] =
        &[VaryFlag::No, VaryFlag::Yes, VaryFlag::Pup];

    /// Flags accepted where a value may also be copied from the file itself
    pub const WITH_PARFILE: &'static [VaryFlag] = &[
        VaryFlag::UseFromParFile,
        VaryFlag::No,
        VaryFlag::Yes,
        VaryFlag::Pup,
    ];
}

impl std::fmt::Display for VaryFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_round_trip() {
        for v in [-2i8, -1, 0, 1, 3] {
            let flag = VaryFlag::from_value(v).unwrap();
            assert_eq!(flag.value(), v);
        }
        assert!(VaryFlag::from_value(2).is_none());
    }

    #[test]
    fn test_display_writes_numeric_value() {
        assert_eq!(VaryFlag::Pup.to_string(), "3");
        assert_eq!(VaryFlag::UseFromParFile.to_string(), "-1");
    }
}
