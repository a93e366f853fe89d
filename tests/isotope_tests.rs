use sammy_par_rs::cards::errors::CardError;
use sammy_par_rs::cards::isotope::{IsotopeCard, IsotopeEntry, HEADER, HEADER_NUCLIDE};
use sammy_par_rs::cards::VaryFlag;

fn lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.to_string()).collect()
}

#[test]
fn standard_layout_parses_handwritten_card() {
    let text = format!(
        "{HEADER}\n1.6000E+019.9800E-012.0000E-05 1 1 2 3\n1.7000E+012.0000E-03           0 4"
    );
    let card = IsotopeCard::from_lines(&lines(&text)).unwrap();
    assert!(!card.extended);
    assert_eq!(card.isotopes.len(), 2);
    assert_eq!(card.isotopes[0].mass, 16.0);
    assert_eq!(card.isotopes[0].abundance, 0.998);
    assert_eq!(card.isotopes[0].uncertainty, Some(2.0e-5));
    assert_eq!(card.isotopes[0].flag, VaryFlag::Yes);
    assert_eq!(card.isotopes[0].spin_groups, vec![1, 2, 3]);
    assert_eq!(card.isotopes[1].spin_groups, vec![4]);
}

#[test]
fn nuclide_header_is_accepted() {
    let text = format!("{HEADER_NUCLIDE}\n1.6000E+015.0000E-01           0 1");
    let card = IsotopeCard::from_lines(&lines(&text)).unwrap();
    assert_eq!(card.isotopes.len(), 1);
}

#[test]
fn adjacent_two_digit_groups_stay_standard() {
    // Groups 12 and 13 pack together as "1213"; the flag column, not the
    // token magnitude, decides the layout.
    let text = format!("{HEADER}\n1.8100E+021.0000E+00           01213");
    let card = IsotopeCard::from_lines(&lines(&text)).unwrap();
    assert!(!card.extended);
    assert_eq!(card.isotopes[0].spin_groups, vec![12, 13]);
}

#[test]
fn extended_layout_round_trips_three_digit_groups() {
    let card = IsotopeCard {
        isotopes: vec![IsotopeEntry {
            mass: 238.05,
            abundance: 0.9927,
            uncertainty: None,
            flag: VaryFlag::Yes,
            spin_groups: (98..=112).collect(),
        }],
        extended: true,
    };
    let emitted = card.to_lines();
    assert!(emitted[1].ends_with("   -1"));
    let parsed = IsotopeCard::from_lines(&emitted).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn negative_mass_is_rejected() {
    let text = format!("{HEADER}\n-1.600E+015.0000E-01           0 1");
    assert!(matches!(
        IsotopeCard::from_lines(&lines(&text)),
        Err(CardError::InvalidCard(_))
    ));
}

#[test]
fn spin_group_zero_is_rejected() {
    let text = format!("{HEADER}\n1.6000E+015.0000E-01           0 0 1");
    assert!(IsotopeCard::from_lines(&lines(&text)).is_err());
}

#[test]
fn dangling_continuation_marker_is_rejected() {
    let mut full: Vec<i32> = (1..=24).collect();
    full.push(25);
    let card = IsotopeCard {
        isotopes: vec![IsotopeEntry {
            mass: 16.0,
            abundance: 0.5,
            uncertainty: None,
            flag: VaryFlag::No,
            spin_groups: full,
        }],
        extended: false,
    };
    let mut emitted = card.to_lines();
    // Drop the continuation line the marker promises.
    emitted.remove(2);
    assert!(IsotopeCard::from_lines(&emitted).is_err());
}
