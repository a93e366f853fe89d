use rstest::rstest;
use sammy_par_rs::cards::broadening::BroadeningCard;
use sammy_par_rs::cards::data_reduction::{DataReductionCard, DataReductionParameter};
use sammy_par_rs::cards::external_r::{ExternalR3Entry, ExternalR3aEntry, ExternalRCard};
use sammy_par_rs::cards::normalization::NormalizationCard;
use sammy_par_rs::cards::unused_var::{UnusedCorrelatedCard, UnusedVariable};
use sammy_par_rs::cards::user_resolution::{UserBurst, UserChannel, UserResolutionCard};
use sammy_par_rs::cards::VaryFlag;

fn lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.to_string()).collect()
}

#[test]
fn broadening_documented_line_parses() {
    let card = BroadeningCard::from_lines(&lines(
        "BROADening parameters may be varied\n\
         1.234E+00 2.980E+02 1.500E-01 2.500E-02 1.000E+00 5.000E-01  1 0 1 0 1 0",
    ))
    .unwrap();
    assert_eq!(card.crfn, 1.234);
    assert_eq!(card.temp, 298.0);
    assert_eq!(card.thick, 0.15);
    assert_eq!(card.flag_crfn, VaryFlag::Yes);
    assert_eq!(card.flag_temp, VaryFlag::No);
    assert_eq!(card.flag_deltag, VaryFlag::Yes);
    assert!(card.gaussian.is_none());
}

#[test]
fn broadening_uncertainty_line_round_trips() {
    let mut card = BroadeningCard::from_lines(&lines(
        "BROADening parameters may be varied\n\
         2.500E-01 2.980E+02 1.250E-01 2.500E-02 1.000E+00 5.000E-01  1 0 1 0 1 0",
    ))
    .unwrap();
    card.d_crfn = Some(0.03125);
    card.d_temp = Some(2.0);
    let parsed = BroadeningCard::from_lines(&card.to_lines()).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn broadening_main_line_keeps_its_columns() {
    let card = BroadeningCard::from_lines(&lines(
        "BROADening parameters may be varied\n\
         2.500E-01 2.980E+02 1.250E-01 2.500E-02 1.000E+00 5.000E-01  1 0 1 0 1 0",
    ))
    .unwrap();
    let emitted = card.to_lines();
    // Values occupy columns 0-60, flags sit inside the two-column fields
    // starting at 60.
    assert_eq!(&emitted[1][0..9], "2.500E-01");
    assert_eq!(&emitted[1][10..19], "2.980E+02");
    assert_eq!(&emitted[1][60..62], " 1");
    assert_eq!(&emitted[1][62..64], " 0");
}

#[test]
fn normalization_two_angle_sets_with_uncertainties() {
    let text = format!(
        "NORMAlization and background are next\n\
         1.250E+00 5.000E-01{}1 0 0 0 0 0\n\
         3.125E-02\n\
         2.500E+00{}0 0 0 0 0 1",
        " ".repeat(42),
        " ".repeat(52),
    );
    let card = NormalizationCard::from_lines(&lines(&text)).unwrap();
    assert_eq!(card.angle_sets.len(), 2);
    assert_eq!(card.angle_sets[0].anorm, 1.25);
    assert_eq!(card.angle_sets[0].d_anorm, Some(0.03125));
    assert_eq!(card.angle_sets[1].anorm, 2.5);
    assert_eq!(card.angle_sets[1].flag_backf, VaryFlag::Yes);
    let parsed = NormalizationCard::from_lines(&card.to_lines()).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn external_r_format3_round_trips() {
    let card = ExternalRCard::Format3 {
        entries: vec![ExternalR3Entry {
            spin_group: 1,
            channel: 1,
            e_down: Some(-2.0e5),
            e_up: Some(2.0e5),
            r_con: Some(0.25),
            r_lin: Some(1.25e-7),
            s_alpha: None,
            vary_e_down: VaryFlag::No,
            vary_e_up: VaryFlag::No,
            vary_r_con: VaryFlag::Yes,
            vary_r_lin: VaryFlag::Yes,
            vary_s_alpha: VaryFlag::No,
        }],
    };
    let emitted = card.to_lines();
    assert_eq!(emitted[0], "EXTERnal R-function parameters follow");
    let parsed = ExternalRCard::from_lines(&emitted).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn external_r_format3a_packs_seven_flags() {
    let card = ExternalRCard::Format3a {
        entries: vec![ExternalR3aEntry {
            spin_group: 2,
            channel: 1,
            e_down: Some(-1.0e5),
            e_up: Some(1.0e5),
            r_con: Some(0.5),
            r_lin: None,
            s_con: Some(0.125),
            s_lin: None,
            r_q: Some(0.0625),
            vary_e_down: VaryFlag::No,
            vary_e_up: VaryFlag::Yes,
            vary_r_con: VaryFlag::Yes,
            vary_r_lin: VaryFlag::No,
            vary_s_con: VaryFlag::Pup,
            vary_s_lin: VaryFlag::No,
            vary_r_q: VaryFlag::No,
        }],
    };
    let emitted = card.to_lines();
    assert_eq!(emitted[0], "R-EXTernal parameters follow");
    assert_eq!(&emitted[1][0..10], " 210110300");
    let parsed = ExternalRCard::from_lines(&emitted).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn unused_variables_fill_the_ten_column_grid() {
    let card = UnusedCorrelatedCard {
        variables: (1..=10)
            .map(|i| UnusedVariable {
                name: format!("VAR{i}"),
                value: i as f64 * 0.5,
            })
            .collect(),
    };
    let emitted = card.to_lines();
    // Ten variables need two name/value line pairs.
    assert_eq!(emitted.len(), 6);
    assert!(emitted[1].starts_with("VAR1      VAR2"));
    let parsed = UnusedCorrelatedCard::from_lines(&emitted).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn data_reduction_round_trips() {
    let card = DataReductionCard {
        parameters: vec![DataReductionParameter {
            name: "THICK".to_string(),
            flag: VaryFlag::Pup,
            value: 0.125,
            uncertainty: Some(0.03125),
            derivative: Some(-0.5),
        }],
    };
    let parsed = DataReductionCard::from_lines(&card.to_lines()).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn user_resolution_parses_file_lines() {
    let card = UserResolutionCard {
        burst: Some(UserBurst {
            flag: VaryFlag::No,
            width: 0.5,
            uncertainty: None,
        }),
        channels: vec![UserChannel {
            flag: VaryFlag::Yes,
            energy: 500.0,
            width: 0.25,
            uncertainty: Some(0.03125),
        }],
        filenames: vec!["udr/resolution.udr".to_string()],
    };
    let emitted = card.to_lines();
    assert!(emitted.iter().any(|l| l == "FILE=udr/resolution.udr"));
    let parsed = UserResolutionCard::from_lines(&emitted).unwrap();
    assert_eq!(parsed, card);
}

#[rstest]
#[case("BROADening parameters may be varied", true)]
#[case("broadening parameters may be varied", true)]
#[case("BROAD", true)]
#[case("NORMAlization and background are next", false)]
fn broadening_header_detection(#[case] line: &str, #[case] expected: bool) {
    assert_eq!(BroadeningCard::is_header_line(line), expected);
}

#[rstest]
#[case("EXTERnal R-function parameters follow")]
#[case("R-EXTernal parameters follow")]
#[case("r-external parameters follow")]
fn external_r_header_detection(#[case] line: &str) {
    assert!(ExternalRCard::is_header_line(line));
}
