use sammy_par_rs::cards::misc::{
    DelteRecord, DrcapRecord, EfficRecord, EtaRecord, FinitRecord, MiscRecord,
    MiscellaneousCard, NonunPoint, NonunRecord, SelfiRecord, SiabnRecord, TzeroRecord, HEADER,
};
use sammy_par_rs::cards::VaryFlag;

fn lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.to_string()).collect()
}

#[test]
fn gamma_record_parses_handwritten_line() {
    let text = format!("{HEADER}\nGAMMA12 3 5.0000E-012.5000E-02");
    let card = MiscellaneousCard::from_lines(&lines(&text)).unwrap();
    match &card.records[0] {
        MiscRecord::Gamma(record) => {
            assert_eq!(record.spin_group, 12);
            assert_eq!(record.flag, VaryFlag::Pup);
            assert_eq!(record.width, 0.5);
            assert_eq!(record.uncertainty, Some(0.025));
        }
        other => panic!("expected a GAMMA record, got {other:?}"),
    }
}

#[test]
fn every_single_line_record_re_parses() {
    let records = vec![
        MiscRecord::Eta(EtaRecord {
            flag: VaryFlag::Yes,
            nu_value: 2.5,
            nu_uncertainty: Some(0.0625),
            energy: Some(1000.0),
        }),
        MiscRecord::Finit(FinitRecord {
            flag_in: VaryFlag::No,
            flag_out: VaryFlag::Yes,
            attn_in: 0.125,
            d_attn_in: None,
            attn_out: 0.25,
            d_attn_out: Some(0.03125),
        }),
        MiscRecord::Tzero(TzeroRecord {
            flag_t0: VaryFlag::Yes,
            flag_l0: VaryFlag::No,
            t0: 1.5,
            t0_uncertainty: Some(0.25),
            l0: 1.0,
            l0_uncertainty: None,
            flight_path_length: Some(100.0),
        }),
        MiscRecord::Siabn(SiabnRecord {
            flag1: VaryFlag::Yes,
            flag2: VaryFlag::No,
            flag3: VaryFlag::No,
            abundance1: 0.5,
            uncertainty1: Some(0.0625),
            abundance2: Some(0.25),
            uncertainty2: None,
            abundance3: None,
            uncertainty3: None,
        }),
        MiscRecord::Selfi(SelfiRecord {
            flag_temp: VaryFlag::Pup,
            flag_thick: VaryFlag::No,
            temperature: 298.0,
            temp_uncertainty: None,
            thickness: 0.125,
            thick_uncertainty: Some(0.015625),
        }),
        MiscRecord::Effic(EfficRecord {
            flag_capture: VaryFlag::Yes,
            flag_fission: VaryFlag::Yes,
            capture_efficiency: 0.75,
            fission_efficiency: 0.5,
            capture_uncertainty: Some(0.03125),
            fission_uncertainty: None,
        }),
        MiscRecord::Delte(DelteRecord {
            flag_e1: VaryFlag::No,
            flag_e0: VaryFlag::Yes,
            flag_log: VaryFlag::No,
            dele1: 0.5,
            dd1: None,
            dele0: Some(0.25),
            dd0: None,
            delel: None,
            ddl: None,
        }),
        MiscRecord::Drcap(DrcapRecord {
            flag: VaryFlag::Yes,
            nuclide: 2,
            coefficient: -0.5,
            uncertainty: Some(0.0625),
        }),
    ];
    let card = MiscellaneousCard { records };
    let parsed = MiscellaneousCard::from_lines(&card.to_lines()).unwrap();
    assert_eq!(parsed, card);
}

#[test]
fn nonun_lines_group_into_one_record() {
    let card = MiscellaneousCard {
        records: vec![MiscRecord::Nonun(NonunRecord {
            points: vec![
                NonunPoint {
                    radius: 0.0,
                    thickness: 0.25,
                    uncertainty: None,
                },
                NonunPoint {
                    radius: 1.5,
                    thickness: 0.1875,
                    uncertainty: Some(0.015625),
                },
                NonunPoint {
                    radius: 3.0,
                    thickness: 0.125,
                    uncertainty: None,
                },
            ],
        })],
    };
    let emitted = card.to_lines();
    assert_eq!(
        emitted.iter().filter(|l| l.starts_with("NONUN")).count(),
        3
    );
    let parsed = MiscellaneousCard::from_lines(&emitted).unwrap();
    assert_eq!(parsed, card);
    assert_eq!(parsed.records.len(), 1);
}

#[test]
fn decreasing_nonun_radii_are_rejected() {
    let text = format!(
        "{HEADER}\n\
         NONUN               0.0000E+002.5000E-01\n\
         NONUN               2.0000E+001.8750E-01\n\
         NONUN               1.0000E+001.2500E-01"
    );
    assert!(MiscellaneousCard::from_lines(&lines(&text)).is_err());
}

#[test]
fn unknown_identifier_is_rejected() {
    let text = format!("{HEADER}\nBOGUS 1   1.0000E+00");
    assert!(MiscellaneousCard::from_lines(&lines(&text)).is_err());
}
