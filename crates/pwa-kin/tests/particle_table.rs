use pwa_core::errors::PwaError;
use pwa_kin::{charge_from_name, ParticleDataTable, ParticleProperties};

fn pion() -> ParticleProperties {
    ParticleProperties {
        name: "pi".to_string(),
        mass: 0.13957,
        width: 0.0,
        baryon_nmb: 0,
        isospin: 2,
        strangeness: 0,
        charm: 0,
        beauty: 0,
        g_parity: -1,
        spin: 0,
        parity: -1,
        c_parity: 1,
    }
}

#[test]
fn entries_are_added_once() {
    let mut table = ParticleDataTable::new();
    assert!(table.add_entry(pion()));
    let mut heavier = pion();
    heavier.mass = 1.0;
    assert!(!table.add_entry(heavier));
    assert_eq!(table.len(), 1);
    assert_eq!(table.entry("pi"), Some(&pion()));
    assert!(table.is_in_table("pi"));
    assert!(!table.is_in_table("rho"));
}

#[test]
fn properties_fill_from_table() {
    let mut table = ParticleDataTable::new();
    table.add_entry(pion());
    let mut props = ParticleProperties::default();
    props.fill_from_table(&table, "pi").unwrap();
    assert_eq!(props, pion());

    let err = props.fill_from_table(&table, "eta").unwrap_err();
    assert!(matches!(err, PwaError::Index(ref info) if info.code == "unknown-particle"));
    assert_eq!(props, pion());
}

#[test]
fn display_shows_quantum_numbers() {
    let text = pion().to_string();
    assert!(text.starts_with("particle 'pi'"));
    assert!(text.contains("IG(JPC) = 2-(0-+)"));
}

#[test]
fn table_loads_from_yaml() {
    let yaml = "\
pi:
  name: pi
  mass: 0.13957
  isospin: 2
  g_parity: -1
  parity: -1
  c_parity: 1
rho770:
  name: rho770
  mass: 0.7755
  width: 0.149
  isospin: 2
  g_parity: 1
  spin: 2
  parity: -1
  c_parity: -1
";
    let table = ParticleDataTable::from_yaml_str(yaml).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.entry("pi"), Some(&pion()));
    let names: Vec<_> = table.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["pi", "rho770"]);

    let mismatched = "eta:\n  name: pi\n";
    let err = ParticleDataTable::from_yaml_str(mismatched).unwrap_err();
    assert_eq!(err.info().code, "particle-table-key");
    assert!(ParticleDataTable::from_yaml_str("pi: [1, 2").is_err());
}

#[test]
fn charge_suffixes_are_split_off() {
    assert_eq!(charge_from_name("pi2-"), ("pi".to_string(), -2));
    assert_eq!(charge_from_name("pi-"), ("pi".to_string(), -1));
    assert_eq!(charge_from_name("pi0"), ("pi".to_string(), 0));
    assert_eq!(charge_from_name("pi+"), ("pi".to_string(), 1));
    assert_eq!(charge_from_name("pi2+"), ("pi".to_string(), 2));
    assert_eq!(charge_from_name("a1+"), ("a1".to_string(), 1));
    assert_eq!(charge_from_name("rho770"), ("rho77".to_string(), 0));
    assert_eq!(charge_from_name("eta"), ("eta".to_string(), 0));
    assert_eq!(charge_from_name(""), (String::new(), 0));
}

#[test]
fn neutral_suffix_keeps_preceding_digit() {
    assert_eq!(charge_from_name("f20"), ("f2".to_string(), 0));
    assert_eq!(charge_from_name("a20"), ("a2".to_string(), 0));
    assert_eq!(charge_from_name("rho31690"), ("rho3169".to_string(), 0));
    assert_eq!(charge_from_name("0"), (String::new(), 0));
}
