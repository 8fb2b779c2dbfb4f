use epiview::{ColorDomain, ColorRegistry};

#[test]
fn mode_switch_replaces_the_registry_wholesale() {
    let continents = ColorRegistry::assign(ColorDomain::Continents, ["OWID_AFR", "OWID_EUR"]);
    assert!(continents.color_for("OWID_AFR").is_some());

    // Selection becomes non-empty: a fresh country registry replaces it.
    let countries = ColorRegistry::assign(ColorDomain::Countries, ["US", "CA"]);
    assert_eq!(countries.domain(), ColorDomain::Countries);
    assert!(countries.color_for("OWID_AFR").is_none());
    assert!(countries.color_for("US").is_some());

    // Clearing rebuilds the continent registry; no country colors leak in.
    let restored = ColorRegistry::assign(ColorDomain::Continents, ["OWID_AFR", "OWID_EUR"]);
    assert_eq!(restored.domain(), ColorDomain::Continents);
    assert!(restored.color_for("US").is_none());
    let keys: Vec<&str> = restored.keys().collect();
    assert_eq!(keys, vec!["OWID_AFR", "OWID_EUR"]);
    assert_eq!(
        restored.color_for("OWID_AFR"),
        continents.color_for("OWID_AFR"),
        "same domain enumeration must reproduce the same assignment"
    );
}

#[test]
fn assignment_is_deterministic_for_a_given_enumeration() {
    let a = ColorRegistry::assign(ColorDomain::Countries, ["FR", "DE", "IT"]);
    let b = ColorRegistry::assign(ColorDomain::Countries, ["FR", "DE", "IT"]);
    for code in ["FR", "DE", "IT"] {
        assert_eq!(a.color_for(code), b.color_for(code));
    }
}

#[test]
fn empty_group_set_yields_empty_mapping() {
    let reg = ColorRegistry::assign(ColorDomain::Continents, Vec::<String>::new());
    assert!(reg.is_empty());
    assert_eq!(reg.color_for("OWID_EUR"), None);
}
