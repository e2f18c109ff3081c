use super::*;

#[test]
fn valid_idents() {
    assert!(is_valid_ident("x"));
    assert!(is_valid_ident("foldr"));
    assert!(is_valid_ident("_go"));
    assert!(is_valid_ident("x'"));
    assert!(is_valid_ident("Tree"));
    assert!(is_valid_ident("x2_y'"));
}

#[test]
fn invalid_idents() {
    assert!(!is_valid_ident(""));
    assert!(!is_valid_ident("2x"));
    assert!(!is_valid_ident("'x"));
    assert!(!is_valid_ident("a-b"));
    assert!(!is_valid_ident("+"));
}

#[test]
fn display_forms() {
    assert_eq!(Name::ident("map").to_string(), "map");
    assert_eq!(Name::symbol("+").to_string(), "(+)");
    assert_eq!(QName::qualified("Data.List", Name::ident("map")).to_string(), "Data.List.map");
    assert_eq!(QName::ident("map").to_string(), "map");
}

#[test]
fn qualify_round_trip() {
    let name = QName::ident("foo");
    let qualified = name.qualify("M");
    assert_eq!(qualified.module.as_deref(), Some("M"));
    assert_eq!(qualified.unqualify(), name);
}
