use super::*;
use freec_ir::Name;

#[test]
fn identifiers_pass_through() {
    assert_eq!(sanitize(&Name::ident("foldr")), "foldr");
    assert_eq!(sanitize(&Name::ident("x'")), "x'");
}

#[test]
fn internal_names_lose_their_sigil() {
    assert_eq!(sanitize(&Name::ident("#x0")), "x0");
    assert_eq!(sanitize(&Name::ident("#w1")), "w1");
}

#[test]
fn symbols_become_mnemonics() {
    assert_eq!(sanitize(&Name::symbol("+")), "plus");
    assert_eq!(sanitize(&Name::symbol("++")), "plus_plus");
    assert_eq!(sanitize(&Name::symbol("<=")), "lt_eq");
    assert_eq!(sanitize(&Name::symbol(":")), "colon");
}

#[test]
fn builtin_spellings_have_names() {
    assert_eq!(sanitize(&Name::symbol("[]")), "nil");
    assert_eq!(sanitize(&Name::symbol("(,)")), "pair");
}

#[test]
fn claim_avoids_keywords() {
    let mut taken = TakenIdents::new();
    // `match` is a Gallina keyword, so the first claim gets a suffix.
    assert_eq!(taken.claim("match"), "match0");
    assert_eq!(taken.claim("match"), "match1");
}

#[test]
fn claim_avoids_reserved_base_names() {
    let mut taken = TakenIdents::new();
    assert_eq!(taken.claim("pure"), "pure0");
    assert_eq!(taken.claim("Shape"), "Shape0");
}

#[test]
fn claim_disambiguates_collisions_deterministically() {
    let mut taken = TakenIdents::new();
    assert_eq!(taken.claim("f"), "f");
    assert_eq!(taken.claim("f"), "f0");
    assert_eq!(taken.claim("f"), "f1");
}

#[test]
fn fresh_always_suffixes() {
    let mut taken = TakenIdents::new();
    let mut counter = 0;
    assert_eq!(taken.claim("x"), "x");
    assert_eq!(taken.fresh(FRESH_ARG_PREFIX, &mut counter), "x_0");
    assert_eq!(taken.fresh(FRESH_ARG_PREFIX, &mut counter), "x_1");
}

#[test]
fn fresh_skips_taken_identifiers() {
    let mut taken = TakenIdents::new();
    assert_eq!(taken.claim("x_0"), "x_0");
    let mut counter = 0;
    assert_eq!(taken.fresh("x", &mut counter), "x_1");
}
