use super::*;
use crate::entry::Scope;
use crate::environment::{Environment, Lookup};
use freec_ir::QName;

const SAMPLE: &str = r#"
[[types]]
haskell-name = "Integer"
coq-name = "Integer"
arity = 0

[[types]]
haskell-name = "[]"
coq-name = "List"
arity = 1

[[constructors]]
haskell-name = ":"
haskell-type = "a -> [a] -> [a]"
coq-name = "cons"
coq-smart-name = "Cons"
arity = 2

[[functions]]
haskell-name = "+"
haskell-type = "Integer -> Integer -> Integer"
coq-name = "addInteger"
arity = 2

[[functions]]
haskell-name = "div"
haskell-type = "Integer -> Integer -> Integer"
coq-name = "divInteger"
arity = 2
partial = true
"#;

#[test]
fn parses_all_three_arrays() {
    let config = EnvConfig::parse(SAMPLE).expect("config parses");
    assert_eq!(config.types.len(), 2);
    assert_eq!(config.constructors.len(), 1);
    assert_eq!(config.functions.len(), 2);
    assert!(!config.functions[0].partial);
    assert!(config.functions[1].partial);
}

#[test]
fn symbol_names_are_recognized() {
    let config = EnvConfig::parse(SAMPLE).unwrap();
    assert_eq!(parse_config_name(&config.types[1].haskell_name), Name::symbol("[]"));
    assert_eq!(parse_config_name(&config.functions[0].haskell_name), Name::symbol("+"));
    assert_eq!(parse_config_name(&config.functions[1].haskell_name), Name::ident("div"));
}

#[test]
fn apply_registers_entries() {
    let config = EnvConfig::parse(SAMPLE).unwrap();
    let mut env = Environment::new();
    config.apply(&mut env);

    let Lookup::Found(list) = env.lookup(Scope::Type, &QName::symbol("[]")) else {
        panic!("list type not registered");
    };
    assert_eq!(list.target, "List");

    let Lookup::Found(cons) = env.lookup(Scope::Value, &QName::symbol(":")) else {
        panic!("cons not registered");
    };
    let EntryKind::Con { smart_target, .. } = &cons.kind else {
        panic!("expected a constructor entry");
    };
    assert_eq!(smart_target, "Cons");

    let Lookup::Found(div) = env.lookup(Scope::Value, &QName::ident("div")) else {
        panic!("div not registered");
    };
    assert!(div.is_partial());
}

#[test]
fn empty_config_is_valid() {
    let config = EnvConfig::parse("").expect("empty config parses");
    assert!(config.types.is_empty());
}
