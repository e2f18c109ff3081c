use super::*;
use crate::entry::EntryKind;
use crate::interface::{IfaceFunc, ModuleInterface};
use freec_ir::{Name, QName};

fn func_kind(arity: usize) -> EntryKind {
    EntryKind::Func {
        arity,
        type_args: Vec::new(),
        arg_types: Vec::new(),
        return_type: None,
        partial: false,
    }
}

#[test]
fn toplevel_define_and_lookup() {
    let mut env = Environment::new();
    let entry = env
        .define_toplevel(Some("M"), &Name::ident("foo"), func_kind(1), None)
        .expect("first definition");
    assert_eq!(entry.target, "foo");

    // Both the unqualified and qualified forms resolve to the entry.
    assert!(matches!(
        env.lookup(Scope::Value, &QName::ident("foo")),
        Lookup::Found(found) if found.target == "foo"
    ));
    assert!(matches!(
        env.lookup(Scope::Value, &QName::qualified("M", Name::ident("foo"))),
        Lookup::Found(_)
    ));
}

#[test]
fn duplicate_toplevel_is_rejected() {
    let mut env = Environment::new();
    assert!(env
        .define_toplevel(Some("M"), &Name::ident("foo"), func_kind(1), None)
        .is_some());
    assert!(env
        .define_toplevel(Some("M"), &Name::ident("foo"), func_kind(2), None)
        .is_none());
}

#[test]
fn same_name_in_both_scopes_is_allowed() {
    let mut env = Environment::new();
    assert!(env
        .define_toplevel(
            Some("M"),
            &Name::ident("Tree"),
            EntryKind::Data { arity: 1 },
            None
        )
        .is_some());
    // A constructor with the same name lives in the value scope.
    assert!(env
        .define_toplevel(
            Some("M"),
            &Name::ident("Tree"),
            EntryKind::Con {
                arity: 1,
                arg_types: Vec::new(),
                return_type: None,
                smart_target: "Tree_".to_string(),
            },
            None
        )
        .is_some());
}

#[test]
fn target_identifiers_are_injective() {
    let mut env = Environment::new();
    // Both names sanitize to "plus".
    let a = env
        .define_toplevel(Some("M"), &Name::symbol("+"), func_kind(2), None)
        .unwrap();
    let b = env
        .define_toplevel(Some("M"), &Name::ident("plus"), func_kind(2), None)
        .unwrap();
    assert_ne!(a.target, b.target);
}

#[test]
fn scoped_entries_disappear_after_the_scope() {
    let mut env = Environment::new();
    env.with_scope(|env| {
        env.define_local(&Name::ident("x"), EntryKind::Var { pure: false });
        assert!(env.is_defined(Scope::Value, &QName::ident("x")));
    });
    assert!(!env.is_defined(Scope::Value, &QName::ident("x")));
}

#[test]
fn inner_scope_shadows_outer() {
    let mut env = Environment::new();
    let outer = env.define_local(&Name::ident("x"), EntryKind::Var { pure: false });
    env.with_scope(|env| {
        let inner = env.define_local(&Name::ident("x"), EntryKind::Var { pure: true });
        assert_ne!(outer.target, inner.target);
        let Lookup::Found(found) = env.lookup(Scope::Value, &QName::ident("x")) else {
            panic!("expected a binding");
        };
        assert!(found.is_pure_var());
    });
}

#[test]
fn ambiguous_import_is_detected() {
    let mut env = Environment::new();
    let mut a = ModuleInterface::empty("A");
    a.functions.push(IfaceFunc {
        name: Name::ident("f"),
        arity: 1,
        type_args: Vec::new(),
        partial: false,
        target: "f".to_string(),
    });
    let mut b = ModuleInterface::empty("B");
    b.functions.push(IfaceFunc {
        name: Name::ident("f"),
        arity: 1,
        type_args: Vec::new(),
        partial: false,
        target: "f".to_string(),
    });
    env.import_interface(&a);
    env.import_interface(&b);

    assert!(matches!(
        env.lookup(Scope::Value, &QName::ident("f")),
        Lookup::Ambiguous(modules) if modules == vec!["A".to_string(), "B".to_string()]
    ));
    // The qualified forms stay unambiguous.
    assert!(matches!(
        env.lookup(Scope::Value, &QName::qualified("A", Name::ident("f"))),
        Lookup::Found(_)
    ));
}

#[test]
fn reimporting_the_same_module_is_harmless() {
    let mut env = Environment::new();
    let mut a = ModuleInterface::empty("A");
    a.functions.push(IfaceFunc {
        name: Name::ident("f"),
        arity: 1,
        type_args: Vec::new(),
        partial: false,
        target: "f".to_string(),
    });
    env.import_interface(&a);
    env.import_interface(&a);
    assert!(matches!(
        env.lookup(Scope::Value, &QName::ident("f")),
        Lookup::Found(_)
    ));
}

#[test]
fn dec_arg_round_trip() {
    let mut env = Environment::new();
    let name = QName::qualified("M", Name::ident("length"));
    env.set_dec_arg(name.clone(), 0);
    assert_eq!(env.dec_arg(&name), Some(0));
    assert_eq!(env.dec_arg(&QName::ident("other")), None);
}
