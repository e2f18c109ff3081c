use super::*;
use crate::gallina::{Binder, Equation, FixBody, InductiveBody, InductiveCon, Sentence, Term};

fn free_of(inner: Term) -> Term {
    Term::app(
        Term::qualid("Free"),
        vec![Term::qualid("Shape"), Term::qualid("Pos"), inner],
    )
}

#[test]
fn prints_require_import() {
    let sentence = Sentence::RequireImport {
        library: "Base".to_string(),
        modules: vec!["Free".to_string()],
    };
    assert_eq!(print_sentences(&[sentence]), "From Base Require Import Free.\n");
}

#[test]
fn prints_identity_definition() {
    let sentence = Sentence::Definition {
        name: "id".to_string(),
        binders: vec![
            Binder::explicit("Shape", Term::Sort),
            Binder::explicit("Pos", Term::arrow(Term::qualid("Shape"), Term::Sort)),
            Binder::implicit(vec!["a".to_string()], Term::Sort),
            Binder::explicit("x", free_of(Term::qualid("a"))),
        ],
        ret: Some(free_of(Term::qualid("a"))),
        body: Term::qualid("x"),
    };
    assert_eq!(
        print_sentences(&[sentence]),
        "Definition id (Shape : Type) (Pos : Shape -> Type) {a : Type} \
         (x : Free Shape Pos a) : Free Shape Pos a :=\n  x.\n"
    );
}

#[test]
fn prints_match_with_arms_on_their_own_lines() {
    let term = Term::Match(
        Box::new(Term::qualid("xs")),
        vec![
            Equation {
                con: "nil".to_string(),
                args: Vec::new(),
                rhs: Term::pure(Term::Int(0)),
            },
            Equation {
                con: "cons".to_string(),
                args: vec!["y".to_string(), "ys".to_string()],
                rhs: Term::qualid("ys"),
            },
        ],
    );
    let sentence = Sentence::Definition {
        name: "f".to_string(),
        binders: Vec::new(),
        ret: None,
        body: term,
    };
    let printed = print_sentences(&[sentence]);
    assert!(printed.contains("match xs with\n  | nil => pure 0%Z\n  | cons y ys => ys\n  end."));
}

#[test]
fn prints_bind_operator() {
    let term = Term::Bind(
        Box::new(Term::qualid("xs")),
        "xs_0".to_string(),
        Box::new(Term::app(
            Term::qualid("length_0"),
            vec![Term::qualid("Shape"), Term::qualid("Pos"), Term::qualid("xs_0")],
        )),
    );
    let sentence = Sentence::Definition {
        name: "length".to_string(),
        binders: Vec::new(),
        ret: None,
        body: term,
    };
    let printed = print_sentences(&[sentence]);
    assert!(printed.contains("xs >>= (fun xs_0 => length_0 Shape Pos xs_0)"));
}

#[test]
fn prints_mutual_inductive() {
    let body = |name: &str| InductiveBody {
        name: name.to_string(),
        params: vec![Binder::explicit("Shape", Term::Sort)],
        cons: vec![InductiveCon {
            name: format!("mk{name}"),
            ty: Term::qualid(name),
        }],
    };
    let printed = print_sentences(&[Sentence::Inductive(vec![body("A"), body("B")])]);
    assert!(printed.starts_with("Inductive A (Shape : Type) : Type :=\n  | mkA : A\nwith B"));
    assert!(printed.trim_end().ends_with("| mkB : B."));
}

#[test]
fn prints_fixpoint_with_struct_annotation() {
    let sentence = Sentence::Fixpoint(vec![FixBody {
        name: "go".to_string(),
        binders: vec![Binder::explicit("xs", Term::qualid("List"))],
        struct_arg: "xs".to_string(),
        ret: Some(Term::qualid("Integer")),
        body: Term::qualid("xs"),
    }]);
    let printed = print_sentences(&[sentence]);
    assert!(printed.contains("Fixpoint go (xs : List) {struct xs} : Integer :=\n  xs."));
}

#[test]
fn prints_arguments_sentence() {
    let sentence = Sentence::Arguments {
        name: "leaf".to_string(),
        implicits: vec!["Shape".to_string(), "Pos".to_string(), "a".to_string()],
    };
    assert_eq!(
        print_sentences(&[sentence]),
        "Arguments leaf {Shape} {Pos} {a}.\n"
    );
}

#[test]
fn parenthesizes_compound_arguments() {
    let term = Term::app(
        Term::qualid("f"),
        vec![Term::app(Term::qualid("g"), vec![Term::qualid("x")])],
    );
    let sentence = Sentence::Definition {
        name: "h".to_string(),
        binders: Vec::new(),
        ret: None,
        body: term,
    };
    assert!(print_sentences(&[sentence]).contains("f (g x)"));
}

#[test]
fn negative_integers_are_parenthesized() {
    let sentence = Sentence::Definition {
        name: "n".to_string(),
        binders: Vec::new(),
        ret: None,
        body: Term::pure(Term::Int(-5)),
    };
    assert!(print_sentences(&[sentence]).contains("pure (-5)%Z"));
}

#[test]
fn string_literals_double_their_quotes() {
    let sentence = Sentence::Definition {
        name: "s".to_string(),
        binders: Vec::new(),
        ret: None,
        body: Term::Str("a \"b\"".to_string()),
    };
    assert!(print_sentences(&[sentence]).contains("\"a \"\"b\"\"\"%string"));
}

#[test]
fn arrow_left_operand_is_parenthesized() {
    let term = Term::arrow(
        Term::arrow(Term::qualid("a"), Term::qualid("b")),
        Term::qualid("c"),
    );
    let sentence = Sentence::Definition {
        name: "t".to_string(),
        binders: Vec::new(),
        ret: Some(Term::Sort),
        body: term,
    };
    assert!(print_sentences(&[sentence]).contains("(a -> b) -> c"));
}

#[test]
fn module_wrapper() {
    let printed = print_sentences(&[
        Sentence::ModuleStart("M".to_string()),
        Sentence::ModuleEnd("M".to_string()),
    ]);
    assert_eq!(printed, "Module M.\n\nEnd M.\n");
}
