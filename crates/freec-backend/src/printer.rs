//! Rendering Gallina sentences to text.
//!
//! The output is deterministic: the same sentences print to the same bytes.

use crate::gallina::{Binder, FixBody, Sentence, Term};

/// Render a whole file of sentences.
#[must_use]
pub fn print_sentences(sentences: &[Sentence]) -> String {
    let mut out = String::new();
    for (index, sentence) in sentences.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        print_sentence(&mut out, sentence);
        out.push('\n');
    }
    out
}

fn print_sentence(out: &mut String, sentence: &Sentence) {
    match sentence {
        Sentence::RequireImport { library, modules } => {
            out.push_str(&format!(
                "From {library} Require Import {}.",
                modules.join(" ")
            ));
        }
        Sentence::Inductive(bodies) => {
            for (index, body) in bodies.iter().enumerate() {
                let keyword = if index == 0 { "Inductive" } else { "with" };
                out.push_str(&format!(
                    "{keyword} {}{} : Type :=",
                    body.name,
                    binders(&body.params)
                ));
                for con in &body.cons {
                    out.push_str(&format!("\n  | {} : {}", con.name, term(&con.ty, 2)));
                }
                out.push('\n');
            }
            // Replace the final newline with the sentence terminator.
            out.pop();
            out.push('.');
        }
        Sentence::Definition {
            name,
            binders: bs,
            ret,
            body,
        } => {
            out.push_str(&format!("Definition {name}{}", binders(bs)));
            if let Some(ret) = ret {
                out.push_str(&format!(" : {}", term(ret, 1)));
            }
            out.push_str(&format!(" :=\n  {}.", term(body, 1)));
        }
        Sentence::Fixpoint(bodies) => {
            for (index, body) in bodies.iter().enumerate() {
                let keyword = if index == 0 { "Fixpoint" } else { "with" };
                print_fix_body(out, keyword, body);
                out.push('\n');
            }
            out.pop();
            out.push('.');
        }
        Sentence::Arguments { name, implicits } => {
            let braced: Vec<String> = implicits.iter().map(|i| format!("{{{i}}}")).collect();
            out.push_str(&format!("Arguments {name} {}.", braced.join(" ")));
        }
        Sentence::ModuleStart(name) => out.push_str(&format!("Module {name}.")),
        Sentence::ModuleEnd(name) => out.push_str(&format!("End {name}.")),
    }
}

fn print_fix_body(out: &mut String, keyword: &str, body: &FixBody) {
    out.push_str(&format!(
        "{keyword} {}{} {{struct {}}}",
        body.name,
        binders(&body.binders),
        body.struct_arg
    ));
    if let Some(ret) = &body.ret {
        out.push_str(&format!(" : {}", term(ret, 1)));
    }
    out.push_str(&format!(" :=\n  {}", term(&body.body, 1)));
}

/// Render a binder list with a leading space per binder.
fn binders(bs: &[Binder]) -> String {
    let mut out = String::new();
    for binder in bs {
        out.push(' ');
        out.push_str(&binder_str(binder));
    }
    out
}

fn binder_str(binder: &Binder) -> String {
    let names = binder.names.join(" ");
    match (&binder.ty, binder.implicit) {
        (Some(ty), true) => format!("{{{names} : {}}}", term(ty, 0)),
        (Some(ty), false) => format!("({names} : {})", term(ty, 0)),
        (None, true) => format!("{{{names}}}"),
        (None, false) => names,
    }
}

/// Render a term. `depth` tracks indentation for multi-line `match`es.
fn term(t: &Term, depth: usize) -> String {
    match t {
        Term::Qualid(name) => name.clone(),
        Term::Sort => "Type".to_string(),
        Term::Int(value) => {
            if *value < 0 {
                format!("({value})%Z")
            } else {
                format!("{value}%Z")
            }
        }
        Term::Str(value) => format!("\"{}\"%string", escape_string(value)),
        Term::App(head, args) => {
            let mut out = atom(head, depth);
            for arg in args {
                out.push(' ');
                out.push_str(&atom(arg, depth));
            }
            out
        }
        Term::Fun(bs, body) => {
            format!("fun{} => {}", binders(bs), term(body, depth))
        }
        Term::Bind(lhs, var, rhs) => {
            format!(
                "{} >>= (fun {var} => {})",
                atom(lhs, depth),
                term(rhs, depth)
            )
        }
        Term::Match(scrutinee, equations) => {
            let pad = "  ".repeat(depth);
            let mut out = format!("match {} with", term(scrutinee, depth));
            for equation in equations {
                out.push_str(&format!("\n{pad}| {}", equation.con));
                for arg in &equation.args {
                    out.push(' ');
                    out.push_str(arg);
                }
                out.push_str(&format!(" => {}", term(&equation.rhs, depth + 1)));
            }
            out.push_str(&format!("\n{pad}end"));
            out
        }
        Term::Arrow(lhs, rhs) => {
            let left = match lhs.as_ref() {
                Term::Arrow(_, _) | Term::Fun(_, _) | Term::Bind(_, _, _) => {
                    format!("({})", term(lhs, depth))
                }
                _ => term(lhs, depth),
            };
            format!("{left} -> {}", term(rhs, depth))
        }
    }
}

/// Render a term in argument position, parenthesizing non-atoms.
fn atom(t: &Term, depth: usize) -> String {
    match t {
        Term::Qualid(_) | Term::Sort | Term::Int(_) | Term::Str(_) => term(t, depth),
        _ => format!("({})", term(t, depth)),
    }
}

fn escape_string(s: &str) -> String {
    // Coq string literals double their quotes.
    s.replace('"', "\"\"")
}

#[cfg(test)]
#[path = "tests/printer.rs"]
mod tests;
