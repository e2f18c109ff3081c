//! Renaming - deterministic source-name to Gallina-identifier mapping.
//!
//! Target identifiers must be valid Gallina identifiers, differ from every
//! Coq keyword and from every identifier already taken in the module, and
//! be stable across runs for the same inputs.

use rustc_hash::FxHashSet;

use freec_ir::Name;

/// Gallina keywords and reserved notations a target identifier must avoid.
const COQ_KEYWORDS: &[&str] = &[
    "as", "else", "end", "fix", "cofix", "forall", "fun", "if", "in", "let", "match", "mod",
    "return", "then", "where", "with", "Axiom", "CoFixpoint", "CoInductive", "Definition",
    "Fixpoint", "Hypothesis", "Inductive", "Lemma", "Module", "Parameter", "Prop", "Qed",
    "Record", "Set", "Theorem", "Type", "Variable",
];

/// Identifiers the Base library and the emission scheme claim; shadowing
/// them breaks emitted code. `P` is the Partial instance binder.
const RESERVED_IDENTS: &[&str] = &[
    "Shape", "Pos", "P", "Free", "Partial", "pure", "impure", "bind", "undefined", "error",
];

/// Per-character mnemonics for operator symbols.
fn symbol_char_mnemonic(c: char) -> Option<&'static str> {
    Some(match c {
        '!' => "bang",
        '#' => "hash",
        '$' => "dollar",
        '%' => "percent",
        '&' => "amp",
        '*' => "star",
        '+' => "plus",
        '.' => "dot",
        '/' => "slash",
        '<' => "lt",
        '=' => "eq",
        '>' => "gt",
        '?' => "quest",
        '@' => "at",
        '\\' => "backslash",
        '^' => "caret",
        '|' => "bar",
        '-' => "minus",
        '~' => "tilde",
        ':' => "colon",
        _ => return None,
    })
}

fn is_coq_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\'')
}

/// Turn a source name into a candidate Gallina identifier.
///
/// Identifiers pass through almost unchanged (internal `#`-prefixed binder
/// names lose their sigil); operator symbols become character mnemonics.
#[must_use]
pub fn sanitize(name: &Name) -> String {
    match name {
        Name::Ident(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '\'')
                .collect();
            if is_coq_ident(&cleaned) {
                cleaned
            } else if cleaned.is_empty() {
                "x".to_string()
            } else {
                format!("x{cleaned}")
            }
        }
        Name::Symbol(s) => {
            let parts: Vec<&str> = s.chars().filter_map(symbol_char_mnemonic).collect();
            if parts.is_empty() {
                // `[]` and `(,)` have no symbol characters at all.
                match s.as_str() {
                    "[]" => "nil".to_string(),
                    "(,)" => "pair".to_string(),
                    _ => "sym".to_string(),
                }
            } else {
                parts.join("_")
            }
        }
    }
}

/// The set of identifiers already taken in the current module.
#[derive(Clone, Debug, Default)]
pub struct TakenIdents {
    taken: FxHashSet<String>,
}

impl TakenIdents {
    #[must_use]
    pub fn new() -> Self {
        TakenIdents::default()
    }

    fn is_free(&self, candidate: &str) -> bool {
        !self.taken.contains(candidate)
            && !COQ_KEYWORDS.contains(&candidate)
            && !RESERVED_IDENTS.contains(&candidate)
    }

    /// Pick the first free identifier derived from `candidate`, appending a
    /// numeric suffix on collision, and register it as taken.
    pub fn claim(&mut self, candidate: &str) -> String {
        if self.is_free(candidate) {
            self.taken.insert(candidate.to_string());
            return candidate.to_string();
        }
        let mut n = 0usize;
        loop {
            let attempt = format!("{candidate}{n}");
            if self.is_free(&attempt) {
                self.taken.insert(attempt.clone());
                return attempt;
            }
            n += 1;
        }
    }

    /// Release a previously claimed identifier. Scope-bound claims are
    /// released when their binding construct ends; top-level claims never
    /// are.
    pub fn release(&mut self, ident: &str) {
        self.taken.remove(ident);
    }

    /// Claim a fresh identifier with the given prefix and a counter suffix.
    ///
    /// Fresh identifiers always carry a suffix, so `fresh("x")` can never
    /// collide with a claimed plain `x`.
    pub fn fresh(&mut self, prefix: &str, counter: &mut u64) -> String {
        loop {
            let attempt = format!("{prefix}_{n}", n = *counter);
            *counter += 1;
            if self.is_free(&attempt) {
                self.taken.insert(attempt.clone());
                return attempt;
            }
        }
    }
}

/// Fixed prefix for freshly generated argument binders.
pub const FRESH_ARG_PREFIX: &str = "x";
/// Fixed prefix for freshly bound function values.
pub const FRESH_FUNC_PREFIX: &str = "f";

#[cfg(test)]
#[path = "tests/renamer.rs"]
mod tests;
