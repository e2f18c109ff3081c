//! The fixed infix operator table.
//!
//! The subset supports exactly these operators at their Haskell-98
//! fixities. Any other operator must be written applied in parentheses.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    None,
}

/// Precedence and associativity of a supported infix operator.
#[must_use]
pub fn fixity(sym: &str) -> Option<(u8, Assoc)> {
    Some(match sym {
        "^" => (8, Assoc::Right),
        "*" => (7, Assoc::Left),
        "+" | "-" => (6, Assoc::Left),
        ":" => (5, Assoc::Right),
        "==" | "/=" | "<" | "<=" | ">" | ">=" => (4, Assoc::None),
        "&&" => (3, Assoc::Right),
        "||" => (2, Assoc::Right),
        _ => return None,
    })
}
