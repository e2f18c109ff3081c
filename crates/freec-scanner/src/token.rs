//! Token vocabulary for the source subset.

use freec_common::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Lower-case identifier, e.g. `foldr`.
    VarId(String),
    /// Upper-case identifier, e.g. `Tree`.
    ConId(String),
    /// Module-qualified lower-case identifier, e.g. `M.foldr`.
    QVarId(String, String),
    /// Module-qualified upper-case identifier, e.g. `M.Tree`.
    QConId(String, String),
    /// Operator symbol, e.g. `+` or `:`.
    Sym(String),
    /// Module-qualified operator symbol, e.g. `M.+`.
    QSym(String, String),
    IntLit(i64),
    StringLit(String),

    // Reserved words of the subset.
    Module,
    Where,
    Import,
    Data,
    Type,
    Case,
    Of,
    If,
    Then,
    Else,
    /// A Haskell reserved word the subset does not support (`let`, `do`, ...).
    /// Kept as its own kind so the parser can point at it precisely.
    Unsupported(String),

    Equals,
    DoubleColon,
    Arrow,
    /// `=>`, only valid in signatures we reject (type-class contexts).
    FatArrow,
    Backslash,
    Bar,
    Underscore,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semi,
    LBrace,
    RBrace,

    // Inserted by the layout pass.
    VLBrace,
    VSemi,
    VRBrace,

    Eof,
}

impl TokenKind {
    /// Token text for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TokenKind::VarId(s) | TokenKind::ConId(s) | TokenKind::Sym(s) => format!("'{s}'"),
            TokenKind::QVarId(m, s) | TokenKind::QConId(m, s) | TokenKind::QSym(m, s) => {
                format!("'{m}.{s}'")
            }
            TokenKind::IntLit(n) => format!("'{n}'"),
            TokenKind::StringLit(_) => "string literal".to_string(),
            TokenKind::Module => "'module'".to_string(),
            TokenKind::Where => "'where'".to_string(),
            TokenKind::Import => "'import'".to_string(),
            TokenKind::Data => "'data'".to_string(),
            TokenKind::Type => "'type'".to_string(),
            TokenKind::Case => "'case'".to_string(),
            TokenKind::Of => "'of'".to_string(),
            TokenKind::If => "'if'".to_string(),
            TokenKind::Then => "'then'".to_string(),
            TokenKind::Else => "'else'".to_string(),
            TokenKind::Unsupported(s) => format!("'{s}'"),
            TokenKind::Equals => "'='".to_string(),
            TokenKind::DoubleColon => "'::'".to_string(),
            TokenKind::Arrow => "'->'".to_string(),
            TokenKind::FatArrow => "'=>'".to_string(),
            TokenKind::Backslash => "'\\'".to_string(),
            TokenKind::Bar => "'|'".to_string(),
            TokenKind::Underscore => "'_'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semi | TokenKind::VSemi => "';'".to_string(),
            TokenKind::LBrace | TokenKind::VLBrace => "'{'".to_string(),
            TokenKind::RBrace | TokenKind::VRBrace => "'}'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}
