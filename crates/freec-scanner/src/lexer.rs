//! Source text to raw token stream.

use freec_common::{Diagnostic, Reporter, Result, Span};

use crate::token::{Token, TokenKind};

const SYMBOL_CHARS: &str = "!#$%&*+./<=>?@\\^|-~:";

fn is_symbol_char(c: char) -> bool {
    SYMBOL_CHARS.contains(c)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\''
}

/// Reserved words the subset keeps.
fn reserved(word: &str) -> Option<TokenKind> {
    Some(match word {
        "module" => TokenKind::Module,
        "where" => TokenKind::Where,
        "import" => TokenKind::Import,
        "data" => TokenKind::Data,
        "type" => TokenKind::Type,
        "case" => TokenKind::Case,
        "of" => TokenKind::Of,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        // Haskell-98 reserved words outside the subset.
        "let" | "in" | "do" | "class" | "instance" | "newtype" | "deriving" | "default"
        | "infix" | "infixl" | "infixr" | "foreign" => {
            TokenKind::Unsupported(word.to_string())
        }
        _ => return None,
    })
}

pub struct Lexer<'a> {
    file: &'a str,
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(file: &'a str, source: &'a str) -> Self {
        Lexer {
            file,
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// Lex the whole source. The returned stream ends with an `Eof` token.
    pub fn run(mut self, reporter: &mut Reporter) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia(reporter)?;
            let start = self.pos;
            let Some(c) = self.peek_char() else {
                tokens.push(Token::new(TokenKind::Eof, Span::at(self.u32_pos())));
                return Ok(tokens);
            };
            let kind = if is_ident_start(c) {
                self.lex_word()?
            } else if c.is_ascii_digit() {
                self.lex_number(reporter)?
            } else if c == '"' {
                self.lex_string(reporter)?
            } else if is_symbol_char(c) {
                self.lex_symbol()
            } else {
                self.lex_punct(c, reporter)?
            };
            let span = Span::new(start as u32, self.u32_pos());
            tokens.push(Token::new(kind, span));
        }
    }

    fn u32_pos(&self) -> u32 {
        u32::try_from(self.pos).unwrap_or(u32::MAX)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace, line comments, and nested block comments.
    fn skip_trivia(&mut self, reporter: &mut Reporter) -> Result<()> {
        loop {
            match self.peek_byte(0) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.pos += 1;
                }
                Some(b'-') if self.peek_byte(1) == Some(b'-') => {
                    // A dash run is a comment only when not followed by
                    // another symbol character (`-->` is an operator).
                    let mut dashes = 2;
                    while self.peek_byte(dashes) == Some(b'-') {
                        dashes += 1;
                    }
                    let after = self.source[self.pos + dashes..].chars().next();
                    if after.is_some_and(|c| is_symbol_char(c) && c != '-') {
                        return Ok(());
                    }
                    while let Some(b) = self.peek_byte(0) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'{') if self.peek_byte(1) == Some(b'-') => {
                    self.skip_block_comment(reporter)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self, reporter: &mut Reporter) -> Result<()> {
        let start = self.u32_pos();
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek_byte(0), self.peek_byte(1)) {
                (Some(b'{'), Some(b'-')) => {
                    depth += 1;
                    self.pos += 2;
                }
                (Some(b'-'), Some(b'}')) => {
                    depth -= 1;
                    self.pos += 2;
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => {
                    return Err(reporter.report_fatal(Diagnostic::error(
                        self.file,
                        Span::new(start, self.u32_pos()),
                        "unterminated block comment",
                    )));
                }
            }
        }
        Ok(())
    }

    /// An identifier, reserved word, or module-qualified name.
    fn lex_word(&mut self) -> Result<TokenKind> {
        let word = self.take_ident();
        if let Some(kind) = reserved(&word) {
            return Ok(kind);
        }
        let upper = word.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if !upper {
            if word == "_" {
                return Ok(TokenKind::Underscore);
            }
            return Ok(TokenKind::VarId(word));
        }

        // A conid followed by `.` and another name is a qualifier. Module
        // names may themselves be dotted (`Data.List.map`).
        let mut qualifier = word;
        loop {
            if self.peek_byte(0) != Some(b'.') {
                return Ok(TokenKind::ConId(qualifier));
            }
            let next = self.source[self.pos + 1..].chars().next();
            match next {
                Some(c) if is_ident_start(c) => {
                    self.pos += 1;
                    let part = self.take_ident();
                    let upper = part.chars().next().is_some_and(|c| c.is_ascii_uppercase());
                    if upper {
                        qualifier = format!("{qualifier}.{part}");
                        continue;
                    }
                    return Ok(TokenKind::QVarId(qualifier, part));
                }
                Some(c) if is_symbol_char(c) && c != '.' => {
                    self.pos += 1;
                    let sym = self.take_symbol();
                    return Ok(TokenKind::QSym(qualifier, sym));
                }
                _ => return Ok(TokenKind::ConId(qualifier)),
            }
        }
    }

    fn take_ident(&mut self) -> String {
        let start = self.pos;
        if self.peek_char().is_some_and(is_ident_start) {
            self.bump();
            while self.peek_char().is_some_and(is_ident_char) {
                self.bump();
            }
        }
        self.source[start..self.pos].to_string()
    }

    fn take_symbol(&mut self) -> String {
        let start = self.pos;
        while self.peek_char().is_some_and(is_symbol_char) {
            self.bump();
        }
        self.source[start..self.pos].to_string()
    }

    fn lex_symbol(&mut self) -> TokenKind {
        let sym = self.take_symbol();
        match sym.as_str() {
            "=" => TokenKind::Equals,
            "::" => TokenKind::DoubleColon,
            "->" => TokenKind::Arrow,
            "=>" => TokenKind::FatArrow,
            "\\" => TokenKind::Backslash,
            "|" => TokenKind::Bar,
            _ => TokenKind::Sym(sym),
        }
    }

    fn lex_number(&mut self, reporter: &mut Reporter) -> Result<TokenKind> {
        let start = self.pos;
        let (radix, digits_start) = if self.peek_byte(0) == Some(b'0')
            && matches!(self.peek_byte(1), Some(b'x' | b'X'))
        {
            self.pos += 2;
            (16, self.pos)
        } else if self.peek_byte(0) == Some(b'0') && matches!(self.peek_byte(1), Some(b'o' | b'O'))
        {
            self.pos += 2;
            (8, self.pos)
        } else {
            (10, self.pos)
        };
        while self
            .peek_char()
            .is_some_and(|c| c.is_digit(radix) || (radix == 10 && c.is_ascii_digit()))
        {
            self.bump();
        }
        let text = &self.source[digits_start..self.pos];
        match i64::from_str_radix(text, radix) {
            Ok(value) => Ok(TokenKind::IntLit(value)),
            Err(_) => Err(reporter.report_fatal(Diagnostic::error(
                self.file,
                Span::new(start as u32, self.u32_pos()),
                "invalid integer literal",
            ))),
        }
    }

    fn lex_string(&mut self, reporter: &mut Reporter) -> Result<TokenKind> {
        let start = self.u32_pos();
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::StringLit(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('\'') => value.push('\''),
                    Some(other) => {
                        return Err(reporter.report_fatal(Diagnostic::error(
                            self.file,
                            Span::new(self.u32_pos() - 1, self.u32_pos()),
                            format!("unsupported escape sequence '\\{other}'"),
                        )));
                    }
                    None => {
                        return Err(reporter.report_fatal(Diagnostic::error(
                            self.file,
                            Span::new(start, self.u32_pos()),
                            "unterminated string literal",
                        )));
                    }
                },
                Some('\n') | None => {
                    return Err(reporter.report_fatal(Diagnostic::error(
                        self.file,
                        Span::new(start, self.u32_pos()),
                        "unterminated string literal",
                    )));
                }
                Some(other) => value.push(other),
            }
        }
    }

    fn lex_punct(&mut self, c: char, reporter: &mut Reporter) -> Result<TokenKind> {
        let start = self.u32_pos();
        self.bump();
        Ok(match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '`' => {
                return Err(reporter.report_fatal(Diagnostic::error(
                    self.file,
                    Span::new(start, self.u32_pos()),
                    "infix backtick application is not supported",
                )));
            }
            other => {
                return Err(reporter.report_fatal(Diagnostic::error(
                    self.file,
                    Span::new(start, self.u32_pos()),
                    format!("unexpected character '{other}'"),
                )));
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/lexer.rs"]
mod tests;
