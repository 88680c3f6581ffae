//! Scans source text into a flat token stream.

use webclv_source::{DiagnosticBag, FileId, Kind, SourceRange};

use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    text: &'a [u8],
    file: FileId,
    pos: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(text: &'a str, file: FileId) -> Self {
        Self {
            text: text.as_bytes(),
            file,
            pos: 0,
        }
    }

    /// Scan the whole file. Unsupported preprocessor directives are skipped
    /// with an advisory warning rather than rejected outright, since the
    /// host front end does not implement preprocessing (section 10.2).
    pub fn tokenize(mut self, diagnostics: &mut DiagnosticBag) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia(diagnostics);
            let start = self.pos;
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: self.range(start, start),
                });
                break;
            };

            if is_ident_start(c) {
                tokens.push(self.scan_ident(start));
                continue;
            }
            if c.is_ascii_digit() {
                tokens.push(self.scan_number(start));
                continue;
            }
            tokens.push(self.scan_punct(start, diagnostics));
        }
        tokens
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos as usize).copied()
    }

    fn peek_at(&self, offset: u32) -> Option<u8> {
        self.text.get((self.pos + offset) as usize).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn range(&self, start: u32, end: u32) -> SourceRange {
        SourceRange::new(self.file, start, end)
    }

    fn skip_trivia(&mut self, diagnostics: &mut DiagnosticBag) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while self.peek().is_some() && !(self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/')) {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.text.len() as u32);
                }
                Some(b'#') if self.at_line_start() => {
                    let start = self.pos;
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                    diagnostics.warning(
                        Kind::Setup,
                        "preprocessor directive ignored; the host front end does not preprocess",
                        Some(self.range(start, self.pos).start_loc()),
                    );
                }
                _ => break,
            }
        }
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.text.get(self.pos as usize - 1) == Some(&b'\n')
    }

    fn scan_ident(&mut self, start: u32) -> Token {
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.text[start as usize..self.pos as usize])
            .unwrap_or_default()
            .to_string();
        Token {
            kind: TokenKind::Ident(text),
            span: self.range(start, self.pos),
        }
    }

    fn scan_number(&mut self, start: u32) -> Token {
        let mut is_float = false;
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.text[start as usize + 2..self.pos as usize]).unwrap_or_default();
            let value = i64::from_str_radix(text, 16).unwrap_or(0);
            return Token {
                kind: TokenKind::IntLit(value),
                span: self.range(start, self.pos),
            };
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'f' | b'F' | b'u' | b'U' | b'l' | b'L')) {
            // numeric suffix, not part of the literal's value
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.text[start as usize..self.pos as usize]).unwrap_or_default();
        let digits: String = text.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
        let kind = if is_float {
            TokenKind::FloatLit(digits.parse().unwrap_or(0.0))
        } else {
            TokenKind::IntLit(digits.parse().unwrap_or(0))
        };
        Token {
            kind,
            span: self.range(start, self.pos),
        }
    }

    fn scan_punct(&mut self, start: u32, diagnostics: &mut DiagnosticBag) -> Token {
        let two = (self.peek(), self.peek_at(1));
        let (kind, len) = match two {
            (Some(b'='), Some(b'=')) => (TokenKind::EqEq, 2),
            (Some(b'!'), Some(b'=')) => (TokenKind::NotEq, 2),
            (Some(b'<'), Some(b'=')) => (TokenKind::Le, 2),
            (Some(b'>'), Some(b'=')) => (TokenKind::Ge, 2),
            (Some(b'&'), Some(b'&')) => (TokenKind::AndAnd, 2),
            (Some(b'|'), Some(b'|')) => (TokenKind::OrOr, 2),
            (Some(b'+'), Some(b'+')) => (TokenKind::PlusPlus, 2),
            (Some(b'-'), Some(b'-')) => (TokenKind::MinusMinus, 2),
            (Some(b'-'), Some(b'>')) => (TokenKind::Arrow, 2),
            (Some(b'<'), Some(b'<')) => (TokenKind::Shl, 2),
            (Some(b'>'), Some(b'>')) => (TokenKind::Shr, 2),
            (Some(c), _) => (single_punct(c), 1),
            (None, _) => (TokenKind::Eof, 0),
        };
        if matches!(kind, TokenKind::Unknown) {
            diagnostics.fatal(
                Kind::Setup,
                format!("unexpected character {:?}", self.peek().map(char::from)),
                Some(self.range(start, start + 1).start_loc()),
            );
        }
        for _ in 0..len.max(1) {
            self.pos += 1;
        }
        Token {
            kind,
            span: self.range(start, self.pos),
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn single_punct(c: u8) -> TokenKind {
    match c {
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b',' => TokenKind::Comma,
        b';' => TokenKind::Semi,
        b'.' => TokenKind::Dot,
        b'+' => TokenKind::Plus,
        b'-' => TokenKind::Minus,
        b'*' => TokenKind::Star,
        b'/' => TokenKind::Slash,
        b'%' => TokenKind::Percent,
        b'&' => TokenKind::Amp,
        b'|' => TokenKind::Pipe,
        b'^' => TokenKind::Caret,
        b'~' => TokenKind::Tilde,
        b'!' => TokenKind::Not,
        b'=' => TokenKind::Eq,
        b'<' => TokenKind::Lt,
        b'>' => TokenKind::Gt,
        _ => TokenKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webclv_source::FileId;

    fn lex(src: &str) -> Vec<TokenKind> {
        let mut diags = DiagnosticBag::new();
        Lexer::new(src, FileId::new(0))
            .tokenize(&mut diags)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_kernel_signature() {
        let kinds = lex("__kernel void k(__global int *a)");
        assert!(matches!(kinds[0], TokenKind::Ident(ref s) if s == "__kernel"));
        assert!(kinds.contains(&TokenKind::Star));
        assert!(matches!(kinds.last().unwrap(), TokenKind::Eof));
    }

    #[test]
    fn scans_multichar_operators() {
        let kinds = lex("a == b && c != d");
        assert!(kinds.contains(&TokenKind::EqEq));
        assert!(kinds.contains(&TokenKind::AndAnd));
        assert!(kinds.contains(&TokenKind::NotEq));
    }

    #[test]
    fn preprocessor_lines_are_skipped() {
        let mut diags = DiagnosticBag::new();
        let tokens = Lexer::new("#include <foo>\nint x;", FileId::new(0)).tokenize(&mut diags);
        assert!(tokens.iter().any(|t| matches!(&t.kind, TokenKind::Ident(s) if s == "int")));
        assert_eq!(diags.len(), 1);
    }
}
