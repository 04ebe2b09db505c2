//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It transforms a source string into a sequence of `Token<'a>`s, skipping whitespace
//! and comments, and emitting exactly one `EOF` token at the end. Designed as a `FusedIterator`,
//! it can be chained safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token<'a>, LoxError>` on each `.next()`, where `Ok(token)` is a scanned token
//!   and `Err` reports a lexing error with line information. An error never ends the
//!   stream: the scanner resumes with the next character.
//!
//! - `scan_tokens(src, &mut Diagnostics) -> Vec<Token<'a>>`
//!   Drains the iterator, reporting every error and keeping every token.
//!
//! # Token Recognition (`scan_token`)
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=`.
//! - Comments: `//` to end-of-line and `/* … */` blocks spanning lines.
//! - String literals: `"` … `"`, allowing multi‑line and reporting unterminated errors.
//! - Numeric literals: integer and optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash `KEYWORDS` map.
//!
//! Line comments are skipped with `memchr`; lexemes are zero‑copy slices of the source.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{Diagnostics, LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// A single pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.  The lifetime `'a` ties every emitted token’s
/// `lexeme` slice back to the original source.
pub struct Scanner<'a> {
    text: &'a str,
    src: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to examine.
    curr: usize,
    line: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            src: text.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            done: false,
        }
    }

    // ───────────────────────────── cursor ──────────────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Byte `offset` positions ahead of the cursor, or `0` past the end.
    #[inline(always)]
    fn byte_at(&self, offset: usize) -> u8 {
        self.src.get(self.curr + offset).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b: u8 = self.byte_at(0);
        self.curr += 1;
        if b == b'\n' {
            self.line += 1;
        }
        b
    }

    #[inline(always)]
    fn eat(&mut self, expected: u8) -> bool {
        let hit: bool = !self.is_at_end() && self.byte_at(0) == expected;
        if hit {
            self.curr += 1;
        }
        hit
    }

    /// `long` when the next byte is `=`, otherwise `short`.
    fn with_equal(&mut self, long: TokenType, short: TokenType) -> TokenType {
        if self.eat(b'=') {
            long
        } else {
            short
        }
    }

    // ───────────────────────────── lexing ──────────────────────────────────

    /// Scans one lexeme starting at `self.start`.  Whitespace and comments
    /// produce `Ok(None)`.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let token_type: TokenType = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.with_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b' ' | b'\r' | b'\t' | b'\n' => return Ok(None),

            b'/' if self.eat(b'/') => {
                // Stop at the newline; the next call counts it.
                let rest: &[u8] = &self.src[self.curr..];
                self.curr += memchr(b'\n', rest).unwrap_or(rest.len());
                return Ok(None);
            }

            b'/' if self.eat(b'*') => {
                self.skip_block_comment()?;
                return Ok(None);
            }

            b'/' => TokenType::SLASH,

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // One error per code point, not per byte.
                let ch: char = self.text[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.curr = self.start + ch.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        };

        Ok(Some(token_type))
    }

    /// Block comments do not nest.  The opening `/*` is already consumed.
    fn skip_block_comment(&mut self) -> Result<()> {
        while !self.is_at_end() {
            if self.byte_at(0) == b'*' && self.byte_at(1) == b'/' {
                self.curr += 2;
                return Ok(());
            }
            self.bump();
        }

        Err(LoxError::lex(self.line, "Unterminated block comment."))
    }

    /// String literals may span lines; the payload excludes the quotes.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.byte_at(0) != b'"' {
            self.bump();
        }

        if !self.eat(b'"') {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        let contents: &str = &self.text[self.start + 1..self.curr - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn skip_digits(&mut self) {
        while self.byte_at(0).is_ascii_digit() {
            self.curr += 1;
        }
    }

    /// `123` or `3.14`; a trailing `.` is not part of the number.
    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.byte_at(0) == b'.' && self.byte_at(1).is_ascii_digit() {
            self.curr += 1;
            self.skip_digits();
        }

        let lexeme: &str = &self.text[self.start..self.curr];
        TokenType::NUMBER(lexeme.parse().unwrap_or_default())
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.byte_at(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.curr += 1;
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.curr;

            match self.scan_token() {
                Ok(Some(token_type)) => {
                    let lexeme: &'a str = &self.text[self.start..self.curr];
                    debug!("Scanned token ({:?}) on line {}", token_type, self.line);

                    return Some(Ok(Token::new(token_type, lexeme, self.line)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan `text` to completion, reporting each lexical error to `diagnostics`.
/// The returned vector always ends with an `EOF` token.
pub fn scan_tokens<'a>(text: &'a str, diagnostics: &mut Diagnostics) -> Vec<Token<'a>> {
    let mut tokens: Vec<Token<'a>> = Vec::new();

    for result in Scanner::new(text) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => diagnostics.report(e),
        }
    }

    info!("Scanned {} tokens", tokens.len());

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<&'static str> {
        Scanner::new(text)
            .filter_map(Result::ok)
            .map(|t| t.token_type.name())
            .collect()
    }

    #[test]
    fn block_comments_count_lines() {
        let tokens: Vec<_> = Scanner::new("/* one\ntwo\n*/ x")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].lexeme, "x");
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn line_comment_runs_to_newline() {
        assert_eq!(kinds("a // b c\nd"), vec!["IDENTIFIER", "IDENTIFIER", "EOF"]);
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens("/* never closed", &mut diagnostics);

        assert_eq!(tokens.len(), 1);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn number_without_fraction_digits_leaves_dot() {
        assert_eq!(kinds("12."), vec!["NUMBER", "DOT", "EOF"]);
    }

    #[test]
    fn keywords_need_longest_match() {
        assert_eq!(kinds("or orchid"), vec!["OR", "IDENTIFIER", "EOF"]);
    }

    #[test]
    fn multibyte_unexpected_character_is_one_error() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens("é;", &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::SEMICOLON);
    }
}
