//! Asset definition grammar.
//!
//! `objects.txt` groups numbered frame files into named, timed sequences:
//!
//! ```text
//! file     := asset*
//! asset    := NAME ["(" NUMBER ")"] ":" "{" sequence* "}"
//! sequence := NAME "(" NUMBER ")" "=" "[" value ("," value)* "]"
//! value    := INDEX ["(" INT "," INT ")"]
//! ```
//!
//! The optional number after an asset name is its scale (1.0 when omitted).
//! The number after a sequence name is the per-frame interval in
//! milliseconds. Each value is an index into the asset's frame list with an
//! optional pixel offset. Whitespace between tokens is ignored.
//!
//! [`parse`] produces an [`AssetDefinition`] tree. Nothing is loaded here;
//! see [`AssetManager`](crate::resources::assetmanager::AssetManager) for the
//! step that resolves frame indices against files on disk. The tree prints
//! back to the same grammar through [`fmt::Display`].

use std::fmt;

use serde::Serialize;

use crate::error::ParseError;

/// A parsed `objects.txt`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AssetDefinition {
    pub assets: Vec<AssetDecl>,
}

/// One `name(scale): { ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDecl {
    pub name: String,
    pub scale: Option<f64>,
    pub sequences: Vec<SequenceDecl>,
}

impl AssetDecl {
    pub fn effective_scale(&self) -> f64 {
        self.scale.unwrap_or(1.0)
    }
}

/// One `name(interval) = [ ... ]` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceDecl {
    pub name: String,
    pub interval_ms: f64,
    pub frames: Vec<FrameRef>,
}

/// One value in a sequence list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRef {
    pub index: usize,
    pub offset: Option<(i32, i32)>,
}

impl FrameRef {
    pub fn resolved_offset(&self) -> (i32, i32) {
        self.offset.unwrap_or((0, 0))
    }
}

/// Parse the contents of an `objects.txt`.
pub fn parse(source: &str) -> Result<AssetDefinition, ParseError> {
    let tokens = tokenize(source)?;
    Parser::new(tokens, end_position(source)).definition()
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    Minus,
    Colon,
    Equals,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "'{w}'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Equals => f.write_str("'='"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn end_position(source: &str) -> (usize, usize) {
    let line = source.lines().count().max(1);
    let column = source.lines().last().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let (mut line, mut column) = (1usize, 1usize);

    while let Some(&c) = chars.peek() {
        let (start_line, start_column) = (line, column);
        if c == '\n' {
            chars.next();
            line += 1;
            column = 1;
            continue;
        }
        if c.is_whitespace() {
            chars.next();
            column += 1;
            continue;
        }

        let kind = if is_word_char(c) {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                word.push(c);
                chars.next();
                column += 1;
            }
            // A digit run may continue as a decimal: "2.5".
            if word.chars().all(|c| c.is_ascii_digit()) && chars.peek() == Some(&'.') {
                word.push('.');
                chars.next();
                column += 1;
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    word.push(c);
                    chars.next();
                    column += 1;
                }
            }
            TokenKind::Word(word)
        } else {
            let kind = match c {
                '-' => TokenKind::Minus,
                ':' => TokenKind::Colon,
                '=' => TokenKind::Equals,
                ',' => TokenKind::Comma,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                other => {
                    return Err(ParseError::new(
                        line,
                        column,
                        format!("unexpected character '{other}'"),
                    ));
                }
            };
            chars.next();
            column += 1;
            kind
        };

        tokens.push(Token {
            kind,
            line: start_line,
            column: start_column,
        });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: (usize, usize),
}

impl Parser {
    fn new(tokens: Vec<Token>, end: (usize, usize)) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
        }
    }

    fn definition(mut self) -> Result<AssetDefinition, ParseError> {
        let mut assets = Vec::new();
        while self.peek().is_some() {
            assets.push(self.asset()?);
        }
        Ok(AssetDefinition { assets })
    }

    fn asset(&mut self) -> Result<AssetDecl, ParseError> {
        let name = self.name("asset name")?;
        let scale = if self.eat(&TokenKind::LParen) {
            let scale = self.number("asset scale")?;
            self.expect(TokenKind::RParen)?;
            Some(scale)
        } else {
            None
        };
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::LBrace)?;

        let mut sequences = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(self.error_here(format!("unterminated asset '{name}', expected '}}'")));
            }
            sequences.push(self.sequence()?);
        }

        Ok(AssetDecl {
            name,
            scale,
            sequences,
        })
    }

    fn sequence(&mut self) -> Result<SequenceDecl, ParseError> {
        let name = self.name("sequence name")?;
        self.expect(TokenKind::LParen)?;
        let interval_ms = self.number("frame interval")?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LBracket)?;

        let mut frames = vec![self.value()?];
        while self.eat(&TokenKind::Comma) {
            frames.push(self.value()?);
        }
        self.expect(TokenKind::RBracket)?;

        Ok(SequenceDecl {
            name,
            interval_ms,
            frames,
        })
    }

    fn value(&mut self) -> Result<FrameRef, ParseError> {
        let index = self.index()?;
        let offset = if self.eat(&TokenKind::LParen) {
            let x = self.int()?;
            self.expect(TokenKind::Comma)?;
            let y = self.int()?;
            self.expect(TokenKind::RParen)?;
            Some((x, y))
        } else {
            None
        };
        Ok(FrameRef { index, offset })
    }

    fn name(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if w.chars().all(is_word_char) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn number(&mut self, what: &str) -> Result<f64, ParseError> {
        let parsed = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if w.starts_with(|c: char| c.is_ascii_digit()) => {
                w.parse::<f64>().ok()
            }
            _ => None,
        };
        match parsed {
            Some(n) => {
                self.pos += 1;
                Ok(n)
            }
            None => Err(self.unexpected(what)),
        }
    }

    fn index(&mut self) -> Result<usize, ParseError> {
        let parsed = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if w.chars().all(|c| c.is_ascii_digit()) => {
                w.parse::<usize>().ok()
            }
            _ => None,
        };
        match parsed {
            Some(n) => {
                self.pos += 1;
                Ok(n)
            }
            None => Err(self.unexpected("frame index")),
        }
    }

    fn int(&mut self) -> Result<i32, ParseError> {
        let negative = self.eat(&TokenKind::Minus);
        let parsed = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) if w.chars().all(|c| c.is_ascii_digit()) => {
                let digits = if negative { format!("-{w}") } else { w.clone() };
                digits.parse::<i32>().ok()
            }
            _ => None,
        };
        match parsed {
            Some(n) => {
                self.pos += 1;
                Ok(n)
            }
            None => Err(self.unexpected("integer offset")),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(t) => ParseError::new(
                t.line,
                t.column,
                format!("expected {expected}, found {}", t.kind),
            ),
            None => self.error_here(format!("expected {expected}, found end of file")),
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        let (line, column) = self
            .peek()
            .map_or(self.end, |t| (t.line, t.column));
        ParseError::new(line, column, message)
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if let Some((x, y)) = self.offset {
            write!(f, "({x},{y})")?;
        }
        Ok(())
    }
}

impl fmt::Display for SequenceDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) = [", self.name, self.interval_ms)?;
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{frame}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for AssetDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(scale) = self.scale {
            write!(f, "({scale})")?;
        }
        writeln!(f, ": {{")?;
        for sequence in &self.sequences {
            writeln!(f, "    {sequence}")?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for AssetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, asset) in self.assets.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{asset}")?;
        }
        Ok(())
    }
}
