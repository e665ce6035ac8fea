//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer is intentionally tiny – it knows nothing about semantics
//! beyond recognising operators, literals, and the fixed keyword set.
//! Newlines are significant (they terminate statements) and are emitted as
//! tokens of their own; every other whitespace character is skipped.
//! Multi-character operators are matched with one byte of lookahead before
//! single-character ones to avoid ambiguity.

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Eof,
  Newline,
  Number,
  Ident,
  Str,
  // Keywords
  Label,
  Goto,
  Print,
  Input,
  Let,
  If,
  Then,
  EndIf,
  While,
  Repeat,
  EndWhile,
  // Operators
  Eq,
  Plus,
  Minus,
  Asterisk,
  Slash,
  EqEq,
  NotEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
}

impl TokenKind {
  /// Wording used on the "expected …" side of diagnostics.
  pub fn describe(self) -> &'static str {
    match self {
      Self::Eof => "end of input",
      Self::Newline => "newline",
      Self::Number => "a number",
      Self::Ident => "an identifier",
      Self::Str => "a string",
      Self::Label => "LABEL",
      Self::Goto => "GOTO",
      Self::Print => "PRINT",
      Self::Input => "INPUT",
      Self::Let => "LET",
      Self::If => "IF",
      Self::Then => "THEN",
      Self::EndIf => "ENDIF",
      Self::While => "WHILE",
      Self::Repeat => "REPEAT",
      Self::EndWhile => "ENDWHILE",
      Self::Eq => "\"=\"",
      Self::Plus => "\"+\"",
      Self::Minus => "\"-\"",
      Self::Asterisk => "\"*\"",
      Self::Slash => "\"/\"",
      Self::EqEq => "\"==\"",
      Self::NotEq => "\"!=\"",
      Self::Lt => "\"<\"",
      Self::LtEq => "\"<=\"",
      Self::Gt => "\">\"",
      Self::GtEq => "\">=\"",
    }
  }
}

/// Map a completed identifier run to its keyword kind, if it is one.
/// Matching is exact and case-sensitive: `print` is an identifier.
fn keyword_kind(text: &str) -> Option<TokenKind> {
  let kind = match text {
    "LABEL" => TokenKind::Label,
    "GOTO" => TokenKind::Goto,
    "PRINT" => TokenKind::Print,
    "INPUT" => TokenKind::Input,
    "LET" => TokenKind::Let,
    "IF" => TokenKind::If,
    "THEN" => TokenKind::Then,
    "ENDIF" => TokenKind::EndIf,
    "WHILE" => TokenKind::While,
    "REPEAT" => TokenKind::Repeat,
    "ENDWHILE" => TokenKind::EndWhile,
    _ => return None,
  };
  Some(kind)
}

/// Thin wrapper for lexical information needed by later stages.
///
/// Tokens borrow nothing: they record a byte span into the source and the
/// text is recovered with [`token_text`]. For string literals the span
/// covers the body only, quotes excluded.
#[derive(Debug, Clone, Copy)]
pub struct Token {
  pub kind: TokenKind,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  /// Convenience constructor to keep the `tokenize` loop readable.
  pub fn new(kind: TokenKind, loc: usize, len: usize) -> Self {
    Self { kind, loc, len }
  }
}

/// Lex the input into a flat vector of tokens terminated by an `Eof` marker.
///
/// The caller is expected to hand in newline-terminated source (the pipeline
/// entry point appends one) so that the last statement always ends in a
/// `Newline` token.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];

    // Inter-token whitespace; newline is a token, not whitespace.
    if c == b' ' || c == b'\t' || c == b'\r' {
      i += 1;
      continue;
    }

    // Whole-line comment, consumed up to the newline.
    if c == b'#' {
      while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
      }
      continue;
    }

    if c == b'\n' {
      tokens.push(Token::new(TokenKind::Newline, i, 1));
      i += 1;
      continue;
    }

    let single = match c {
      b'+' => Some(TokenKind::Plus),
      b'-' => Some(TokenKind::Minus),
      b'*' => Some(TokenKind::Asterisk),
      b'/' => Some(TokenKind::Slash),
      _ => None,
    };
    if let Some(kind) = single {
      tokens.push(Token::new(kind, i, 1));
      i += 1;
      continue;
    }

    // Two-character-or-one operators, split on one byte of lookahead.
    if matches!(c, b'=' | b'<' | b'>') {
      let (kind, len) = if bytes.get(i + 1) == Some(&b'=') {
        let kind = match c {
          b'=' => TokenKind::EqEq,
          b'<' => TokenKind::LtEq,
          _ => TokenKind::GtEq,
        };
        (kind, 2)
      } else {
        let kind = match c {
          b'=' => TokenKind::Eq,
          b'<' => TokenKind::Lt,
          _ => TokenKind::Gt,
        };
        (kind, 1)
      };
      tokens.push(Token::new(kind, i, len));
      i += len;
      continue;
    }

    // `!` is only legal as the first half of `!=`.
    if c == b'!' {
      if bytes.get(i + 1) == Some(&b'=') {
        tokens.push(Token::new(TokenKind::NotEq, i, 2));
        i += 2;
        continue;
      }
      let message = match input[i + 1..].chars().next() {
        Some(next) => format!("expected !=, got !{next}"),
        None => "expected !=, got end of input".to_string(),
      };
      return Err(CompileError::lexical(input, i, message));
    }

    if c == b'"' {
      let start = i + 1;
      let mut j = start;
      loop {
        match bytes.get(j) {
          None => {
            return Err(CompileError::lexical(input, i, "unterminated string"));
          }
          Some(b'"') => break,
          Some(&illegal) if matches!(illegal, b'\r' | b'\n' | b'\t' | b'\\' | b'%') => {
            return Err(CompileError::lexical(
              input,
              j,
              format!("illegal character in string: {:?}", illegal as char),
            ));
          }
          Some(_) => j += 1,
        }
      }
      tokens.push(Token::new(TokenKind::Str, start, j - start));
      i = j + 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      if bytes.get(i) == Some(&b'.') {
        i += 1;
        // A decimal point must be followed by at least one digit.
        if !bytes.get(i).is_some_and(u8::is_ascii_digit) {
          return Err(CompileError::lexical(
            input,
            i,
            "illegal character in number",
          ));
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
          i += 1;
        }
      }
      tokens.push(Token::new(TokenKind::Number, start, i - start));
      continue;
    }

    if c.is_ascii_alphabetic() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
      }
      let kind = keyword_kind(&input[start..i]).unwrap_or(TokenKind::Ident);
      tokens.push(Token::new(kind, start, i - start));
      continue;
    }

    let invalid_char = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::lexical(
      input,
      i,
      format!("unknown token: '{invalid_char}'"),
    ));
  }

  tokens.push(Token::new(TokenKind::Eof, input.len(), 0));
  Ok(tokens)
}

/// Return the slice from the source that produced this token.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  let end = token.loc + token.len;
  &source[token.loc..end]
}

/// Human-friendly description used on the "got …" side of diagnostics.
pub fn describe_token(token: &Token, source: &str) -> String {
  match token.kind {
    TokenKind::Eof => "end of input".to_string(),
    TokenKind::Newline => "newline".to_string(),
    _ => format!("\"{}\"", token_text(token, source)),
  }
}
