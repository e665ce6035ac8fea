//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose – each error carries its
//! class, a message, and the offending source line with a caret pointing at
//! the byte where the problem was detected. The three variants mirror the
//! three stages that can fail: scanning, grammar, and the symbol/label
//! checks layered on top of the grammar.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  #[snafu(display("lexing error: {message}\n{source_line}\n{marker}"))]
  Lexical {
    message: String,
    source_line: String,
    marker: String,
  },

  #[snafu(display("syntax error: {message}\n{source_line}\n{marker}"))]
  Syntax {
    message: String,
    source_line: String,
    marker: String,
  },

  #[snafu(display("semantic error: {message}\n{source_line}\n{marker}"))]
  Semantic {
    message: String,
    source_line: String,
    marker: String,
  },
}

impl CompileError {
  /// Construct a lexical error anchored at a byte offset in the source.
  pub fn lexical(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let (source_line, marker) = render_context(source, loc);
    Self::Lexical {
      message: message.into(),
      source_line,
      marker,
    }
  }

  /// Construct a syntax error anchored at a byte offset in the source.
  pub fn syntax(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let (source_line, marker) = render_context(source, loc);
    Self::Syntax {
      message: message.into(),
      source_line,
      marker,
    }
  }

  /// Construct a semantic error anchored at a byte offset in the source.
  pub fn semantic(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let (source_line, marker) = render_context(source, loc);
    Self::Semantic {
      message: message.into(),
      source_line,
      marker,
    }
  }
}

/// Extract the line containing `loc` and build a caret marker underneath it.
fn render_context(source: &str, loc: usize) -> (String, String) {
  let safe_loc = loc.min(source.len());
  let line_start = source[..safe_loc].rfind('\n').map_or(0, |i| i + 1);
  let line_end = source[safe_loc..]
    .find('\n')
    .map_or(source.len(), |i| safe_loc + i);
  let line_no = source[..line_start].matches('\n').count() + 1;

  let prefix = format!("line {line_no}: ");
  let source_line = format!("{prefix}{}", &source[line_start..line_end]);
  let column = source[line_start..safe_loc].chars().count();
  let marker = format!("{}^", " ".repeat(prefix.chars().count() + column));
  (source_line, marker)
}
