//! Recursive-descent parser producing a statement list and expression AST.
//!
//! One function per grammar production, each advancing a bounded cursor over
//! the token vector – no token is ever un-consumed. The parser also owns the
//! semantic bookkeeping that rides along with the grammar: the symbol table
//! of declared variables (checked at every identifier read) and the two
//! label sets, where duplicate declarations fail immediately and dangling
//! GOTO references are checked once the whole program has been consumed.

use std::collections::HashSet;

use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind, describe_token, token_text};

/// Arithmetic operators inside expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Add => "+",
      Self::Sub => "-",
      Self::Mul => "*",
      Self::Div => "/",
    }
  }
}

/// Relational operators, legal only inside IF/WHILE conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

impl CompareOp {
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Eq => "==",
      Self::Ne => "!=",
      Self::Lt => "<",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Ge => ">=",
    }
  }
}

/// Expression tree produced by the parser.
///
/// Numbers keep their literal source text so the generated output reproduces
/// them byte for byte (`1.50` stays `1.50`).
#[derive(Debug, Clone)]
pub enum Expr {
  Num {
    text: String,
  },
  Var {
    name: String,
  },
  Neg {
    operand: Box<Expr>,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
}

impl Expr {
  pub fn num(text: impl Into<String>) -> Self {
    Self::Num { text: text.into() }
  }

  pub fn var(name: impl Into<String>) -> Self {
    Self::Var { name: name.into() }
  }

  pub fn neg(operand: Expr) -> Self {
    Self::Neg {
      operand: Box::new(operand),
    }
  }

  pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

/// A relational chain: the first operand followed by at least one
/// `operator operand` pair.
#[derive(Debug, Clone)]
pub struct Comparison {
  pub first: Expr,
  pub chain: Vec<(CompareOp, Expr)>,
}

/// Statements of the language, one variant per grammar alternative.
#[derive(Debug, Clone)]
pub enum Stmt {
  PrintText {
    text: String,
  },
  PrintExpr {
    value: Expr,
  },
  If {
    condition: Comparison,
    body: Vec<Stmt>,
  },
  While {
    condition: Comparison,
    body: Vec<Stmt>,
  },
  Label {
    name: String,
  },
  Goto {
    name: String,
  },
  Let {
    name: String,
    value: Expr,
  },
  Input {
    name: String,
  },
}

/// A fully validated program, ready for emission.
#[derive(Debug, Clone)]
pub struct Program {
  pub body: Vec<Stmt>,
  /// Variable names in first-declaration order. The order is observable: it
  /// fixes the order of the declarations in the generated header.
  pub variables: Vec<String>,
}

/// Parse a token stream into a [`Program`], validating the grammar, the
/// symbol table, and the label sets along the way.
pub fn parse(tokens: Vec<Token>, source: &str) -> CompileResult<Program> {
  Parser::new(tokens, source).parse_program()
}

struct Parser<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
  variables: Vec<String>,
  declared_labels: HashSet<String>,
  /// Every GOTO target in reference order, kept with its location so the
  /// end-of-program check reports the first dangling reference.
  referenced_labels: Vec<(String, usize)>,
}

impl<'a> Parser<'a> {
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
      variables: Vec::new(),
      declared_labels: HashSet::new(),
      referenced_labels: Vec::new(),
    }
  }

  /// program ::= { NEWLINE } { statement } EOF
  fn parse_program(mut self) -> CompileResult<Program> {
    while self.check(TokenKind::Newline) {
      self.advance();
    }

    let mut body = Vec::new();
    while !self.check(TokenKind::Eof) {
      body.push(self.statement()?);
    }

    for (name, loc) in &self.referenced_labels {
      if !self.declared_labels.contains(name) {
        return Err(CompileError::semantic(
          self.source,
          *loc,
          format!("GOTO to undeclared label \"{name}\""),
        ));
      }
    }

    Ok(Program {
      body,
      variables: self.variables,
    })
  }

  fn statement(&mut self) -> CompileResult<Stmt> {
    match self.current().kind {
      TokenKind::Print => {
        self.advance();
        let stmt = if self.check(TokenKind::Str) {
          let token = self.advance();
          Stmt::PrintText {
            text: self.text(&token).to_string(),
          }
        } else {
          Stmt::PrintExpr {
            value: self.expression()?,
          }
        };
        self.newline()?;
        Ok(stmt)
      }

      TokenKind::If => {
        self.advance();
        let condition = self.comparison()?;
        self.expect(TokenKind::Then)?;
        self.newline()?;
        let body = self.block(TokenKind::EndIf)?;
        self.newline()?;
        Ok(Stmt::If { condition, body })
      }

      TokenKind::While => {
        self.advance();
        let condition = self.comparison()?;
        self.expect(TokenKind::Repeat)?;
        self.newline()?;
        let body = self.block(TokenKind::EndWhile)?;
        self.newline()?;
        Ok(Stmt::While { condition, body })
      }

      TokenKind::Label => {
        self.advance();
        let token = self.expect(TokenKind::Ident)?;
        let name = self.text(&token).to_string();
        if !self.declared_labels.insert(name.clone()) {
          return Err(CompileError::semantic(
            self.source,
            token.loc,
            format!("label already declared: \"{name}\""),
          ));
        }
        self.newline()?;
        Ok(Stmt::Label { name })
      }

      TokenKind::Goto => {
        self.advance();
        let token = self.expect(TokenKind::Ident)?;
        let name = self.text(&token).to_string();
        self.referenced_labels.push((name.clone(), token.loc));
        self.newline()?;
        Ok(Stmt::Goto { name })
      }

      TokenKind::Let => {
        self.advance();
        let token = self.expect(TokenKind::Ident)?;
        let name = self.text(&token).to_string();
        self.expect(TokenKind::Eq)?;
        // The target is live before the right-hand side is parsed, so a
        // fresh variable may appear in its own initialiser.
        self.declare_variable(&name);
        let value = self.expression()?;
        self.newline()?;
        Ok(Stmt::Let { name, value })
      }

      TokenKind::Input => {
        self.advance();
        let token = self.expect(TokenKind::Ident)?;
        let name = self.text(&token).to_string();
        self.declare_variable(&name);
        self.newline()?;
        Ok(Stmt::Input { name })
      }

      _ => {
        let token = self.current();
        Err(CompileError::syntax(
          self.source,
          token.loc,
          format!(
            "expected a statement, but got {}",
            describe_token(&token, self.source)
          ),
        ))
      }
    }
  }

  /// Statements up to (and consuming) the block terminator.
  fn block(&mut self, terminator: TokenKind) -> CompileResult<Vec<Stmt>> {
    let mut body = Vec::new();
    while !self.check(terminator) {
      if self.check(TokenKind::Eof) {
        let token = self.current();
        return Err(CompileError::syntax(
          self.source,
          token.loc,
          format!("expected {}, but got end of input", terminator.describe()),
        ));
      }
      body.push(self.statement()?);
    }
    self.advance();
    Ok(body)
  }

  /// comparison ::= expression op expression { op expression }
  fn comparison(&mut self) -> CompileResult<Comparison> {
    let first = self.expression()?;

    if compare_op(self.current().kind).is_none() {
      let token = self.current();
      return Err(CompileError::syntax(
        self.source,
        token.loc,
        format!(
          "expected a comparison operator, but got {}",
          describe_token(&token, self.source)
        ),
      ));
    }

    let mut chain = Vec::new();
    while let Some(op) = compare_op(self.current().kind) {
      self.advance();
      let rhs = self.expression()?;
      chain.push((op, rhs));
    }

    Ok(Comparison { first, chain })
  }

  /// expression ::= term { ("+"|"-") term }
  fn expression(&mut self) -> CompileResult<Expr> {
    let mut node = self.term()?;

    loop {
      let op = match self.current().kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        _ => break,
      };
      self.advance();
      let rhs = self.term()?;
      node = Expr::binary(op, node, rhs);
    }

    Ok(node)
  }

  /// term ::= unary { ("*"|"/") unary }
  fn term(&mut self) -> CompileResult<Expr> {
    let mut node = self.unary()?;

    loop {
      let op = match self.current().kind {
        TokenKind::Asterisk => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        _ => break,
      };
      self.advance();
      let rhs = self.unary()?;
      node = Expr::binary(op, node, rhs);
    }

    Ok(node)
  }

  /// unary ::= [ "+" | "-" ] primary
  fn unary(&mut self) -> CompileResult<Expr> {
    if self.check(TokenKind::Plus) {
      // Unary plus is the identity; accept and drop it.
      self.advance();
      return self.primary();
    }

    if self.check(TokenKind::Minus) {
      self.advance();
      return Ok(Expr::neg(self.primary()?));
    }

    self.primary()
  }

  /// primary ::= NUMBER | IDENT
  fn primary(&mut self) -> CompileResult<Expr> {
    let token = self.current();
    match token.kind {
      TokenKind::Number => {
        self.advance();
        Ok(Expr::num(self.text(&token)))
      }
      TokenKind::Ident => {
        let name = self.text(&token);
        if !self.is_declared(name) {
          return Err(CompileError::semantic(
            self.source,
            token.loc,
            format!("referencing variable before assignment: \"{name}\""),
          ));
        }
        self.advance();
        Ok(Expr::var(name))
      }
      _ => Err(CompileError::syntax(
        self.source,
        token.loc,
        format!(
          "expected a number or identifier, but got {}",
          describe_token(&token, self.source)
        ),
      )),
    }
  }

  /// nl ::= NEWLINE { NEWLINE }
  fn newline(&mut self) -> CompileResult<()> {
    self.expect(TokenKind::Newline)?;
    while self.check(TokenKind::Newline) {
      self.advance();
    }
    Ok(())
  }

  fn declare_variable(&mut self, name: &str) {
    if !self.is_declared(name) {
      self.variables.push(name.to_string());
    }
  }

  fn is_declared(&self, name: &str) -> bool {
    self.variables.iter().any(|v| v == name)
  }

  /// The token under the cursor. The vector always ends with `Eof`, so a
  /// position past the end is reported as end of input rather than panicking.
  fn current(&self) -> Token {
    self
      .tokens
      .get(self.pos)
      .copied()
      .unwrap_or(Token::new(TokenKind::Eof, self.source.len(), 0))
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.current().kind == kind
  }

  /// Consume and return the current token; the cursor parks on `Eof`.
  fn advance(&mut self) -> Token {
    let token = self.current();
    if token.kind != TokenKind::Eof {
      self.pos += 1;
    }
    token
  }

  /// Consume the current token if it matches `kind`, else a syntax error.
  fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
    if self.check(kind) {
      Ok(self.advance())
    } else {
      let token = self.current();
      Err(CompileError::syntax(
        self.source,
        token.loc,
        format!(
          "expected {}, but got {}",
          kind.describe(),
          describe_token(&token, self.source)
        ),
      ))
    }
  }

  fn text(&self, token: &Token) -> &'a str {
    token_text(token, self.source)
  }
}

fn compare_op(kind: TokenKind) -> Option<CompareOp> {
  let op = match kind {
    TokenKind::EqEq => CompareOp::Eq,
    TokenKind::NotEq => CompareOp::Ne,
    TokenKind::Lt => CompareOp::Lt,
    TokenKind::LtEq => CompareOp::Le,
    TokenKind::Gt => CompareOp::Gt,
    TokenKind::GtEq => CompareOp::Ge,
    _ => return None,
  };
  Some(op)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokenizer::tokenize;

  fn parse_source(source: &str) -> CompileResult<Program> {
    parse(tokenize(source)?, source)
  }

  #[test]
  fn symbol_table_holds_assignment_targets_in_order() {
    let program = parse_source("LET a = 1\nINPUT b\nLET a = 2\nPRINT a\n").expect("parse failed");
    assert_eq!(program.variables, vec!["a".to_string(), "b".to_string()]);
  }

  #[test]
  fn rejects_identifier_read_before_assignment() {
    let err = parse_source("PRINT x\n").unwrap_err();
    assert!(matches!(err, CompileError::Semantic { .. }));
    assert!(err.to_string().contains("referencing variable before assignment"));
  }

  #[test]
  fn let_target_may_appear_in_its_own_initialiser() {
    parse_source("LET x = x + 1\n").expect("parse failed");
  }

  #[test]
  fn comparison_requires_a_relational_operator() {
    let err = parse_source("IF 1 THEN\nPRINT \"ok\"\nENDIF\n").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert!(err.to_string().contains("expected a comparison operator"));
  }

  #[test]
  fn comparison_operators_chain() {
    let program =
      parse_source("LET a = 1\nLET b = 2\nIF a>b>0 THEN\nPRINT a\nENDIF\n").expect("parse failed");
    let Some(Stmt::If { condition, .. }) = program.body.last() else {
      panic!("expected an IF statement");
    };
    assert_eq!(condition.chain.len(), 2);
  }

  #[test]
  fn duplicate_label_fails_immediately() {
    let err = parse_source("LABEL l\nLABEL l\n").unwrap_err();
    assert!(matches!(err, CompileError::Semantic { .. }));
    assert!(err.to_string().contains("label already declared"));
  }

  #[test]
  fn goto_may_reference_a_later_label() {
    parse_source("GOTO fwd\nPRINT 1\nLABEL fwd\n").expect("parse failed");
  }

  #[test]
  fn dangling_goto_is_reported_at_end_of_program() {
    let err = parse_source("GOTO nowhere\n").unwrap_err();
    assert!(matches!(err, CompileError::Semantic { .. }));
    assert!(err.to_string().contains("GOTO to undeclared label"));
  }

  #[test]
  fn missing_then_is_a_syntax_error() {
    let err = parse_source("IF 1 > 0 REPEAT\n").unwrap_err();
    assert!(err.to_string().contains("expected THEN"));
  }

  #[test]
  fn unterminated_block_reports_missing_terminator() {
    let err = parse_source("WHILE 1 > 0 REPEAT\nPRINT 1\n").unwrap_err();
    assert!(err.to_string().contains("expected ENDWHILE"));
  }

  #[test]
  fn empty_program_is_legal() {
    let program = parse_source("\n\n").expect("parse failed");
    assert!(program.body.is_empty());
    assert!(program.variables.is_empty());
  }

  #[test]
  fn statement_must_start_with_a_keyword() {
    let err = parse_source("THEN\n").unwrap_err();
    assert!(err.to_string().contains("expected a statement"));
  }
}
