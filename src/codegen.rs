//! Code generation: lower the parsed AST into a C translation unit.
//!
//! The emitter keeps two append-only text regions. Declarations land in the
//! header (the prologue plus one `float` per variable, in declaration
//! order); statements land in the code region. The regions are concatenated
//! exactly once, after the whole program has been emitted, so no partial
//! output can ever escape. Emission is infallible: every check that could
//! fail already ran in the parser.

use crate::parser::{Comparison, Expr, Program, Stmt};

/// Emit a C translation unit for a validated program.
pub fn generate(program: &Program) -> String {
  let mut emitter = Emitter::new();

  emitter.header_line("#include <stdio.h>");
  emitter.header_line("int main(void){");
  for name in &program.variables {
    emitter.header_line(&format!("float {name};"));
  }

  for stmt in &program.body {
    emit_stmt(stmt, &mut emitter);
  }

  emitter.line("return 0;");
  emitter.line("}");

  emitter.finish()
}

/// Two growable text regions, concatenated header-then-code at the end.
struct Emitter {
  header: String,
  code: String,
}

impl Emitter {
  fn new() -> Self {
    Self {
      header: String::new(),
      code: String::new(),
    }
  }

  fn emit(&mut self, text: &str) {
    self.code.push_str(text);
  }

  fn line(&mut self, text: &str) {
    self.code.push_str(text);
    self.code.push('\n');
  }

  fn header_line(&mut self, text: &str) {
    self.header.push_str(text);
    self.header.push('\n');
  }

  fn finish(mut self) -> String {
    self.header.push_str(&self.code);
    self.header
  }
}

fn emit_stmt(stmt: &Stmt, emitter: &mut Emitter) {
  match stmt {
    Stmt::PrintText { text } => {
      // The tokenizer banned every character that could form an escape or
      // format specifier, so the body is safe to inline verbatim.
      emitter.line(&format!("printf(\"{text}\\n\");"));
    }
    Stmt::PrintExpr { value } => {
      emitter.emit("printf(\"%.2f\\n\", (float)(");
      emit_expr(value, emitter);
      emitter.line("));");
    }
    Stmt::If { condition, body } => {
      emitter.emit("if(");
      emit_comparison(condition, emitter);
      emitter.line("){");
      for stmt in body {
        emit_stmt(stmt, emitter);
      }
      emitter.line("}");
    }
    Stmt::While { condition, body } => {
      emitter.emit("while(");
      emit_comparison(condition, emitter);
      emitter.line("){");
      for stmt in body {
        emit_stmt(stmt, emitter);
      }
      emitter.line("}");
    }
    Stmt::Label { name } => {
      // The trailing empty statement keeps a label at the end of a block
      // valid C.
      emitter.line(&format!("{name}:;"));
    }
    Stmt::Goto { name } => {
      emitter.line(&format!("goto {name};"));
    }
    Stmt::Let { name, value } => {
      emitter.emit(&format!("{name} = "));
      emit_expr(value, emitter);
      emitter.line(";");
    }
    Stmt::Input { name } => {
      // Failed reads assign zero and flush the rest of the input token so
      // later reads stay in sync.
      emitter.line(&format!("if(0 == scanf(\"%f\", &{name})) {{"));
      emitter.line(&format!("{name} = 0;"));
      emitter.line("scanf(\"%*s\");");
      emitter.line("}");
    }
  }
}

fn emit_expr(expr: &Expr, emitter: &mut Emitter) {
  match expr {
    Expr::Num { text } => emitter.emit(text),
    Expr::Var { name } => emitter.emit(name),
    Expr::Neg { operand } => {
      emitter.emit("-");
      emit_expr(operand, emitter);
    }
    Expr::Binary { op, lhs, rhs } => {
      emit_expr(lhs, emitter);
      emitter.emit(op.symbol());
      emit_expr(rhs, emitter);
    }
  }
}

fn emit_comparison(comparison: &Comparison, emitter: &mut Emitter) {
  emit_expr(&comparison.first, emitter);
  for (op, rhs) in &comparison.chain {
    emitter.emit(op.symbol());
    emit_expr(rhs, emitter);
  }
}
