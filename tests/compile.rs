//! End-to-end tests over the whole pipeline, source text in, C text out.

use pretty_assertions::assert_eq;
use teenyc::{CompileError, compile};

#[test]
fn compiles_a_small_program_byte_for_byte() {
  let source = "LET a = 1\nPRINT \"hello\"\nPRINT a + 2\n";
  let expected = "#include <stdio.h>\n\
                  int main(void){\n\
                  float a;\n\
                  a = 1;\n\
                  printf(\"hello\\n\");\n\
                  printf(\"%.2f\\n\", (float)(a+2));\n\
                  return 0;\n\
                  }\n";
  assert_eq!(compile(source).expect("compile failed"), expected);
}

#[test]
fn input_reads_with_zero_fallback() {
  let expected = "#include <stdio.h>\n\
                  int main(void){\n\
                  float guess;\n\
                  if(0 == scanf(\"%f\", &guess)) {\n\
                  guess = 0;\n\
                  scanf(\"%*s\");\n\
                  }\n\
                  return 0;\n\
                  }\n";
  assert_eq!(compile("INPUT guess\n").expect("compile failed"), expected);
}

#[test]
fn while_loop_lowers_to_c_while() {
  let source = "LET n = 3\nWHILE n > 0 REPEAT\nPRINT n\nLET n = n - 1\nENDWHILE\n";
  let expected = "#include <stdio.h>\n\
                  int main(void){\n\
                  float n;\n\
                  n = 3;\n\
                  while(n>0){\n\
                  printf(\"%.2f\\n\", (float)(n));\n\
                  n = n-1;\n\
                  }\n\
                  return 0;\n\
                  }\n";
  assert_eq!(compile(source).expect("compile failed"), expected);
}

#[test]
fn label_and_goto_compile_regardless_of_direction() {
  let output = compile("LABEL loop\nPRINT \"hi\"\nGOTO loop\n").expect("compile failed");
  assert!(output.contains("loop:;\n"));
  assert!(output.contains("goto loop;\n"));

  // Forward reference: legal because the check runs at end of program.
  let output = compile("GOTO done\nPRINT 1\nLABEL done\n").expect("compile failed");
  assert!(output.contains("goto done;\n"));
}

#[test]
fn chained_comparison_is_emitted_verbatim() {
  let source = "LET a = 2\nLET b = 1\nIF a > b > 0 THEN\nPRINT \"yes\"\nENDIF\n";
  let output = compile(source).expect("compile failed");
  assert!(output.contains("if(a>b>0){\n"));
}

#[test]
fn undeclared_variable_fails_with_no_output() {
  let err = compile("PRINT x\n").unwrap_err();
  assert!(matches!(err, CompileError::Semantic { .. }));
  assert!(err.to_string().contains("referencing variable before assignment"));
}

#[test]
fn bare_expression_condition_fails() {
  let err = compile("IF 1 THEN\nPRINT \"ok\"\nENDIF\n").unwrap_err();
  assert!(matches!(err, CompileError::Syntax { .. }));
  assert!(err.to_string().contains("expected a comparison operator"));
}

#[test]
fn lexical_error_surfaces_from_compile() {
  let err = compile("LET a = 123.\n").unwrap_err();
  assert!(matches!(err, CompileError::Lexical { .. }));
}

#[test]
fn source_without_trailing_newline_still_compiles() {
  let output = compile("PRINT \"done\"").expect("compile failed");
  assert!(output.contains("printf(\"done\\n\");\n"));
}

#[test]
fn nested_control_structures() {
  let source = "LET i = 2\n\
                WHILE i > 0 REPEAT\n\
                IF i == 1 THEN\n\
                PRINT \"one\"\n\
                ENDIF\n\
                LET i = i - 1\n\
                ENDWHILE\n";
  let output = compile(source).expect("compile failed");
  assert!(output.contains("while(i>0){\n"));
  assert!(output.contains("if(i==1){\n"));
  // one close each for the IF, the WHILE, and main
  assert_eq!(output.matches("}\n").count(), 3);
}

#[test]
fn unary_signs_render_through() {
  let output = compile("LET x = -5\nPRINT +x\n").expect("compile failed");
  assert!(output.contains("x = -5;\n"));
  assert!(output.contains("printf(\"%.2f\\n\", (float)(x));\n"));
}

#[test]
fn comments_do_not_reach_the_output() {
  let output = compile("# setup\nLET a = 1 # trailing\nPRINT a\n").expect("compile failed");
  assert!(!output.contains('#'));
  assert!(output.contains("a = 1;\n"));
}

#[test]
fn identical_input_produces_identical_output() {
  let source = "LET a = 1\nLET b = 2\nIF a < b THEN\nPRINT \"lt\"\nENDIF\n";
  let first = compile(source).expect("compile failed");
  let second = compile(source).expect("compile failed");
  assert_eq!(first, second);
}
