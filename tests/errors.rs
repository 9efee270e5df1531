//! Error reporting across every pipeline stage

use weft::{ErrorKind, Executor, WeftError};

/// Run a program expected to fail somewhere in the pipeline and return
/// the error
fn run_err(source: &str) -> WeftError {
    let program = match weft::compile(source) {
        Ok(program) => program,
        Err(err) => return err,
    };
    match Executor::with_output(Vec::new()).run(&program) {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(err) => err,
    }
}

// ==================== Lexing ====================

#[test]
fn test_garbage_input_is_rejected() {
    let err = run_err("fun main() { @ }");
    assert!(matches!(err.kind, ErrorKind::UnrecognizedInput(_)));
}

#[test]
fn test_digits_glued_to_letters_are_rejected() {
    let err = run_err("fun main() { return 123abc }");
    assert!(matches!(err.kind, ErrorKind::UnrecognizedInput(_)));
}

#[test]
fn test_operator_without_trailing_whitespace_is_rejected() {
    // `-` only lexes as an operator when followed by whitespace
    let err = run_err("fun main() { return 1 -2 }");
    assert!(matches!(err.kind, ErrorKind::UnrecognizedInput(_)));
}

#[test]
fn test_lex_errors_carry_the_line_number() {
    let err = run_err("fun main() {\n  @\n}");
    assert_eq!(err.location.unwrap().line, 2);
}

// ==================== Parsing ====================

#[test]
fn test_unterminated_block_is_rejected() {
    let err = run_err("fun main() { return 1 ");
    assert_eq!(err.kind, ErrorKind::UnexpectedEnd);
}

#[test]
fn test_operator_without_operand_is_rejected() {
    let err = run_err("fun main() { return 1 + }");
    assert!(matches!(err.kind, ErrorKind::ExpectedExpression(_)));
}

#[test]
fn test_top_level_must_be_a_function() {
    let err = run_err("var x");
    assert!(matches!(err.kind, ErrorKind::ExpectedToken(ref expected, _) if expected == "fun"));
}

#[test]
fn test_out_of_range_integer_literal() {
    let err = run_err("fun main() { return 99999999999999999999 }");
    assert!(matches!(err.kind, ErrorKind::InvalidInteger(_)));
}

// ==================== Compiling ====================

#[test]
fn test_redefining_a_function_is_rejected() {
    let err = run_err("fun f() { } fun f() { } fun main() { }");
    assert_eq!(err.kind, ErrorKind::FunctionRedefined("f".to_string()));
}

#[test]
fn test_redefining_print_is_rejected() {
    let err = run_err("fun print(value) { } fun main() { }");
    assert_eq!(err.kind, ErrorKind::FunctionRedefined("print".to_string()));
}

// ==================== Running ====================

#[test]
fn test_referencing_an_undeclared_variable() {
    let err = run_err("fun main() { return y }");
    assert_eq!(err.kind, ErrorKind::UndeclaredVariable("y".to_string()));
}

#[test]
fn test_assigning_an_undeclared_variable() {
    let err = run_err("fun main() { y = 1 }");
    assert_eq!(err.kind, ErrorKind::UndeclaredVariable("y".to_string()));
}

#[test]
fn test_bindings_do_not_leak_into_callees() {
    let err = run_err(
        "fun peek() { return x }
        fun main() {
            var x
            x = 1
            return peek()
        }",
    );
    assert_eq!(err.kind, ErrorKind::UndeclaredVariable("x".to_string()));
}

#[test]
fn test_calling_an_unknown_function() {
    let err = run_err("fun main() { missing() }");
    assert_eq!(err.kind, ErrorKind::UnknownFunction("missing".to_string()));
}

#[test]
fn test_arity_mismatch_reports_both_counts() {
    let err = run_err("fun pair(a, b) { } fun main() { pair(1) }");
    assert_eq!(
        err.kind,
        ErrorKind::WrongArity {
            name: "pair".to_string(),
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn test_division_and_modulo_by_zero() {
    let err = run_err("fun main() { return 1 / 0 }");
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    let err = run_err("fun main() { return 1 % 0 }");
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
}

#[test]
fn test_arithmetic_on_an_unassigned_variable() {
    let err = run_err("fun main() { var x return x * 2 }");
    assert_eq!(err.kind, ErrorKind::InvalidOperand("*".to_string()));
}

#[test]
fn test_runtime_errors_carry_the_call_site_line() {
    let err = run_err("fun main() {\n  return 1 / 0\n}");
    assert_eq!(err.location.unwrap().line, 2);
}

// ==================== Stack depth ====================

#[test]
fn test_depth_one_past_the_maximum_overflows() {
    // main plus eight activations of dig needs nine frames
    let source = "fun dig(n) {
        if (n) {
            dig(n - 1)
        }
    }
    fun main() { dig(7) }";
    let program = weft::compile(source).unwrap();
    let mut executor = Executor::with_output(Vec::new()).with_max_depth(8);
    let err = executor.run(&program).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StackOverflow(8));
}

#[test]
fn test_unbounded_recursion_overflows_at_the_default_depth() {
    let err = run_err("fun spin() { spin() } fun main() { spin() }");
    assert_eq!(err.kind, ErrorKind::StackOverflow(weft::DEFAULT_MAX_DEPTH));
}

#[test]
fn test_overflow_in_expression_position_is_reported_too() {
    // The recursive call sits inside an expression, not a statement
    let source = "fun spin(n) { return 1 + spin(n) }
        fun main() { return spin(0) }";
    let program = weft::compile(source).unwrap();
    let mut executor = Executor::with_output(Vec::new()).with_max_depth(64);
    let err = executor.run(&program).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StackOverflow(64));
}

#[test]
fn test_overflow_points_at_the_call_site() {
    let source = "fun spin() {\n  spin()\n}\nfun main() { spin() }";
    let err = run_err(source);
    assert_eq!(err.location.unwrap().line, 2);
}

#[test]
fn test_runtime_and_build_errors_classify_apart() {
    assert!(run_err("fun main() { return 1 / 0 }").kind.is_runtime());
    assert!(run_err("fun spin() { spin() } fun main() { spin() }")
        .kind
        .is_runtime());
    assert!(!run_err("fun f() { } fun f() { } fun main() { }")
        .kind
        .is_runtime());
    assert!(!run_err("fun main() { @ }").kind.is_runtime());
}

// ==================== Rendering ====================

#[test]
fn test_errors_render_with_location_and_source_line() {
    let source = "fun main() {\n  return nope()\n}";
    let err = run_err(source).with_source(source);
    let rendered = err.to_string();
    assert!(rendered.contains("error:"));
    assert!(rendered.contains("nope"));
    assert!(rendered.contains("return nope()"));
}
