// ABOUTME: Error taxonomy and chained-context behavior across the pipeline

use moonlet::{ExecError, Interpreter, RuntimeError};

fn error_of(source: &str) -> ExecError {
    Interpreter::default()
        .execute(source)
        .expect_err("expected the script to fail")
}

fn runtime_root(source: &str) -> RuntimeError {
    match error_of(source) {
        ExecError::Runtime(err) => err.root().clone(),
        other => panic!("expected runtime error, got: {}", other),
    }
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn test_unknown_character() {
    let ExecError::Syntax(err) = error_of("local a = 1 @ 2") else {
        panic!("expected syntax error");
    };
    assert_eq!(err.line, 1);
    assert!(err.message.contains("unknown character '@'"));
}

#[test]
fn test_unexpected_token() {
    let ExecError::Syntax(err) = error_of("if true do print(1) end") else {
        panic!("expected syntax error");
    };
    assert!(err.message.contains("expected 'then'"));
}

#[test]
fn test_unsupported_primary() {
    let ExecError::Syntax(err) = error_of("local x = end") else {
        panic!("expected syntax error");
    };
    assert!(err.message.contains("unsupported expression"));
}

#[test]
fn test_multiple_assignment_unsupported() {
    let ExecError::Syntax(err) = error_of("local a, b = 1, 2") else {
        panic!("expected syntax error");
    };
    assert!(err.message.contains("multiple assignment"));
}

#[test]
fn test_missing_delimiter() {
    assert!(matches!(
        error_of("print((1 + 2)"),
        ExecError::Syntax(_)
    ));
    assert!(matches!(error_of("local t = {1, 2"), ExecError::Syntax(_)));
}

#[test]
fn test_missing_end() {
    let ExecError::Syntax(err) = error_of("function f()\nreturn 1\n") else {
        panic!("expected syntax error");
    };
    assert!(err.message.contains("end of input"));
}

// ============================================================================
// Runtime error kinds
// ============================================================================

#[test]
fn test_variable_not_declared() {
    assert!(matches!(
        runtime_root("print(ghost)"),
        RuntimeError::VariableNotDeclared(name) if name == "ghost"
    ));
    assert!(matches!(
        runtime_root("ghost = 1"),
        RuntimeError::VariableNotDeclared(_)
    ));
}

#[test]
fn test_function_not_declared() {
    assert!(matches!(
        runtime_root("ghost()"),
        RuntimeError::FunctionNotDeclared(_)
    ));
    assert!(matches!(
        runtime_root("math.ghost()"),
        RuntimeError::FunctionNotDeclared(_)
    ));
}

#[test]
fn test_function_argument_error() {
    let err = runtime_root("function f(a) return a end f(1, 2)");
    let RuntimeError::FunctionArgumentError {
        name,
        expected,
        actual,
    } = err
    else {
        panic!("expected arity error");
    };
    assert_eq!(name, "f");
    assert_eq!(expected, 1);
    assert_eq!(actual, 2);
}

#[test]
fn test_invalid_operation_on_types() {
    assert!(matches!(
        runtime_root("return 1 + {}"),
        RuntimeError::InvalidOperation(_)
    ));
    assert!(matches!(
        runtime_root("return {} < {}"),
        RuntimeError::InvalidOperation(_)
    ));
    assert!(matches!(
        runtime_root("return -\"x\""),
        RuntimeError::InvalidOperation(_)
    ));
    assert!(matches!(
        runtime_root("return #true"),
        RuntimeError::InvalidOperation(_)
    ));
}

#[test]
fn test_table_key_kind_mismatch() {
    assert!(matches!(
        runtime_root("local t = {1, 2} return t[\"a\"]"),
        RuntimeError::InvalidOperation(_)
    ));
    assert!(matches!(
        runtime_root("local t = {a = 1} t[2] = 5"),
        RuntimeError::InvalidOperation(_)
    ));
}

#[test]
fn test_calling_a_non_function() {
    assert!(matches!(
        runtime_root("local n = 5 n()"),
        RuntimeError::InvalidOperation(_)
    ));
}

#[test]
fn test_maximum_loop_error() {
    assert!(matches!(
        runtime_root("while 1 < 2 do end"),
        RuntimeError::MaximumLoopError
    ));
}

#[test]
fn test_import_error() {
    assert!(matches!(
        runtime_root("require(\"missing_library\")"),
        RuntimeError::ImportError(_)
    ));
}

#[test]
fn test_permission_error_fields() {
    let err = runtime_root("io.open(\"/etc/passwd\")");
    let RuntimeError::PermissionError { library, method } = err else {
        panic!("expected permission error");
    };
    assert_eq!(library, "io");
    assert_eq!(method, "open");
}

// ============================================================================
// Chained context
// ============================================================================

#[test]
fn test_chain_carries_line_node_and_source() {
    let ExecError::Runtime(err) = error_of("local a = 1\nlocal b = a + ghost\n") else {
        panic!("expected runtime error");
    };
    let RuntimeError::Chained(chained) = &err else {
        panic!("expected chained error");
    };
    assert_eq!(chained.line, 2);
    assert_eq!(chained.node_kind, "VariableReference");
    assert_eq!(chained.source_line, "local b = a + ghost");
    assert!(matches!(
        chained.cause,
        RuntimeError::VariableNotDeclared(_)
    ));
}

#[test]
fn test_user_visible_error_format() {
    let err = error_of("print(ghost)");
    let text = err.to_string();
    assert!(text.contains("variable 'ghost' is not declared at line 1 (VariableReference)"));
    assert!(text.contains("-> 1: print(ghost)"));
    assert!(text.contains("VariableNotDeclared:"));
}

#[test]
fn test_error_inside_function_reports_failing_line() {
    let source = "function f()\n  return ghost\nend\nf()";
    let ExecError::Runtime(RuntimeError::Chained(chained)) = error_of(source) else {
        panic!("expected chained runtime error");
    };
    assert_eq!(chained.line, 2);
}

#[test]
fn test_script_error_global() {
    let err = runtime_root("error(\"custom failure\")");
    assert!(matches!(err, RuntimeError::Custom(message) if message == "custom failure"));
}

#[test]
fn test_pcall_returns_root_message() {
    let mut interpreter = Interpreter::default();
    interpreter
        .execute("local ok, msg = pcall(function() local t = {} return t[1] + 1 end) print(msg)")
        .unwrap();
    assert!(interpreter.logs().contains("arithmetic"));
}

#[test]
fn test_errors_do_not_poison_interpreter() {
    let mut interpreter = Interpreter::default();
    assert!(interpreter.execute("print(ghost)").is_err());
    interpreter.execute("print(\"still alive\")").unwrap();
    assert_eq!(interpreter.logs(), "still alive\n");
}
