use slate_compiler::compile_to_module;
use slate_compiler::diag::{Blame, Diag};
use slate_compiler::ir;
use slate_compiler::target::Target;
use slate_compiler::CompileError;

fn compile(source: &str) -> Result<ir::Module, CompileError> {
    compile_to_module(source, "test.sl", Target::x86_64_darwin())
}

fn semantic_diag(source: &str) -> Diag {
    match compile(source) {
        Err(CompileError::Semantic(d)) => d,
        Ok(_) => panic!("expected a diagnostic, but compilation succeeded"),
        Err(other) => panic!("expected a semantic diagnostic, got: {other:?}"),
    }
}

fn assert_msg(source: &str, msg: &str) {
    let d = semantic_diag(source);
    assert_eq!(d.msg, msg);
}

// ── Declarations ─────────────────────────────────────────────────────────

#[test]
fn methods_are_rejected() {
    assert_msg(
        "package p\nfunc (r uint8) f() {\n}\n",
        "Methods not supported yet.",
    );
}

#[test]
fn top_level_var_is_rejected() {
    assert_msg(
        "package p\nvar x int64\n",
        "Unsupported declaration type \"var\".",
    );
}

#[test]
fn imports_are_rejected() {
    assert_msg(
        "package p\nimport \"io\"\n",
        "Unsupported declaration type \"import\".",
    );
}

#[test]
fn multiple_result_types_are_rejected() {
    assert_msg(
        "package p\nfunc f() (int64, int64) {\n\treturn 1\n}\n",
        "Returning more than one value is not yet permitted.",
    );
}

#[test]
fn unknown_parameter_type() {
    assert_msg(
        "package p\nfunc f(x foo) {\n}\n",
        "Unknown type \"foo\".",
    );
}

// ── Variable declarations ────────────────────────────────────────────────

#[test]
fn const_declarations_are_rejected() {
    assert_msg(
        "package p\nfunc f() {\n\tconst k = 1\n}\n",
        "Const declarations are not yet implemented.",
    );
}

#[test]
fn untyped_var_declarations_are_rejected() {
    assert_msg(
        "package p\nfunc f() {\n\tvar x = 5\n}\n",
        "Unable to handle non-typed variable declarations at this time.",
    );
}

#[test]
fn partial_initialization_is_rejected() {
    assert_msg(
        "package p\nfunc f() {\n\tvar a, b int = 1\n}\n",
        "Partial initialization of variables in a variable declaration is not allowed.",
    );
}

#[test]
fn initializer_type_must_equal_declared_type() {
    let src = "package p\nfunc f() {\n\tvar y int64 = 1\n\tvar x int32 = y\n}\n";
    assert_msg(
        src,
        "Expected initializer of type \"int32\", but found type \"int64\".",
    );
}

#[test]
fn alias_declared_type_refuses_integer_literal() {
    // `byte` is an alias; integer constants only commit to bare integer types.
    assert_msg(
        "package p\nfunc f() {\n\tvar b byte = 5\n}\n",
        "Expected type byte but got integer constant",
    );
}

#[test]
fn duplicate_variable_names_are_rejected() {
    let src = "package p\nfunc f() {\n\tvar x int64\n\tvar x int64\n}\n";
    assert_msg(src, "A variable already exists with this identifier.");
}

#[test]
fn runtime_symbols_occupy_the_namespace() {
    assert_msg(
        "package p\nfunc f() {\n\tvar puts int64\n}\n",
        "A variable already exists with this identifier.",
    );
}

#[test]
fn type_declarations_inside_functions_are_rejected() {
    assert_msg(
        "package p\nfunc f() {\n\ttype octet uint8\n}\n",
        "General declaration type \"type\" not implemented yet.",
    );
}

// ── Statements ───────────────────────────────────────────────────────────

#[test]
fn missing_return_value() {
    assert_msg(
        "package p\nfunc f() int64 {\n\treturn\n}\n",
        "Function is expected to return a value!",
    );
}

#[test]
fn multi_value_return_is_rejected() {
    assert_msg(
        "package p\nfunc f() int64 {\n\treturn 1, 2\n}\n",
        "Only single-value return is implemented at this time.",
    );
}

#[test]
fn return_type_mismatch() {
    let src = "package p\nfunc f() int32 {\n\tvar x int64 = 1\n\treturn x\n}\n";
    assert_msg(src, "Expected type int32 but got type int64");
}

#[test]
fn short_declarations_are_rejected() {
    assert_msg(
        "package p\nfunc f() {\n\tx := 1\n}\n",
        "Short variable declarations are not yet implemented.",
    );
}

#[test]
fn assignment_lengths_must_match() {
    let src = "package p\nfunc f() {\n\tvar a, b int64 = 1, 2\n\ta, b = 1\n}\n";
    assert_msg(src, "Every variable must have an equivalent rValue");
}

#[test]
fn assignment_to_const_binding_is_rejected() {
    assert_msg(
        "package p\nfunc f() {\n\tputs = puts\n}\n",
        "Unable to assign to variable \"puts\".",
    );
}

#[test]
fn assignment_needs_an_lvalue() {
    assert_msg(
        "package p\nfunc f() {\n\t5 = 1\n}\n",
        "Expected an lvalue expression.",
    );
}

// ── Expressions ──────────────────────────────────────────────────────────

#[test]
fn unknown_identifier() {
    assert_msg(
        "package p\nfunc f() {\n\tg()\n}\n",
        "Unknown identifier \"g\".",
    );
}

#[test]
fn calling_a_non_function() {
    let src = "package p\nfunc f() {\n\tvar x int64 = 1\n\tx()\n}\n";
    assert_msg(src, "Given expression not a function!");
}

#[test]
fn argument_count_mismatch() {
    assert_msg(
        "package p\nfunc f() {\n\tputs(\"a\", \"b\")\n}\n",
        "Expected 1 arguments, found 2!",
    );
}

#[test]
fn argument_type_mismatch() {
    assert_msg(
        "package p\nfunc f() {\n\tprint_int(\"hi\")\n}\n",
        "Expected type int64 but got type *uint8",
    );
}

#[test]
fn arithmetic_is_not_translatable() {
    assert_msg(
        "package p\nfunc f() int64 {\n\treturn 1 + 2\n}\n",
        "Cannot translate this expression.",
    );
}

// ── Blame accuracy ───────────────────────────────────────────────────────

#[test]
fn unknown_identifier_blame_points_at_the_identifier() {
    let d = semantic_diag("package p\nfunc f() {\n\tg()\n}\n");
    let Blame::TextSingleLine {
        file,
        line,
        col,
        extent,
        caret,
    } = d.blame
    else {
        panic!("expected a single-line blame, got {:?}", d.blame)
    };
    assert_eq!(file, "test.sl");
    assert_eq!(line, 3);
    assert_eq!(col, 2, "the identifier sits after the tab");
    assert_eq!(extent, 1);
    assert_eq!(caret, col);
}

#[test]
fn diagnostics_on_later_lines_report_later_lines() {
    let d = semantic_diag("package p\nfunc f() {\n\tputs(\"ok\")\n\tmissing()\n}\n");
    let Blame::TextSingleLine { line, .. } = d.blame else {
        panic!("expected a single-line blame")
    };
    assert_eq!(line, 4);
}

// ── Frontend errors surface through the same entry point ─────────────────

#[test]
fn lexical_errors_are_reported() {
    let err = compile("package p\nfunc f() {\n\t$\n}\n").unwrap_err();
    assert!(matches!(err, CompileError::Lexical(_)));
}

#[test]
fn parse_errors_are_reported() {
    let err = compile("package p\nfunc f( {\n}\n").unwrap_err();
    assert!(matches!(err, CompileError::Parse { .. }));
}
