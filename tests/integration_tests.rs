use pscc::analyzer::SemanticVisitor;
use pscc::compile;
use pscc::ir::{BinOp, Instruction, IrGenerator};
use pscc::lexer::Lexer;
use pscc::optimizer::Optimizer;
use pscc::parser::Parser;
use pscc::CompileError;

fn optimized_tac(source: &str) -> Vec<Instruction> {
    let tokens = Lexer::tokenize(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let tac = IrGenerator::new().generate(&program);
    Optimizer::new().optimize(tac)
}

#[test]
fn arithmetic_program_prints_its_result() {
    let output = compile("var x = 2 + 3; print x;").unwrap();
    assert_eq!(output, vec!["5"]);
}

#[test]
fn constant_addition_is_folded_before_execution() {
    let tac = optimized_tac("var x = 2 + 3; print x;");
    assert!(tac.contains(&Instruction::Assign {
        src: "5".into(),
        dest: "t0".into(),
    }));
    assert!(!tac.iter().any(|i| matches!(i, Instruction::Binary { .. })));
}

#[test]
fn division_by_constant_zero_compiles_but_faults_at_run_time() {
    let tac = optimized_tac("var x = 10 / 0; print x;");
    assert!(tac.iter().any(|i| matches!(
        i,
        Instruction::Binary {
            op: BinOp::Div,
            ..
        }
    )));

    let err = compile("var x = 10 / 0; print x;").unwrap_err();
    assert_eq!(err.to_string(), "Runtime error: Division by zero");
}

#[test]
fn fibonacci_pattern_prints_the_sequence() {
    let output = compile("fibonacci(f, 6); print f;").unwrap();
    assert_eq!(output, vec!["[0, 1, 1, 2, 3, 5]"]);
}

#[test]
fn factorial_pattern_prints_the_product() {
    let output = compile("factorial(f, 5); print f;").unwrap();
    assert_eq!(output, vec!["120"]);
}

#[test]
fn factorial_of_a_negative_is_zero() {
    let output = compile("factorial(f, -3); print f;").unwrap();
    assert_eq!(output, vec!["0"]);
}

#[test]
fn sequence_pattern_prints_ten_elements() {
    let output = compile("sequence(s, 1, 2); print s;").unwrap();
    assert_eq!(output, vec!["[1, 3, 5, 7, 9, 11, 13, 15, 17, 19]"]);
}

#[test]
fn while_loop_counts_up() {
    let source = "
var i = 0;
while (i < 3) {
    print i;
    i = i + 1;
}
";
    assert_eq!(compile(source).unwrap(), vec!["0", "1", "2"]);
}

#[test]
fn for_loop_counts_up() {
    let source = "
var total = 0;
for (i = 0; i < 4; i = i + 1) {
    total = total + i;
}
print total;
";
    assert_eq!(compile(source).unwrap(), vec!["6"]);
}

#[test]
fn if_else_takes_the_right_branch() {
    let source = "
var x = 7;
if (x > 5) {
    print \"big\";
} else {
    print \"small\";
}
";
    assert_eq!(compile(source).unwrap(), vec!["big"]);
}

#[test]
fn loop_counters_survive_dead_code_elimination() {
    let source = "
var i = 0;
while (i < 2) {
    i = i + 1;
}
print i;
";
    assert_eq!(compile(source).unwrap(), vec!["2"]);
}

#[test]
fn keywords_are_case_insensitive() {
    let output = compile("VAR x = 1; PRINT x;").unwrap();
    assert_eq!(output, vec!["1"]);
}

#[test]
fn comments_are_ignored() {
    let source = "
// leading comment
var x = 1; // trailing comment
print x;
";
    assert_eq!(compile(source).unwrap(), vec!["1"]);
}

#[test]
fn string_variables_print_verbatim() {
    let output = compile("var s = \"hello\"; print s;").unwrap();
    assert_eq!(output, vec!["hello"]);
}

#[test]
fn undeclared_assignment_is_a_semantic_error() {
    let err = compile("x = 1;").unwrap_err();
    assert!(matches!(err, CompileError::Semantic(_)));
    assert_eq!(
        err.to_string(),
        "Semantic error: Variable 'x' not declared (line 1)"
    );
}

#[test]
fn redeclaration_is_a_semantic_error() {
    let err = compile("var x = 1; var x = 2;").unwrap_err();
    assert!(matches!(err, CompileError::Semantic(_)));
}

#[test]
fn type_mismatch_on_assignment_is_a_semantic_error() {
    let err = compile("var x = 1; x = \"one\";").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Semantic error: Type mismatch: 'x' is INTEGER, but expression is STRING (line 1)"
    );
}

#[test]
fn unexpected_character_is_a_lexical_error() {
    let err = compile("var x = 1 @ 2;").unwrap_err();
    assert!(matches!(err, CompileError::Lexical(_)));
    assert_eq!(
        err.to_string(),
        "Lexical error at line 1, column 11: Unexpected character: '@'"
    );
}

#[test]
fn missing_semicolon_is_a_syntax_error() {
    let err = compile("var x = 1").unwrap_err();
    assert!(matches!(err, CompileError::Syntax(_)));
}

#[test]
fn faulting_run_yields_no_partial_output() {
    // the first print executes before the fault, but the caller only
    // ever sees the error
    let result = compile("var a = 1; print a; var b = 0; var c = a / b; print c;");
    assert!(matches!(result, Err(CompileError::Runtime(_))));
}

#[test]
fn folding_preserves_loop_free_program_output() {
    let source = "
var a = 6;
var b = a * 7;
var c = b - 2;
print c;
";
    let tokens = Lexer::tokenize(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    SemanticVisitor::new().analyze(&program).unwrap();
    let tac = IrGenerator::new().generate(&program);

    let unoptimized = pscc::interpreter::Interpreter::new().run(&tac).unwrap();
    let optimized = pscc::interpreter::Interpreter::new()
        .run(&Optimizer::new().optimize(tac.clone()))
        .unwrap();
    assert_eq!(unoptimized, optimized);
    assert_eq!(optimized, vec!["40"]);
}

#[test]
fn folding_preserves_loop_output() {
    // the loop variable starts from a constant; the guard and increment
    // must still be evaluated fresh on every iteration
    let source = "
var i = 0;
var sum = 0;
while (i < 4) {
    sum = sum + i;
    i = i + 1;
}
print sum;
";
    let tokens = Lexer::tokenize(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let tac = IrGenerator::new().generate(&program);

    let unoptimized = pscc::interpreter::Interpreter::new().run(&tac).unwrap();
    let optimized = pscc::interpreter::Interpreter::new()
        .run(&Optimizer::new().optimize(tac.clone()))
        .unwrap();
    assert_eq!(unoptimized, optimized);
    assert_eq!(optimized, vec!["6"]);
}

#[test]
fn nested_control_flow_runs_to_completion() {
    let source = "
var n = 0;
for (i = 1; i <= 3; i = i + 1) {
    if (i % 2 == 1) {
        n = n + i;
    }
}
print n;
";
    assert_eq!(compile(source).unwrap(), vec!["4"]);
}

#[test]
fn negative_literals_flow_through_arithmetic() {
    // floor semantics: -7 / 2 rounds toward negative infinity
    let output = compile("var x = -7; var y = x / 2; print y;").unwrap();
    assert_eq!(output, vec!["-4"]);
}

#[test]
fn pattern_arguments_may_be_expressions() {
    let output = compile("var n = 3; fibonacci(f, n + 2); print f;").unwrap();
    assert_eq!(output, vec!["[0, 1, 1, 2, 3]"]);
}
