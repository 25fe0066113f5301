//! End-to-end programs run against a buffered sink.

use mint::error::{MintError, RuntimeError};
use mint::run_with_input;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Result<String, MintError> {
    run_with_input(source, Vec::<String>::new(), 1)
}

fn output(source: &str) -> String {
    match run(source) {
        Ok(out) => out,
        Err(err) => panic!("program failed: {}", err),
    }
}

#[test]
fn test_precedence() {
    assert_eq!(output("println(1 + 2 * 3)"), "7\n");
    assert_eq!(output("println(true || false && false)"), "false\n");
    assert_eq!(output("println((1 + 2) * 3 == 9)"), "true\n");
    assert_eq!(output("println(-2 * 3 + 10 / 4)"), "-4\n");
}

#[test]
fn test_division() {
    assert_eq!(output("println(5 / 2) println(5.0 / 2.0) println(5.0 / 0.0)"), "2\n2.5\ninf\n");
    match run("println(1)\nprintln(5 / 0)") {
        Err(MintError::Runtime(RuntimeError::DivisionByZero { line })) => assert_eq!(line, 2),
        other => panic!("Expected DivisionByZero, got {:?}", other),
    }
}

#[test]
fn test_arrays_alias_through_assignment() {
    let program = "\
var a: Array<Int> = Array<Int>(1, 2)
var b: Array<Int> = a
b.append(3)
println(a.count())
println(a)
";
    assert_eq!(output(program), "3\n[1, 2, 3]\n");
}

#[test]
fn test_dicts_alias_and_move_updated_key_to_end() {
    let program = "\
var d: Dict<String, Int> = Dict<String, Int>(\"k1\": 1, \"k2\": 2)
var e: Dict<String, Int> = d
e[\"k1\"] = 10
println(d)
println(d.keys())
println(d.values())
println(d.contains(\"k2\"))
";
    assert_eq!(
        output(program),
        "{\"k2\": 2, \"k1\": 10}\n[\"k2\", \"k1\"]\n[2, 10]\ntrue\n"
    );
}

#[test]
fn test_loop_variable_aliases_elements() {
    let program = "\
var g: Array<Array<Int>> = Array<Array<Int>>(Array<Int>(1), Array<Int>(2))
for var r: Array<Int> in g r.append(9)
println(g)
";
    assert_eq!(output(program), "[[1, 9], [2, 9]]\n");
}

#[test]
fn test_keys_and_values_are_fresh_arrays() {
    let program = "\
var d: Dict<Int, Int> = Dict<Int, Int>(1: 2)
var k: Array<Int> = d.keys()
var v: Array<Int> = d.values()
k.append(5)
v.append(6)
println(d)
println(k)
println(v)
";
    assert_eq!(output(program), "{1: 2}\n[1, 5]\n[2, 6]\n");
}

#[test]
fn test_let_is_immutable_at_assignment_line() {
    match run("let x: Int = 1\n\nx = 2") {
        Err(err @ MintError::Runtime(RuntimeError::ImmutableAssignment { .. })) => {
            assert_eq!(err.to_string(), "line 3: Cannot assign to immutable variable [x]");
        }
        other => panic!("Expected ImmutableAssignment, got {:?}", other),
    }
}

#[test]
fn test_block_scoping_and_shadowing() {
    let program = "\
var x: Int = 1
{
    var x: String = \"inner\"
    println(x)
    {
        x = \"changed\"
    }
    println(x)
}
println(x)
";
    assert_eq!(output(program), "inner\nchanged\n1\n");
}

#[test]
fn test_for_over_strings() {
    assert_eq!(output("for var c: Char in \"abc\" { print(c) print('-') }"), "a-b-c-");
    assert_eq!(output("var n: Int = 0\nfor var c: Char in \"\" n = n + 1\nprint(n)"), "0");
}

#[test]
fn test_for_over_array_with_index_arithmetic() {
    let program = "\
var total: Int = 0
var squares: Array<Int>
for var n: Int in Array<Int>(1, 2, 3, 4) {
    squares.append(n * n)
    total = total + n
}
println(squares)
println(total)
";
    assert_eq!(output(program), "[1, 4, 9, 16]\n10\n");
}

#[test]
fn test_cast_round_trips() {
    let program = "\
var i: Int = 12345
var f: Float = 0.1
println(toInt(toString(i)) == i)
println(toFloat(toString(f)) == f)
println(toString(toFloat(3)))
println(toChar(toInt('z')))
";
    assert_eq!(output(program), "true\ntrue\n3.0\nz\n");
}

#[test]
fn test_identity_casts_are_noops() {
    let program = "\
dump(toBool(true)) dump(toInt(7)) dump(toFloat(1.5)) dump(toChar('x')) dump(toString(\"s\"))
";
    assert_eq!(
        output(program),
        "Bool true\nInt 7\nFloat 1.5\nChar 'x'\nString \"s\"\n"
    );
}

#[test]
fn test_nested_types_must_match_exactly() {
    assert!(run("var a: Array<Array<Int>> = Array<Array<Int>>(Array<Int>(1))").is_ok());
    match run("var a: Array<Array<Int>> = Array<Int>(1)") {
        Err(MintError::Runtime(RuntimeError::InvalidType { detail, .. })) => {
            assert_eq!(detail, "Array<Int>")
        }
        other => panic!("Expected InvalidType, got {:?}", other),
    }
}

#[test]
fn test_ternary_and_while() {
    let program = "\
var i: Int = 0
while i < 5 {
    print(i / 2 * 2 == i ? \"e\" : \"o\")
    i = i + 1
}
";
    assert_eq!(output(program), "eoeoe");
}

#[test]
fn test_read_lines_from_input() {
    let program = "\
var name: String = read()
var n: Int = toInt(read())
for var c: Char in name { print(c) print(n) }
";
    assert_eq!(run_with_input(program, ["ana", "3"], 1).unwrap(), "a3n3a3");
}

#[test]
fn test_random_is_reproducible_with_seed() {
    let program = "println(random()) println(random())";
    let first = run_with_input(program, Vec::<String>::new(), 99).unwrap();
    let second = run_with_input(program, Vec::<String>::new(), 99).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_error_reports_carry_line() {
    let cases = [
        ("var x: Int\nprint(y)", "line 2: Undeclared variable [y]"),
        ("var x: Int\nvar x: Int", "line 2: Variable already declared [x]"),
        ("print(1)\nprint(\"a\" + 1)", "line 2: Invalid type [String]"),
        ("\n\nvar a: Array<Int>\nprint(a[0])", "line 4: Index out of bounds [0]"),
        ("var x: Int = 1 $", "line 1: Invalid lexeme [$]"),
        ("print(", "line 1: Unexpected end of file"),
        ("print(1))", "line 1: Unexpected lexeme [)]"),
    ];
    for (program, expected) in cases {
        match run(program) {
            Err(err) => assert_eq!(err.to_string(), expected, "program: {:?}", program),
            Ok(out) => panic!("Expected an error for {:?}, got output {:?}", program, out),
        }
    }
}

#[test]
fn test_output_before_error_is_kept() {
    let services = mint::services::Services::buffered(Vec::<String>::new(), 1);
    let (program, environment) = mint::parse_program("print(1)\nprint(1 / 0)\nprint(2)").unwrap();
    let mut interpreter = mint::interpreter::Interpreter::new(environment, services);
    assert!(interpreter.run(&program).is_err());
    assert_eq!(interpreter.services().output.output(), "1");
}
