//! Evaluation semantics tests for the Jung language.
//!
//! Each test runs a complete source snippet and observes results through
//! global bindings, exercising the semantic invariants of the language:
//! scoping, dispatch, unwinding, equality, and the arithmetic rules.

use jung::error::{JungError, RuntimeError};
use jung::eval::{Interpreter, Value};

/// Helper to run a snippet to completion.
fn run(source: &str) -> Interpreter {
    let mut interp = Interpreter::new();
    interp
        .run_source(source)
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    interp
}

/// Helper to run a snippet and fetch one global.
fn eval_global(source: &str, name: &str) -> Value {
    run(source)
        .get_global(name)
        .unwrap_or_else(|| panic!("global '{name}' not set"))
}

fn run_err(source: &str) -> JungError {
    Interpreter::new()
        .run_source(source)
        .expect_err("expected a failure")
}

// ============================================
// 1. Serialization Round-Trip
// ============================================

#[test]
fn test_stringify_parse_round_trip() {
    // Structural equality after a serialize/deserialize cycle, for
    // every serializable kind at once
    let interp = run(
        "let v = {name: \"Carl\", tags: [1, 2.5, true, null], nested: {k: \"v\"}}\n\
         let round = jsonParse(jsonStringify(v))",
    );
    assert_eq!(interp.get_global("v"), interp.get_global("round"));
}

#[test]
fn test_round_trip_primitives() {
    let interp = run(
        "let a = jsonParse(jsonStringify(42))\n\
         let b = jsonParse(jsonStringify(\"two\\nlines\"))\n\
         let c = jsonParse(jsonStringify(false))\n\
         let d = jsonParse(jsonStringify(null))",
    );
    assert_eq!(interp.get_global("a"), Some(Value::Int(42)));
    assert_eq!(
        interp.get_global("b"),
        Some(Value::Str("two\nlines".to_string()))
    );
    assert_eq!(interp.get_global("c"), Some(Value::Bool(false)));
    assert_eq!(interp.get_global("d"), Some(Value::Null));
}

// ============================================
// 2. Number Rendering
// ============================================

#[test]
fn test_integer_rendering_has_no_decimal_point() {
    assert_eq!(eval_global("let s = str(3)", "s"), Value::Str("3".into()));
    assert_eq!(
        eval_global("let s = str(-1000000)", "s"),
        Value::Str("-1000000".into())
    );
    assert_eq!(
        eval_global("let s = str(2.5)", "s"),
        Value::Str("2.5".into())
    );
}

#[test]
fn test_non_finite_rendering_does_not_crash() {
    // sqrt(-1) is NaN; rendering it must not fail the run
    assert!(matches!(
        eval_global("let s = str(sqrt(-1))", "s"),
        Value::Str(_)
    ));
}

// ============================================
// 3. Integer Division
// ============================================

#[test]
fn test_integer_division_truncates() {
    let cases = [
        ("10 / 3", 3),
        ("9 / 3", 3),
        ("-10 / 3", -3),
        ("10 / -3", -3),
        ("1 / 2", 0),
        ("100 / 7", 14),
    ];
    for (expr, expected) in cases {
        assert_eq!(
            eval_global(&format!("let x = {expr}"), "x"),
            Value::Int(expected),
            "{expr}"
        );
    }
}

#[test]
fn test_fractional_division_is_exact() {
    assert_eq!(eval_global("let x = 10.0 / 4", "x"), Value::Float(2.5));
    assert_eq!(eval_global("let x = 7 / 2.0", "x"), Value::Float(3.5));
}

#[test]
fn test_modulo() {
    assert_eq!(eval_global("let x = 10 % 3", "x"), Value::Int(1));
    assert_eq!(eval_global("let x = 7.5 % 2", "x"), Value::Float(1.5));
}

#[test]
fn test_division_and_modulo_by_zero_fail() {
    assert!(matches!(
        run_err("let x = 1 / 0"),
        JungError::Runtime(RuntimeError::DivisionByZero { .. })
    ));
    assert!(matches!(
        run_err("let x = 1 % 0"),
        JungError::Runtime(RuntimeError::DivisionByZero { .. })
    ));
}

// ============================================
// 4. Array Writes
// ============================================

#[test]
fn test_written_element_reads_back() {
    let interp = run(
        "let arr = [0, 0, 0]\n\
         arr[1] = \"mid\"\n\
         let read = arr[1]",
    );
    assert_eq!(interp.get_global("read"), Some(Value::Str("mid".into())));
}

#[test]
fn test_out_of_range_write_is_ignored() {
    let interp = run("let arr = [1]\narr[5] = 9\nlet n = len(arr)");
    assert_eq!(interp.get_global("n"), Some(Value::Int(1)));
}

// ============================================
// 5. Short-Circuit Evaluation
// ============================================

#[test]
fn test_decisive_left_operand_skips_right() {
    // The right operand would record a side effect; it must not run
    let interp = run(
        "let calls = []\n\
         fn effect() { push(calls, 1)\nreturn true }\n\
         let a = false and effect()\n\
         let b = true or effect()\n\
         let n = len(calls)",
    );
    assert_eq!(interp.get_global("n"), Some(Value::Int(0)));
}

#[test]
fn test_non_decisive_left_operand_runs_right() {
    let interp = run(
        "let calls = []\n\
         fn effect() { push(calls, 1)\nreturn true }\n\
         let a = true and effect()\n\
         let b = false or effect()\n\
         let n = len(calls)",
    );
    assert_eq!(interp.get_global("n"), Some(Value::Int(2)));
}

// ============================================
// 6. Exceptions
// ============================================

#[test]
fn test_catch_binds_thrown_string_exactly() {
    assert_eq!(
        eval_global("let e = null\ntry { throw \"x\" } catch (got) { e = got }", "e"),
        Value::Str("x".into())
    );
}

#[test]
fn test_thrown_values_render_to_strings() {
    assert_eq!(
        eval_global("let e = null\ntry { throw 41 + 1 } catch (got) { e = got }", "e"),
        Value::Str("42".into())
    );
}

#[test]
fn test_exception_in_catch_reaches_enclosing_try() {
    let source = "let f = null\n\
                  try {\n\
                    try { throw \"a\" } catch (e) { throw \"b\" }\n\
                  } catch (g) { f = g }";
    match eval_global(source, "f") {
        Value::Str(s) => assert!(s.contains('b'), "got {s:?}"),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn test_deeply_nested_unwinding() {
    let interp = run(
        "let log = []\n\
         try {\n\
           try {\n\
             try { throw \"deep\" } catch (a) { push(log, \"inner:\" + a)\nthrow \"up\" }\n\
           } catch (b) { push(log, \"mid:\" + b)\nthrow \"top\" }\n\
         } catch (c) { push(log, \"outer:\" + c) }\n\
         let out = join(log, \";\")",
    );
    assert_eq!(
        interp.get_global("out"),
        Some(Value::Str("inner:deep;mid:up;outer:top".into()))
    );
}

#[test]
fn test_runtime_error_inside_try_is_catchable() {
    let value = eval_global(
        "let e = null\ntry { let x = missing_name } catch (got) { e = got }",
        "e",
    );
    match value {
        Value::Str(s) => assert!(s.contains("undefined variable"), "got {s:?}"),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn test_uncaught_exception_fails_the_run() {
    match run_err("throw \"unhandled\"") {
        JungError::Uncaught(msg) => assert_eq!(msg, "unhandled"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_loop_flow_passes_through_try() {
    // break inside try exits the loop, not the catch
    let interp = run(
        "let n = 0\n\
         while true {\n\
           try { n += 1\nif n > 2 { break } } catch (e) { n = 100 }\n\
         }",
    );
    assert_eq!(interp.get_global("n"), Some(Value::Int(3)));
}

// ============================================
// 7. Functions and Defaults
// ============================================

#[test]
fn test_all_defaults_callable_with_no_args() {
    let interp = run(
        "fn f(a = 1, b = 2, c = 3) { return a + b + c }\n\
         let x = f()\n\
         let y = f(10)\n\
         let z = f(10, 20)",
    );
    assert_eq!(interp.get_global("x"), Some(Value::Int(6)));
    assert_eq!(interp.get_global("y"), Some(Value::Int(15)));
    assert_eq!(interp.get_global("z"), Some(Value::Int(33)));
}

#[test]
fn test_default_may_reference_earlier_parameter() {
    // Defaults evaluate in the callee's fresh scope, left to right
    let interp = run("fn f(a, b = a * 2) { return b }\nlet x = f(5)");
    assert_eq!(interp.get_global("x"), Some(Value::Int(10)));
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let interp = run(
        "let order = []\n\
         fn note(n) { push(order, n)\nreturn n }\n\
         fn three(a, b, c) { return 0 }\n\
         three(note(1), note(2), note(3))\n\
         let out = join(order, \"\")",
    );
    assert_eq!(interp.get_global("out"), Some(Value::Str("123".into())));
}

// ============================================
// 8. Objects and Presence
// ============================================

#[test]
fn test_has_discriminates_absence_from_null() {
    let interp = run(
        "let o = {present: null}\n\
         let stored = o[\"present\"] == null\n\
         let absent = o[\"missing\"] == null\n\
         let has_present = has(o, \"present\")\n\
         let has_missing = has(o, \"missing\")",
    );
    // Both reads yield null; only has() tells them apart
    assert_eq!(interp.get_global("stored"), Some(Value::Bool(true)));
    assert_eq!(interp.get_global("absent"), Some(Value::Bool(true)));
    assert_eq!(interp.get_global("has_present"), Some(Value::Bool(true)));
    assert_eq!(interp.get_global("has_missing"), Some(Value::Bool(false)));
}

// ============================================
// 9. Ranges
// ============================================

#[test]
fn test_range_length_and_contents() {
    let interp = run(
        "let r = range(5)\n\
         let n = len(r)\n\
         let spot_checks = r[0] == 0 and r[2] == 2 and r[4] == 4\n\
         let empty = len(range(0)) + len(range(-3))",
    );
    assert_eq!(interp.get_global("n"), Some(Value::Int(5)));
    assert_eq!(interp.get_global("spot_checks"), Some(Value::Bool(true)));
    assert_eq!(interp.get_global("empty"), Some(Value::Int(0)));
}

// ============================================
// 10. Scoping and Dispatch
// ============================================

#[test]
fn test_function_sees_live_scope_chain() {
    // No lexical capture: the body resolves names at call time
    let interp = run(
        "fn read_it() { return it }\n\
         fn caller() { let it = \"live\"\nreturn read_it() }\n\
         let x = caller()",
    );
    assert_eq!(interp.get_global("x"), Some(Value::Str("live".into())));
}

#[test]
fn test_loop_variable_is_fresh_per_iteration() {
    let interp = run(
        "let seen = []\n\
         for i in range(3) { let double = i * 2\npush(seen, double) }\n\
         let out = join(seen, \",\")",
    );
    assert_eq!(interp.get_global("out"), Some(Value::Str("0,2,4".into())));
}

#[test]
fn test_class_instances_share_identity() {
    let interp = run(
        "class Bag { fn init() { this.items = [] } }\n\
         let a = new Bag()\n\
         let b = a\n\
         let same = a == b\n\
         let fresh = a == new Bag()",
    );
    assert_eq!(interp.get_global("same"), Some(Value::Bool(true)));
    assert_eq!(interp.get_global("fresh"), Some(Value::Bool(false)));
}

#[test]
fn test_methods_on_separate_instances_do_not_interfere() {
    let interp = run(
        "class Counter {\n\
           fn init(start) { this.n = start }\n\
           fn bump() { this.n += 1\nreturn this.n }\n\
         }\n\
         let a = new Counter(0)\n\
         let b = new Counter(100)\n\
         a.bump()\n\
         a.bump()\n\
         b.bump()\n\
         let an = a.n\n\
         let bn = b.n",
    );
    assert_eq!(interp.get_global("an"), Some(Value::Int(2)));
    assert_eq!(interp.get_global("bn"), Some(Value::Int(101)));
}

#[test]
fn test_constructor_alias_name() {
    let interp = run(
        "class Alt { fn constructor(v) { this.v = v } }\n\
         let a = new Alt(9)\n\
         let v = a.v",
    );
    assert_eq!(interp.get_global("v"), Some(Value::Int(9)));
}

#[test]
fn test_jungian_program_runs_like_conventional() {
    let interp = run(
        "archetype Psyche {\n\
           individuation init(n) { Self.name = n }\n\
           dream describe() { manifest \"psyche of \" + Self.name }\n\
         }\n\
         perceive p = emerge Psyche(\"Carl\")\n\
         perceive described = p.describe()\n\
         confront { reject \"shadow\" } embrace (e) { perceive caught = e }",
    );
    assert_eq!(
        interp.get_global("described"),
        Some(Value::Str("psyche of Carl".into()))
    );
}

// ============================================
// 11. Truthiness
// ============================================

#[test]
fn test_truthiness_table() {
    let interp = run(
        "fn truthy(v) { return v ? true : false }\n\
         let falsies = [truthy(null), truthy(false), truthy(0), truthy(\"\"), truthy([])]\n\
         let truthies = [truthy(1), truthy(\"x\"), truthy([0]), truthy({})]\n\
         let all_false = not (falsies[0] or falsies[1] or falsies[2] or falsies[3] or falsies[4])\n\
         let all_true = truthies[0] and truthies[1] and truthies[2] and truthies[3]",
    );
    assert_eq!(interp.get_global("all_false"), Some(Value::Bool(true)));
    assert_eq!(interp.get_global("all_true"), Some(Value::Bool(true)));
}
