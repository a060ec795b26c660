//! End-to-end tests through the `jung` binary.
//!
//! Each scenario is a complete source-to-output contract: the script is
//! written to a temp file, run through the compiled interpreter, and its
//! stdout, stderr, and exit status are checked.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to run a script file through the binary.
fn run_script(source: &str) -> assert_cmd::assert::Assert {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    Command::cargo_bin("jung")
        .unwrap()
        .arg(file.path())
        .assert()
}

// ============================================
// 1. End-to-End Scenarios
// ============================================

#[test]
fn test_hello_and_concatenation() {
    run_script(
        "fn greet(name) { print \"Hello, \" + name }\n\
         greet(\"World\")\n\
         print \"done\"\n",
    )
    .success()
    .stdout("Hello, World\ndone\n");
}

#[test]
fn test_integer_division_and_modulo() {
    run_script(
        "print 10 / 3\n\
         print 10 % 3\n\
         print 10.0 / 4\n",
    )
    .success()
    .stdout("3\n1\n2.5\n");
}

#[test]
fn test_class_and_method_dispatch() {
    run_script(
        "class Hero { fn init(n) { this.name = n }  fn quest() { return this.name + \" rides\" } }\n\
         let h = new Hero(\"Jung\")\n\
         print h.quest()\n",
    )
    .success()
    .stdout("Jung rides\n");
}

#[test]
fn test_exception_nesting() {
    run_script(
        "try {\n\
           try { throw \"inner\" } catch (e) { throw \"outer:\" + e }\n\
         } catch (f) { print f }\n",
    )
    .success()
    .stdout(predicate::str::ends_with("outer:inner\n"));
}

#[test]
fn test_string_interpolation() {
    run_script(
        "let n = \"Carl\"; let y = 1875\n\
         print \"${n} was born in ${y}, age ${2025 - y}\"\n",
    )
    .success()
    .stdout("Carl was born in 1875, age 150\n");
}

#[test]
fn test_for_in_over_array_and_object() {
    run_script(
        "for k in {a: 1, b: 2} { print k }\n\
         for v in [10, 20, 30] { print v }\n",
    )
    .success()
    .stdout("a\nb\n10\n20\n30\n");
}

// ============================================
// 2. Jungian Vocabulary
// ============================================

#[test]
fn test_jungian_spelling_end_to_end() {
    run_script(
        "dream greet(name) { project \"Hello, \" + name }\n\
         greet(\"World\")\n\
         project \"done\"\n",
    )
    .success()
    .stdout("Hello, World\ndone\n");
}

// ============================================
// 3. Exit Status Contracts
// ============================================

#[test]
fn test_uncaught_exception_exits_nonzero() {
    run_script("throw \"doom\"\n")
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Uncaught exception: doom"))
        .stdout("");
}

#[test]
fn test_runtime_error_exits_nonzero() {
    run_script("print 1 / 0\n")
        .failure()
        .code(1)
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn test_parse_error_exits_nonzero_with_location() {
    run_script("let = 5\n")
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn test_lex_error_exits_nonzero() {
    run_script("let s = \"open\n")
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unterminated string"));
}

#[test]
fn test_missing_file_exits_nonzero() {
    Command::cargo_bin("jung")
        .unwrap()
        .arg("/no/such/script.jung")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ============================================
// 4. Flags
// ============================================

#[test]
fn test_version_flags() {
    for flag in ["--version", "-v"] {
        Command::cargo_bin("jung")
            .unwrap()
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains("jung"));
    }
}

#[test]
fn test_help_flags() {
    for flag in ["--help", "-h"] {
        Command::cargo_bin("jung")
            .unwrap()
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }
}

#[test]
fn test_inline_eval_flag() {
    Command::cargo_bin("jung")
        .unwrap()
        .args(["-e", "print 2 + 2"])
        .assert()
        .success()
        .stdout("4\n");
}

// ============================================
// 5. REPL
// ============================================

#[test]
fn test_repl_prints_expression_values_and_keeps_state() {
    Command::cargo_bin("jung")
        .unwrap()
        .write_stdin("let x = 40\nx + 2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}

#[test]
fn test_repl_suppresses_null_and_statements() {
    let assert = Command::cargo_bin("jung")
        .unwrap()
        .write_stdin("let x = 1\nnull\n")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(!stdout.contains("null"), "stdout was {stdout:?}");
}

#[test]
fn test_repl_survives_errors() {
    Command::cargo_bin("jung")
        .unwrap()
        .write_stdin("nope\n1 + 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

// ============================================
// 6. Imports
// ============================================

#[test]
fn test_import_brings_definitions_into_scope() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib.jung");
    std::fs::write(&lib, "fn double(x) { return x * 2 }\n").unwrap();

    let main = dir.path().join("main.jung");
    std::fs::write(
        &main,
        format!("import \"{}\"\nprint double(21)\n", lib.display()),
    )
    .unwrap();

    Command::cargo_bin("jung")
        .unwrap()
        .arg(&main)
        .assert()
        .success()
        .stdout("42\n");
}
