//! Integration tests for the IPPcode24 CLI.
//!
//! These tests invoke the `ippcode` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn ippcode() -> Command {
    Command::cargo_bin("ippcode").unwrap()
}

/// Return the workspace root (parent of ippcode-cli/).
fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Return the absolute path to a test program file.
fn test_program(name: &str) -> PathBuf {
    workspace_root().join("tests/programs").join(name)
}

/// Wrap instruction elements in an IPPcode24 program document.
fn program(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<program language=\"IPPcode24\">\n{body}\n</program>\n"
    )
}

/// Write `content` into `dir` under `name`, returning the path.
fn write_temp(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Run a program given inline, with empty READ input.
fn run_inline(body: &str) -> assert_cmd::assert::Assert {
    let dir = TempDir::new().unwrap();
    let source = write_temp(&dir, "prog.xml", &program(body));
    let input = write_temp(&dir, "prog.in", "");
    ippcode()
        .arg("--source")
        .arg(&source)
        .arg("--input")
        .arg(&input)
        .assert()
}

// ---- Parameters ----

#[test]
fn no_args_exits_10() {
    ippcode()
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn help_flag_exits_0() {
    ippcode()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: ippcode"));
}

#[test]
fn unknown_option_exits_10() {
    ippcode().arg("--frobnicate").assert().failure().code(10);
}

#[test]
fn missing_source_file_exits_11() {
    let dir = TempDir::new().unwrap();
    ippcode()
        .arg("--source")
        .arg(dir.path().join("absent.xml"))
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn missing_input_file_exits_11() {
    ippcode()
        .arg("--source")
        .arg(test_program("hello.xml"))
        .arg("--input")
        .arg(workspace_root().join("tests/programs/absent.in"))
        .assert()
        .failure()
        .code(11);
}

// ---- Loading ----

#[test]
fn malformed_xml_exits_31() {
    let dir = TempDir::new().unwrap();
    let source = write_temp(&dir, "bad.xml", "<program language=\"IPPcode24\">");
    ippcode()
        .arg("--source")
        .arg(&source)
        .write_stdin("")
        .assert()
        .failure()
        .code(31);
}

#[test]
fn wrong_language_exits_32() {
    let dir = TempDir::new().unwrap();
    let source = write_temp(&dir, "lang.xml", "<program language=\"IPPcode23\"/>");
    ippcode()
        .arg("--source")
        .arg(&source)
        .write_stdin("")
        .assert()
        .failure()
        .code(32);
}

#[test]
fn unknown_opcode_exits_32() {
    run_inline(r#"<instruction order="1" opcode="FROBNICATE"/>"#)
        .failure()
        .code(32);
}

#[test]
fn duplicate_label_exits_52() {
    run_inline(
        r#"<instruction order="1" opcode="LABEL"><arg1 type="label">x</arg1></instruction>
<instruction order="2" opcode="LABEL"><arg1 type="label">x</arg1></instruction>"#,
    )
    .failure()
    .code(52);
}

#[test]
fn empty_program_exits_0() {
    run_inline("").success().stdout("");
}

// ---- Execution ----

#[test]
fn hello_world() {
    let dir = TempDir::new().unwrap();
    let input = write_temp(&dir, "empty.in", "");
    ippcode()
        .arg("--source")
        .arg(test_program("hello.xml"))
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout("Hello, world!\n");
}

#[test]
fn source_from_stdin() {
    let dir = TempDir::new().unwrap();
    let input = write_temp(&dir, "empty.in", "");
    let text = fs::read_to_string(test_program("hello.xml")).unwrap();
    ippcode()
        .arg("--input")
        .arg(&input)
        .write_stdin(text)
        .assert()
        .success()
        .stdout("Hello, world!\n");
}

#[test]
fn input_from_stdin() {
    let dir = TempDir::new().unwrap();
    let source = write_temp(
        &dir,
        "echo.xml",
        &program(
            r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@s</arg1></instruction>
<instruction order="2" opcode="READ"><arg1 type="var">GF@s</arg1><arg2 type="type">string</arg2></instruction>
<instruction order="3" opcode="WRITE"><arg1 type="var">GF@s</arg1></instruction>"#,
        ),
    );
    ippcode()
        .arg("--source")
        .arg(&source)
        .write_stdin("echoed line\nignored\n")
        .assert()
        .success()
        .stdout("echoed line");
}

#[test]
fn read_string_escapes_are_written_decoded() {
    let dir = TempDir::new().unwrap();
    let source = write_temp(
        &dir,
        "echo.xml",
        &program(
            r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@s</arg1></instruction>
<instruction order="2" opcode="READ"><arg1 type="var">GF@s</arg1><arg2 type="type">string</arg2></instruction>
<instruction order="3" opcode="WRITE"><arg1 type="var">GF@s</arg1></instruction>"#,
        ),
    );
    let input = write_temp(&dir, "echo.in", "ab\\065c\n");
    ippcode()
        .arg("--source")
        .arg(&source)
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout("abAc");
}

#[test]
fn exit_code_propagates() {
    run_inline(r#"<instruction order="1" opcode="EXIT"><arg1 type="int">7</arg1></instruction>"#)
        .failure()
        .code(7);
}

#[test]
fn runtime_error_code_and_message() {
    run_inline(
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
<instruction order="2" opcode="POPS"><arg1 type="var">GF@x</arg1></instruction>"#,
    )
    .failure()
    .code(56)
    .stderr(predicate::str::contains("data stack is empty at order 2"));
}

#[test]
fn output_before_error_is_kept() {
    run_inline(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">partial</arg1></instruction>
<instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
<instruction order="3" opcode="IDIV"><arg1 type="var">GF@x</arg1><arg2 type="int">1</arg2><arg3 type="int">0</arg3></instruction>"#,
    )
    .failure()
    .code(57)
    .stdout("partial");
}

#[test]
fn dprint_goes_to_stderr() {
    run_inline(
        r#"<instruction order="1" opcode="DPRINT"><arg1 type="string">debug\032only</arg1></instruction>
<instruction order="2" opcode="WRITE"><arg1 type="bool">true</arg1></instruction>"#,
    )
    .success()
    .stdout("true")
    .stderr(predicate::str::contains("debug only"));
}

#[test]
fn break_reports_state_on_stderr() {
    run_inline(
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
<instruction order="2" opcode="BREAK"/>"#,
    )
    .success()
    .stdout("")
    .stderr(predicate::str::contains("BREAK at order 2"));
}

#[test]
fn log_filter_from_environment() {
    let dir = TempDir::new().unwrap();
    let input = write_temp(&dir, "empty.in", "");
    ippcode()
        .env("IPPCODE_LOG", "info")
        .arg("--source")
        .arg(test_program("hello.xml"))
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout("Hello, world!\n")
        .stderr(predicate::str::contains("program loaded"));
}

// ---- Sample programs ----

#[test]
fn factorial_from_input_file() {
    ippcode()
        .arg("--source")
        .arg(test_program("factorial.xml"))
        .arg("--input")
        .arg(test_program("factorial.in"))
        .assert()
        .success()
        .stdout("720");
}
