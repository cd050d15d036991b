use std::io::Write;
use std::process::{Command, Stdio};

fn mython() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mython"))
}

#[test]
fn test_version_flag() {
    let output = mython()
        .arg("--version")
        .output()
        .expect("Failed to execute mython");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("mython"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_eval_flag() {
    let output = mython()
        .args(["--eval", "print 1 + 2\n"])
        .output()
        .expect("Failed to execute mython");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "3\n");
}

#[test]
fn test_program_from_stdin() {
    let mut child = mython()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn mython");

    child
        .stdin
        .as_mut()
        .expect("stdin should be piped")
        .write_all(b"a = 'from'\nb = ' stdin'\nprint a + b\n")
        .expect("Failed to write program");

    let output = child.wait_with_output().expect("Failed to wait for mython");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "from stdin\n");
}

#[test]
fn test_program_from_file() {
    let path = std::env::temp_dir().join("mython_cli_test_program.my");
    std::fs::write(&path, "print 'from file'\n").expect("Failed to write program file");

    let output = mython()
        .arg(&path)
        .output()
        .expect("Failed to execute mython");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "from file\n");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_file_fails() {
    let output = mython()
        .arg("definitely_not_here.my")
        .output()
        .expect("Failed to execute mython");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("definitely_not_here.my"));
}

#[test]
fn test_runtime_error_exit_code_and_stderr() {
    let output = mython()
        .args(["--eval", "print 1 / 0\n"])
        .output()
        .expect("Failed to execute mython");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error"));
    assert!(stderr.contains("division by zero"));
}

#[test]
fn test_parse_error_points_at_source() {
    let output = mython()
        .args(["--eval", "launch(1)\n", "--color", "never"])
        .output()
        .expect("Failed to execute mython");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("only methods"));
    assert!(stderr.contains("<eval>:1:1"));
}

#[test]
fn test_partial_output_before_error() {
    let output = mython()
        .args(["--eval", "print 'ok'\nprint missing\n"])
        .output()
        .expect("Failed to execute mython");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "ok\n");
}

#[test]
fn test_token_dump() {
    let output = mython()
        .args(["--tokens", "--eval", "a = 10\n"])
        .output()
        .expect("Failed to execute mython");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["Id{a}", "Char{=}", "Number{10}", "Newline"]);
}

#[test]
fn test_token_dump_reports_lex_errors() {
    let output = mython()
        .args(["--tokens", "--eval", "x = 'open"])
        .output()
        .expect("Failed to execute mython");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("never closed"));
}

#[test]
fn test_complete_subcommand() {
    let output = mython()
        .args(["complete", "bash"])
        .output()
        .expect("Failed to execute mython");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("mython"));
}
