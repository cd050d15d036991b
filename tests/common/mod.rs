#![allow(dead_code)]

use mython::{run_program, MythonError};

/// Runs a program and returns everything it printed.
pub fn run(source: &str) -> String {
    let mut out = Vec::new();
    run_program(source, &mut out).expect("program should run");
    String::from_utf8(out).expect("output should be UTF-8")
}

/// Runs a program that is expected to fail and returns the error.
pub fn run_err(source: &str) -> MythonError {
    let mut out = Vec::new();
    match run_program(source, &mut out) {
        Ok(()) => panic!("program should fail: {:?}", source),
        Err(err) => err,
    }
}

/// Runs a program that is expected to fail and returns the output produced
/// before the failure, together with the error.
pub fn run_partial(source: &str) -> (String, MythonError) {
    let mut out = Vec::new();
    match run_program(source, &mut out) {
        Ok(()) => panic!("program should fail: {:?}", source),
        Err(err) => (
            String::from_utf8(out).expect("output should be UTF-8"),
            err,
        ),
    }
}
