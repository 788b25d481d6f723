//! End-to-end tests: run the built interpreter over the scripts in
//! `test-scripts/integration/` and check stdout/stderr against the
//! expectations embedded in each script as comments:
//!
//! ```text
//! print 1 + 2; // expect: 3
//! 1();         // error: Can only call functions and classes.
//! ```

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use test_generator::test_resources;

#[test_resources("test-scripts/integration/**/*.lox")]
fn run_lox_script(script_path: &str) {
    let script = PathBuf::from(script_path);

    let (expected_output, expected_errors) =
        parse_expectations(&script).expect("failed to parse script expectations");

    let interpreter = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/debug/rulox");

    let output = Command::new(&interpreter)
        .arg(&script)
        .output()
        .expect("failed to run the interpreter");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    for expected in &expected_output {
        assert!(
            stdout.contains(expected),
            "expected '{}' on stdout of {}, got:\n{}",
            expected,
            script.display(),
            stdout
        );
    }

    for expected in &expected_errors {
        assert!(
            stderr.contains(expected),
            "expected '{}' on stderr of {}, got:\n{}",
            expected,
            script.display(),
            stderr
        );
    }

    let expected_code = if !expected_errors.is_empty() {
        // Scripts distinguish parse from runtime failures in the marker.
        if has_parse_error_marker(&script) {
            65
        } else {
            70
        }
    } else {
        0
    };
    assert_eq!(
        output.status.code(),
        Some(expected_code),
        "wrong exit code for {}",
        script.display()
    );
}

fn parse_expectations(script: &Path) -> Result<(Vec<String>, Vec<String>), std::io::Error> {
    let content = fs::read_to_string(script)?;

    let expect_regex = Regex::new(r"// expect:\s*(.+)").unwrap();
    let error_regex = Regex::new(r"// (?:parse )?error:\s*(.+)").unwrap();

    let mut expected_output = Vec::new();
    let mut expected_errors = Vec::new();

    for line in content.lines() {
        if let Some(captures) = expect_regex.captures(line) {
            expected_output.push(captures[1].trim().to_string());
        }

        if let Some(captures) = error_regex.captures(line) {
            expected_errors.push(captures[1].trim().to_string());
        }
    }

    Ok((expected_output, expected_errors))
}

fn has_parse_error_marker(script: &Path) -> bool {
    fs::read_to_string(script)
        .map(|content| content.contains("// parse error:"))
        .unwrap_or(false)
}
