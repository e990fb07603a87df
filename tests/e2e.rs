use std::path::Path;
use std::process::{Command, Stdio};

fn go_available() -> bool {
    Command::new("go")
        .arg("version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a single e2e test: pipe a .gore transcript as stdin to the REPL, compare stdout to the .out file.
fn run_e2e_test(input_file: &Path) {
    let out_file = input_file.with_extension("out");
    assert!(
        out_file.exists(),
        "Missing .out file for {:?}",
        input_file.file_name().unwrap()
    );

    let input = std::fs::read_to_string(input_file).unwrap();
    let expected = std::fs::read_to_string(&out_file).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_gore"))
        .arg("--no-history")
        .current_dir(dir.path())
        .env_remove("GORE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::Write;
            child.stdin.take().unwrap().write_all(input.as_bytes())?;
            child.wait_with_output()
        })
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(
        stdout.trim(),
        expected.trim(),
        "\n=== E2E test failed: {:?} ===\n--- expected ---\n{}\n--- actual ---\n{}\n--- stderr ---\n{}",
        input_file.file_name().unwrap(),
        expected.trim(),
        stdout.trim(),
        stderr.trim(),
    );
}

/// Discover and run all .gore/.out pairs in tests/e2e/. Needs a Go toolchain.
#[test]
fn e2e_tests() {
    if !go_available() {
        eprintln!("skipping e2e tests: go not found on PATH");
        return;
    }
    let e2e_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/e2e");
    let mut entries: Vec<_> = std::fs::read_dir(&e2e_dir)
        .unwrap()
        .filter_map(|e| {
            let path = e.ok()?.path();
            if path.extension().map(|e| e == "gore").unwrap_or(false) {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    entries.sort();

    let mut failures = Vec::new();
    for path in &entries {
        if let Err(e) = std::panic::catch_unwind(|| run_e2e_test(path)) {
            let msg = if let Some(s) = e.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = e.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "unknown panic".to_string()
            };
            failures.push(msg);
        }
    }
    if !failures.is_empty() {
        panic!(
            "{} of {} e2e tests failed:\n{}",
            failures.len(),
            entries.len(),
            failures.join("\n")
        );
    }
}
