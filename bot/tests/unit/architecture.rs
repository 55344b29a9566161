//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries hold and
//! that secret material never reaches a log macro.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

fn src(parts: &[&str]) -> PathBuf {
    parts
        .iter()
        .fold(Path::new(env!("CARGO_MANIFEST_DIR")).join("src"), |p, s| p.join(s))
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-test, non-comment lines of every file under `dir`, with their
/// 1-based line numbers.
fn production_lines(dir: &Path) -> Vec<(String, usize, String)> {
    let mut out = Vec::new();
    for file in collect_rs_files(dir) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let rel = relative(&file);
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") || trimmed.is_empty() {
                continue;
            }
            out.push((rel.clone(), i + 1, line.to_string()));
        }
    }
    out
}

fn forbid(dir: &Path, patterns: &[&str], what: &str) {
    let violations: Vec<String> = production_lines(dir)
        .into_iter()
        .filter_map(|(rel, lineno, line)| {
            patterns
                .iter()
                .find(|p| line.contains(*p))
                .map(|p| format!("{rel}:{lineno}: `{p}`: {line}"))
        })
        .collect();

    assert!(
        violations.is_empty(),
        "{what}:\n{}",
        violations.join("\n")
    );
}

// ── Layering ──────────────────────────────────────────────────────────────────

#[test]
fn domain_is_free_of_io_and_outer_layers() {
    forbid(
        &src(&["domain"]),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::server",
            "crate::output",
            "tokio::",
            "std::fs",
            "std::net",
            "std::process",
        ],
        "domain/ must stay pure",
    );
}

#[test]
fn application_depends_only_on_domain() {
    forbid(
        &src(&["application"]),
        &[
            "crate::infra",
            "crate::commands",
            "crate::server",
            "crate::output",
            "aws_sdk_",
            "aws_config",
            "axum",
        ],
        "application/ must only import from domain/ and its own ports",
    );
}

#[test]
fn infra_has_no_imports_from_outer_layers() {
    forbid(
        &src(&["infra"]),
        &["crate::commands", "crate::output", "crate::server"],
        "infra/ must not import from commands/, output/ or server/",
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    forbid(
        &src(&["infra"]),
        &["println!", "eprintln!"],
        "infra/ must log through tracing, not print",
    );
}

#[test]
fn cloud_sdk_is_confined_to_the_aws_adapter() {
    let violations: Vec<String> = production_lines(&src(&[]))
        .into_iter()
        .filter(|(rel, _, line)| {
            !rel.ends_with("aws.rs") && (line.contains("aws_sdk_") || line.contains("aws_config::"))
        })
        .map(|(rel, lineno, line)| format!("{rel}:{lineno}: {line}"))
        .collect();

    assert!(
        violations.is_empty(),
        "AWS SDK types must stay inside infra/aws.rs:\n{}",
        violations.join("\n")
    );
}

// ── Secrets ───────────────────────────────────────────────────────────────────

#[test]
fn no_log_macro_touches_secret_material() {
    let macros = ["trace!(", "debug!(", "info!(", "warn!(", "error!("];
    let secret_markers = ["expose_secret", "password"];

    let mut violations = Vec::new();
    let mut in_macro = false;
    for (rel, lineno, line) in production_lines(&src(&[])) {
        if macros.iter().any(|m| line.contains(m)) {
            in_macro = true;
        }
        if in_macro && secret_markers.iter().any(|s| line.contains(s)) {
            violations.push(format!("{rel}:{lineno}: {line}"));
        }
        if in_macro && line.trim_end().ends_with(");") {
            in_macro = false;
        }
    }

    assert!(
        violations.is_empty(),
        "secret material must never be passed to a log macro:\n{}",
        violations.join("\n")
    );
}
