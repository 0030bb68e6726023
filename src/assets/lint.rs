// src/assets/lint.rs

//! A small line-based JavaScript linter.
//!
//! Findings are warnings only: they are logged and never block the bundle.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DEBUGGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bdebugger\b").unwrap());
static EVAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\beval\s*\(").unwrap());
static LOOSE_EQ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^=!<>])(==|!=)(?:[^=]|$)").unwrap());
static TRAILING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    NoDebugger,
    NoEval,
    EqEqEq,
    TrailingWhitespace,
}

impl fmt::Display for LintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LintRule::NoDebugger => "no-debugger",
            LintRule::NoEval => "no-eval",
            LintRule::EqEqEq => "eqeqeq",
            LintRule::TrailingWhitespace => "trailing-whitespace",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    /// 1-based line number.
    pub line: usize,
    pub rule: LintRule,
    pub message: String,
}

/// Lint a single source file.
pub fn lint_source(source: &str) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;

        if TRAILING_WS.is_match(raw_line) {
            warnings.push(LintWarning {
                line: line_no,
                rule: LintRule::TrailingWhitespace,
                message: "trailing whitespace".to_string(),
            });
        }

        let code = strip_line_comment(raw_line);
        if code.trim().is_empty() {
            continue;
        }

        if DEBUGGER.is_match(code) {
            warnings.push(LintWarning {
                line: line_no,
                rule: LintRule::NoDebugger,
                message: "forgotten 'debugger' statement".to_string(),
            });
        }
        if EVAL.is_match(code) {
            warnings.push(LintWarning {
                line: line_no,
                rule: LintRule::NoEval,
                message: "eval can be harmful".to_string(),
            });
        }
        if let Some(caps) = LOOSE_EQ.captures(code) {
            let op = &caps[1];
            let strict = if op == "==" { "===" } else { "!==" };
            warnings.push(LintWarning {
                line: line_no,
                rule: LintRule::EqEqEq,
                message: format!("expected '{strict}' and instead saw '{op}'"),
            });
        }
    }

    warnings
}

/// Drop a trailing `// ...` comment. String literals are not parsed, so a
/// `//` inside a string also cuts the line; that only hides findings.
fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
