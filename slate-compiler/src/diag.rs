//! Diagnostics: a message plus a blame describing what to point at.
//!
//! Three flavors exist. Bound diagnostics carry a source region resolved to
//! line/column at construction time. Unbound diagnostics are raised by layers
//! that do not know the offending syntax node (the value model) and are bound
//! by the caller. Generic errors carry only a message.

use std::fmt;
use std::fs;

use crate::source_map::SourceIndex;

/// What a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blame {
    /// A span within a single source line. `caret` is the column the caret is
    /// drawn under; it always satisfies `col <= caret <= col + extent`.
    TextSingleLine {
        file: String,
        line: u32,
        col: u32,
        extent: u32,
        caret: u32,
    },
    /// A region spanning several source lines.
    TextMultiLine {
        file: String,
        line_start: u32,
        line_end: u32,
    },
    /// A byte offset in a binary file.
    Binary { file: String, offset: u64 },
    /// A failed external command, with its combined output.
    Command {
        cmd: String,
        invocation: String,
        output: String,
    },
    None,
}

/// A diagnostic produced anywhere in the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub blame: Blame,
    pub msg: String,
}

/// A diagnostic raised without knowledge of the offending syntax node.
/// The caller binds it to a source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundDiag(pub String);

impl fmt::Display for UnboundDiag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Diag {
    /// A generic error: message only, nothing to point at.
    pub fn generic(msg: impl Into<String>) -> Self {
        Self {
            blame: Blame::None,
            msg: msg.into(),
        }
    }

    pub fn command(
        cmd: impl Into<String>,
        invocation: impl Into<String>,
        output: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            blame: Blame::Command {
                cmd: cmd.into(),
                invocation: invocation.into(),
                output: output.into(),
            },
            msg: msg.into(),
        }
    }

    /// Bind a source byte range to a text blame. Line and column are 1-based
    /// in the rendered output.
    pub fn bound(
        file: &str,
        index: &SourceIndex,
        start: usize,
        end: usize,
        msg: impl Into<String>,
    ) -> Self {
        let (l1, c1) = index.to_line_col(start);
        let (l2, c2) = index.to_line_col(end);
        let blame = if l1 == l2 {
            Blame::TextSingleLine {
                file: file.to_string(),
                line: (l1 + 1) as u32,
                col: (c1 + 1) as u32,
                extent: c2.saturating_sub(c1) as u32,
                caret: (c1 + 1) as u32,
            }
        } else {
            Blame::TextMultiLine {
                file: file.to_string(),
                line_start: (l1 + 1) as u32,
                line_end: (l2 + 1) as u32,
            }
        };
        Self {
            blame,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for Diag {}

impl Blame {
    /// Short `file:line:col` style reference for the first output line.
    pub fn simple_ref(&self) -> String {
        match self {
            Blame::TextSingleLine {
                file,
                line,
                col,
                extent,
                ..
            } => {
                if *extent == 0 {
                    format!("{file}:{line}:{col}")
                } else {
                    format!("{file}:{line}:{col}-{}", col + extent)
                }
            }
            Blame::TextMultiLine {
                file,
                line_start,
                line_end,
            } => format!("{file}:{line_start}-{line_end}"),
            Blame::Binary { file, offset } => format!("{file}[offset {offset:X} bytes]"),
            Blame::Command { cmd, .. } => format!("command '{cmd}'"),
            Blame::None => String::new(),
        }
    }
}

/// Build the `~~~^~~` underline for a single-line blame. Columns are 1-based.
fn underline(col: u32, extent: u32, caret: u32) -> String {
    let mut out = String::new();
    for _ in 0..col.saturating_sub(1) {
        out.push(' ');
    }
    let width = extent.max(1);
    let caret_offset = caret.saturating_sub(col);
    for i in 0..width {
        out.push(if i == caret_offset { '^' } else { '~' });
    }
    out
}

/// Render a diagnostic to a string, pulling the offending line from disk for
/// single-line text blames. Silently omits the source excerpt when the file
/// cannot be read.
pub fn render(diag: &Diag) -> String {
    let mut out = String::new();
    match &diag.blame {
        Blame::None => {
            out.push_str(&format!("Error: {}\n", diag.msg));
            return out;
        }
        blame => {
            out.push_str(&format!("Error: {}: {}\n", blame.simple_ref(), diag.msg));
        }
    }
    match &diag.blame {
        Blame::TextSingleLine {
            file,
            line,
            col,
            extent,
            caret,
        } => {
            if let Ok(source) = fs::read_to_string(file) {
                let index = SourceIndex::new(&source);
                if let Some(text) = index.line_text(&source, *line as usize) {
                    out.push_str(&format!("\t{text}\n"));
                    out.push_str(&format!("\t{}\n", underline(*col, *extent, *caret)));
                }
            }
        }
        Blame::Command {
            invocation, output, ..
        } => {
            out.push_str(&format!("\tCommand invocation: {invocation}\n"));
            out.push_str(&format!("\tCommand output:\n{output}"));
        }
        _ => {}
    }
    out
}

/// Print a diagnostic to stderr.
pub fn print_diagnostic(diag: &Diag) {
    eprint!("{}", render(diag));
}
