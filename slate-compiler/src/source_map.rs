//! Byte-offset to line/column conversion for diagnostic rendering.

/// Cached index of line start offsets for a source text (0-based line/col).
#[derive(Debug, Clone)]
pub struct SourceIndex {
    line_starts: Vec<usize>,
}

impl SourceIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        Self {
            line_starts: starts,
        }
    }

    /// Convert a byte offset to 0-based (line, column) using only line starts.
    pub fn to_line_col(&self, byte: usize) -> (usize, usize) {
        match self.line_starts.binary_search(&byte) {
            Ok(line_idx) => (line_idx, 0),
            Err(insert_pos) => {
                let line_idx = insert_pos.saturating_sub(1);
                let start = self.line_starts.get(line_idx).copied().unwrap_or(0);
                (line_idx, byte.saturating_sub(start))
            }
        }
    }

    /// Extract the text of a 1-based line number from `source`, without the
    /// trailing newline.
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let rest = &source[start..];
        Some(rest.split('\n').next().unwrap_or(rest))
    }
}
