//! Offset to line/column conversion for diagnostics.
//!
//! The IR carries byte offsets; error messages want 1-indexed lines and
//! columns. `LineMap` does the conversion with a binary search over line
//! start offsets.

/// Line map for efficient offset -> line/column conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (`line_starts[0]` is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineMap { line_starts }
    }

    /// Number of lines in the source.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a 0-indexed line number.
    #[must_use]
    pub fn line_at(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert - 1,
        }
    }

    /// Convert a byte offset to 0-indexed (line, column).
    #[must_use]
    pub fn position(&self, offset: u32) -> (usize, usize) {
        let line = self.line_at(offset);
        let col = (offset - self.line_starts[line]) as usize;
        (line, col)
    }

    /// Starting byte offset of a 0-indexed line.
    #[must_use]
    pub fn line_start(&self, line: usize) -> u32 {
        self.line_starts[line]
    }

    /// The text of a 0-indexed line, without its trailing newline.
    #[must_use]
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> &'a str {
        let start = self.line_starts[line] as usize;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(source.len(), |&s| s as usize);
        source[start..end].trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
#[path = "tests/position.rs"]
mod tests;
