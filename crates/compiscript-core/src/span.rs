//! Byte spans and line/column recovery.
//!
//! Tokens and AST nodes carry byte ranges into the source; diagnostics need
//! line/column pairs. `LineIndex` maps between the two in O(log n).

/// Half-open byte range into the source text.
pub type Span = std::ops::Range<usize>;

/// Precomputed line-start offsets for a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line and 0-based column for a byte offset.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col as u32)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line() {
        let idx = LineIndex::new("let x = 1;\nlet y = 2;\n");
        assert_eq!(idx.line_col(0), (1, 0));
        assert_eq!(idx.line_col(4), (1, 4));
    }

    #[test]
    fn later_lines() {
        let idx = LineIndex::new("let x = 1;\nlet y = 2;\n");
        assert_eq!(idx.line_col(11), (2, 0));
        assert_eq!(idx.line_col(15), (2, 4));
    }

    #[test]
    fn offset_at_newline_belongs_to_its_line() {
        let idx = LineIndex::new("a\nb");
        assert_eq!(idx.line_col(1), (1, 1));
        assert_eq!(idx.line_col(2), (2, 0));
    }
}
