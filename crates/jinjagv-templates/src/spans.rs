/// Byte range within a template source, as (start, length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }
}

/// Byte offsets of line starts, for mapping positions to line/column pairs
/// in diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineOffsets(Vec<u32>);

impl LineOffsets {
    /// Scan a source once and record where each line begins.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let mut offsets = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(idx + 1).unwrap_or(u32::MAX));
            }
        }
        Self(offsets)
    }

    /// Map a byte position to a 1-based line and 0-based column.
    #[must_use]
    pub fn position_to_line_col(&self, position: usize) -> (usize, usize) {
        let position = u32::try_from(position).unwrap_or_default();
        let line = match self.0.binary_search(&position) {
            Ok(exact_line) => exact_line,
            Err(0) => 0,
            Err(next_line) => next_line - 1,
        };

        let col = (position - self.0[line]) as usize;

        (line + 1, col)
    }
}

impl Default for LineOffsets {
    fn default() -> Self {
        Self(vec![0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_is_line_one() {
        let offsets = LineOffsets::from_source("");
        assert_eq!(offsets.position_to_line_col(0), (1, 0));
    }

    #[test]
    fn test_line_starts() {
        let offsets = LineOffsets::from_source("abc\ndefgh\nij");
        assert_eq!(offsets.position_to_line_col(0), (1, 0));
        assert_eq!(offsets.position_to_line_col(2), (1, 2));
        assert_eq!(offsets.position_to_line_col(4), (2, 0));
        assert_eq!(offsets.position_to_line_col(10), (3, 0));
        assert_eq!(offsets.position_to_line_col(11), (3, 1));
    }
}
