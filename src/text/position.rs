use tower_lsp_server::ls_types::{Position, Range};

/// Maps between LSP positions (UTF-16 columns) and byte offsets in one text.
pub struct PositionMapper<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> PositionMapper<'a> {
    /// Create a new PositionMapper with pre-computed line starts
    pub fn new(text: &'a str) -> Self {
        let line_starts = compute_line_starts(text);
        Self { text, line_starts }
    }

    /// Convert LSP Position to byte offset in the document.
    ///
    /// A column past the end of its line clamps to the line end; a line past
    /// the end of the text yields `None`.
    pub fn position_to_byte(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = *self.line_starts.get(line)?;
        let line_text = &self.text[line_start..self.line_end(line)];

        match convert_utf16_to_byte_in_line(line_text, position.character as usize) {
            Some(byte_offset) => Some(line_start + byte_offset),
            None => Some(line_start + line_text.len()),
        }
    }

    /// Convert byte offset to LSP Position
    pub fn byte_to_position(&self, offset: usize) -> Option<Position> {
        if offset > self.text.len() {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let line_text = &self.text[line_start..self.line_end(line)];
        let character =
            convert_byte_to_utf16_in_line(line_text, offset - line_start).unwrap_or(0);

        Some(Position {
            line: line as u32,
            character: character as u32,
        })
    }

    /// Position just past the last character.
    pub fn end_position(&self) -> Position {
        let last = self.line_starts.len() - 1;
        let line_text = &self.text[self.line_starts[last]..];
        Position {
            line: last as u32,
            character: line_text.encode_utf16().count() as u32,
        }
    }

    /// Range covering the whole text.
    pub fn full_range(&self) -> Range {
        Range {
            start: Position {
                line: 0,
                character: 0,
            },
            end: self.end_position(),
        }
    }

    /// Byte offset where `line`'s content ends, excluding its newline.
    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        }
    }
}

/// Compute line start offsets for efficient position mapping
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Convert UTF-16 position to byte position within a line
/// Returns None if the UTF-16 position is beyond the end of the line
#[inline(always)]
pub fn convert_utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut byte_offset = 0;
    let mut utf16_offset = 0;

    for ch in line_text.chars() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
        byte_offset += ch.len_utf8();
    }

    (utf16_offset == utf16_pos).then_some(byte_offset)
}

/// Convert byte position to UTF-16 position within a line
/// Returns None if the byte position is in the middle of a multi-byte character
#[inline(always)]
pub fn convert_byte_to_utf16_in_line(line_text: &str, byte_pos: usize) -> Option<usize> {
    let prefix = line_text.get(..byte_pos)?;
    Some(prefix.encode_utf16().count())
}
