use std::str::CharIndices;

/// Walks JSON text tracking whether each character sits inside a
/// double-quoted string literal.
///
/// Yields `(byte_index, char, in_string)`. Delimiting quotes report
/// `in_string == false`. A newline ends an unterminated string so one bad
/// literal cannot swallow the rest of the document.
pub(crate) struct JsonChars<'a> {
    chars: CharIndices<'a>,
    in_string: bool,
    escaped: bool,
}

impl<'a> JsonChars<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices(),
            in_string: false,
            escaped: false,
        }
    }
}

impl Iterator for JsonChars<'_> {
    type Item = (usize, char, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, ch) = self.chars.next()?;
        if !self.in_string {
            if ch == '"' {
                self.in_string = true;
            }
            return Some((idx, ch, false));
        }

        if self.escaped {
            self.escaped = false;
            return Some((idx, ch, true));
        }
        match ch {
            '\\' => {
                self.escaped = true;
                Some((idx, ch, true))
            }
            '"' => {
                self.in_string = false;
                Some((idx, ch, false))
            }
            '\n' => {
                self.in_string = false;
                Some((idx, ch, false))
            }
            _ => Some((idx, ch, true)),
        }
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub fn line_column(text: &str, byte_index: usize) -> (usize, usize) {
    let end = floor_char_boundary(text, byte_index.min(text.len()));
    let before = &text[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Byte offset of a 1-based (line, column) pair as reported by the parser.
/// The parser counts columns in bytes.
pub(crate) fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for _ in 1..line {
        match text[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => break,
        }
    }
    let offset = line_start + column.saturating_sub(1);
    floor_char_boundary(text, offset.min(text.len()))
}

/// Text around `offset`: up to 5 bytes before and 10 after, newlines flattened.
pub(crate) fn context_window(text: &str, offset: usize) -> String {
    let start = floor_char_boundary(text, offset.saturating_sub(5));
    let end = ceil_char_boundary(text, (offset + 10).min(text.len()));
    text[start..end].replace(['\n', '\r'], " ")
}

pub(crate) fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
