use serde::Serialize;
use serde_json::error::Category;

use super::scan::{context_window, line_column, offset_of, JsonChars};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    SmartQuote,
    TrailingComma,
    SingleQuote,
    LiteralTab,
    Syntax,
    Empty,
    MissingOpeningBrace,
    MissingClosingBrace,
    Unbalanced,
    TopLevelNotObject,
    Generic,
}

/// A located, human-readable problem with a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub fix: Option<String>,
    /// 1-based position, when the problem has one.
    pub position: Option<(usize, usize)>,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, message: impl Into<String>, fix: Option<&str>) -> Self {
        Self {
            kind,
            message: message.into(),
            fix: fix.map(str::to_string),
            position: None,
        }
    }

    fn at(kind: DiagnosticKind, text: &str, byte_index: usize, what: &str, fix: &str) -> Self {
        let (line, column) = line_column(text, byte_index);
        Self {
            kind,
            message: format!("{what} at line {line}, column {column}"),
            fix: Some(fix.to_string()),
            position: Some((line, column)),
        }
    }
}

const SMART_QUOTES: [(char, &str); 4] = [
    ('\u{201C}', "left double quotation mark"),
    ('\u{201D}', "right double quotation mark"),
    ('\u{2018}', "left single quotation mark"),
    ('\u{2019}', "right single quotation mark"),
];

/// Checks for the hand-authoring mistakes a generic parser reports badly.
///
/// Runs in a fixed order (smart quotes, trailing comma, single-quoted
/// strings, literal tabs) and reports the first hit.
pub(crate) fn pre_parse(text: &str) -> Option<Diagnostic> {
    smart_quote(text)
        .or_else(|| trailing_comma(text))
        .or_else(|| single_quoted_string(text))
        .or_else(|| literal_tab(text))
}

fn smart_quote_at(text: &str, idx: usize, ch: char) -> Option<Diagnostic> {
    SMART_QUOTES.iter().find(|(quote, _)| *quote == ch).map(|(quote, name)| {
        Diagnostic::at(
            DiagnosticKind::SmartQuote,
            text,
            idx,
            &format!("Smart quote {quote} ({name}, U+{:04X})", *quote as u32),
            "Replace curly quotes with straight double quotes (\"), or run auto-fix",
        )
    })
}

fn smart_quote(text: &str) -> Option<Diagnostic> {
    JsonChars::new(text)
        .filter(|(_, _, in_string)| !in_string)
        .find_map(|(idx, ch, _)| smart_quote_at(text, idx, ch))
}

/// A curly quote standing where a string delimiter belongs, looked for
/// without tracking strings: `"Hi”}` opens with a straight quote, so the
/// curly one ends up inside the string the parser never saw close.
fn delimiting_smart_quote(text: &str) -> Option<Diagnostic> {
    text.char_indices().find_map(|(idx, ch)| {
        if !SMART_QUOTES.iter().any(|(quote, _)| *quote == ch) {
            return None;
        }
        let before = text[..idx].trim_end().chars().next_back();
        let after = text[idx + ch.len_utf8()..].trim_start().chars().next();
        let delimits = matches!(before, Some('{' | '[' | ',' | ':'))
            || matches!(after, None | Some('}' | ']' | ',' | ':'));
        if delimits {
            smart_quote_at(text, idx, ch)
        } else {
            None
        }
    })
}

fn trailing_comma(text: &str) -> Option<Diagnostic> {
    let mut pending_comma: Option<usize> = None;
    for (idx, ch, in_string) in JsonChars::new(text) {
        if in_string {
            pending_comma = None;
            continue;
        }
        match ch {
            ',' => pending_comma = Some(idx),
            '}' | ']' => {
                if let Some(comma) = pending_comma {
                    return Some(Diagnostic::at(
                        DiagnosticKind::TrailingComma,
                        text,
                        comma,
                        &format!("Trailing comma before '{ch}'"),
                        "Remove the comma after the last item",
                    ));
                }
            }
            c if c.is_whitespace() => {}
            _ => pending_comma = None,
        }
    }
    None
}

fn single_quoted_string(text: &str) -> Option<Diagnostic> {
    let outside: Vec<(usize, char)> = JsonChars::new(text)
        .filter(|(_, _, in_string)| !in_string)
        .map(|(idx, ch, _)| (idx, ch))
        .collect();

    outside.iter().enumerate().find_map(|(pos, &(idx, ch))| {
        if ch != '\'' {
            return None;
        }
        let closed = outside[pos + 1..]
            .iter()
            .take_while(|(_, c)| *c != '\n')
            .any(|(_, c)| *c == '\'');
        closed.then(|| {
            Diagnostic::at(
                DiagnosticKind::SingleQuote,
                text,
                idx,
                "Single-quoted string",
                "JSON strings must use double quotes: replace 'text' with \"text\"",
            )
        })
    })
}

fn literal_tab(text: &str) -> Option<Diagnostic> {
    JsonChars::new(text)
        .find(|(_, ch, in_string)| *in_string && *ch == '\t')
        .map(|(idx, _, _)| {
            Diagnostic::at(
                DiagnosticKind::LiteralTab,
                text,
                idx,
                "Unescaped tab character inside a string",
                "Replace the tab with \\t",
            )
        })
}

/// Explains a structural parse failure as precisely as possible.
pub(crate) fn parse_failure(text: &str, error: &serde_json::Error) -> Diagnostic {
    if text.trim().is_empty() {
        return Diagnostic::new(
            DiagnosticKind::Empty,
            "Payload is empty",
            Some("Enter a JSON object, e.g. {\"aps\": {\"alert\": \"Hello\"}}, or pick a template"),
        );
    }

    if let Some(diagnostic) = delimiting_smart_quote(text) {
        return diagnostic;
    }

    if error.classify() == Category::Syntax && error.line() > 0 {
        let offset = offset_of(text, error.line(), error.column());
        let (line, column) = line_column(text, offset);
        let raw = error.to_string();
        let reason = raw
            .rsplit_once(" at line ")
            .map(|(reason, _)| reason.to_string())
            .unwrap_or(raw);
        let near = context_window(text, offset);
        return Diagnostic {
            kind: DiagnosticKind::Syntax,
            message: format!("Syntax error at line {line}, column {column}: {reason} (near `{near}`)"),
            fix: Some(syntax_fix(&reason).to_string()),
            position: Some((line, column)),
        };
    }

    structural(text)
}

fn syntax_fix(reason: &str) -> &'static str {
    if reason.contains("key must be a string") {
        "Wrap object keys in double quotes"
    } else if reason.contains("expected `:`") {
        "Add a colon between the key and its value"
    } else if reason.contains("expected `,` or `}`") || reason.contains("expected `,` or `]`") {
        "Add a comma between items"
    } else if reason.contains("trailing characters") {
        "Remove everything after the final closing brace"
    } else if reason.contains("control character") {
        "Escape newlines and tabs inside strings (\\n, \\t)"
    } else if reason.contains("expected value") {
        "Check for a missing value, an unquoted string or a stray character"
    } else {
        "Check the JSON near the reported position"
    }
}

/// Fallbacks when the parser gives no useful position (typically EOF).
fn structural(text: &str) -> Diagnostic {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return Diagnostic::new(
            DiagnosticKind::MissingOpeningBrace,
            "Payload must start with an opening brace '{'",
            Some("Add '{' at the beginning of the payload"),
        );
    }
    if !trimmed.ends_with('}') && !trimmed.ends_with(']') {
        return Diagnostic::new(
            DiagnosticKind::MissingClosingBrace,
            "Payload must end with a closing brace '}'",
            Some("Add '}' at the end of the payload"),
        );
    }

    let (mut braces, mut brackets) = (0i64, 0i64);
    for (_, ch, in_string) in JsonChars::new(text) {
        if in_string {
            continue;
        }
        match ch {
            '{' => braces += 1,
            '}' => braces -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
    }
    if let Some(diagnostic) = imbalance(braces, '{', '}').or_else(|| imbalance(brackets, '[', ']')) {
        return diagnostic;
    }

    Diagnostic::new(
        DiagnosticKind::Generic,
        "Invalid JSON syntax. Common causes: a missing comma between items, a missing colon \
         after a key, an unquoted key, or an unterminated string",
        None,
    )
}

fn imbalance(surplus: i64, open: char, close: char) -> Option<Diagnostic> {
    let plural = |n: i64| if n == 1 { "" } else { "s" };
    match surplus {
        0 => None,
        n if n > 0 => Some(Diagnostic::new(
            DiagnosticKind::Unbalanced,
            format!("Unbalanced '{open}{close}': missing {n} closing '{close}'{}", plural(n)),
            Some(format!("Add {n} '{close}' to close every '{open}'").as_str()),
        )),
        n => {
            let n = -n;
            Some(Diagnostic::new(
                DiagnosticKind::Unbalanced,
                format!("Unbalanced '{open}{close}': {n} extra closing '{close}'{}", plural(n)),
                Some(format!("Remove {n} '{close}' or add the missing '{open}'").as_str()),
            ))
        }
    }
}

/// The diagnostic for a parsed value that is not an object.
pub(crate) fn top_level_not_object() -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::TopLevelNotObject,
        "Top level must be a JSON object",
        Some("Wrap the payload in braces: { ... }"),
    )
}
