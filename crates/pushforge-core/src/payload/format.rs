use serde_json::Value;

/// Re-serializes JSON with 2-space indentation and sorted keys.
pub fn pretty_print(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Re-serializes JSON without insignificant whitespace.
pub fn minify(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string(&value).ok()
}

/// UTF-8 size, the unit of the payload ceiling.
pub fn byte_count(text: &str) -> usize {
    text.len()
}

/// Replaces typographic characters editors like to insert: curly double
/// quotes become `"`, curly single quotes `'`, em/en dashes `-`.
///
/// Idempotent: none of the replacements is itself replaced.
pub fn auto_fix_common_issues(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2014}' | '\u{2013}' => '-',
            other => other,
        })
        .collect()
}
