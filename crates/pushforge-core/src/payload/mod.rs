//! Payload inspection: validation with diagnostics, content extraction and
//! formatting. Everything here is pure and synchronous.

mod diagnostics;
mod extract;
mod format;
mod scan;
mod validator;
mod verdict;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use extract::{content_or_default, extract_content, NotificationContent, FALLBACK_BODY_CHARS};
pub use format::{auto_fix_common_issues, byte_count, minify, pretty_print};
pub use scan::line_column;
pub use validator::{parses_as_json, validate};
pub use verdict::ValidationVerdict;

/// Validation ceiling in bytes (the APNs hard limit, applied to every target).
pub const MAX_PAYLOAD_BYTES: usize = 4096;
