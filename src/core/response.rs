//! Telegram message-size utilities
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

/// Telegram message text limit in bytes
pub const MESSAGE_LIMIT: usize = 4096;

/// Truncate text to fit a Telegram message (UTF-8 safe)
///
/// Cuts at a character boundary and appends an ellipsis marker when the
/// text had to be shortened.
pub fn truncate_for_message(text: &str) -> String {
    truncate_text(text, MESSAGE_LIMIT)
}

fn truncate_text(text: &str, max_size: usize) -> String {
    if text.len() <= max_size {
        return text.to_string();
    }

    const MARKER: &str = "…";
    let budget = max_size.saturating_sub(MARKER.len());

    let mut cut = 0;
    for (idx, ch) in text.char_indices() {
        if idx + ch.len_utf8() > budget {
            break;
        }
        cut = idx + ch.len_utf8();
    }

    let mut result = text[..cut].to_string();
    result.push_str(MARKER);
    result
}
