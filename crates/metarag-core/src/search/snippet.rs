//! Snippet extraction for result display

const DEFAULT_MAX_LEN: usize = 200;

/// Extract a window of `content` around the first query term it contains
pub fn extract_snippet(content: &str, query: &str, max_length: Option<usize>) -> String {
    let max_len = max_length.unwrap_or(DEFAULT_MAX_LEN);
    let content = content.trim();

    if content.len() <= max_len {
        return content.to_string();
    }

    let center = find_query_position(content, query);
    let half_len = max_len / 2;
    let start = center.saturating_sub(half_len);
    let end = (start + max_len).min(content.len());
    let start = if end == content.len() {
        end.saturating_sub(max_len)
    } else {
        start
    };

    let (start, end) = adjust_to_word_boundaries(content, start, end, max_len / 4);

    let mut snippet = content[start..end].trim().to_string();
    if start > 0 {
        snippet = format!("...{}", snippet);
    }
    if end < content.len() {
        snippet = format!("{}...", snippet);
    }
    snippet
}

/// Byte offset of the first query term found in content
fn find_query_position(content: &str, query: &str) -> usize {
    let content_lower = content.to_lowercase();
    if content_lower.len() != content.len() {
        // Lowercasing changed byte offsets; fall back to the start
        return 0;
    }

    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() >= 3)
        .find_map(|term| content_lower.find(term))
        .unwrap_or(0)
}

/// Snap to whitespace within `slack` bytes of each edge, else cut at the
/// nearest char boundary
fn adjust_to_word_boundaries(
    content: &str,
    start: usize,
    end: usize,
    slack: usize,
) -> (usize, usize) {
    let start_floor = floor_char_boundary(content, start);
    let start = if start_floor == 0 {
        0
    } else {
        let window_start = floor_char_boundary(content, start_floor.saturating_sub(slack));
        content[window_start..start_floor]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| window_start + i + c.len_utf8())
            .unwrap_or(start_floor)
    };

    let end_floor = floor_char_boundary(content, end);
    let window_end = floor_char_boundary(content, (end_floor + slack).min(content.len()));
    let end = content[end_floor..window_end]
        .find(char::is_whitespace)
        .map(|i| end_floor + i)
        .unwrap_or(end_floor);

    (start, end.max(start))
}

fn floor_char_boundary(content: &str, mut index: usize) -> usize {
    while index > 0 && !content.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content() {
        assert_eq!(extract_snippet("Hello world", "hello", None), "Hello world");
    }

    #[test]
    fn test_long_content_is_windowed() {
        let content = format!("{} rate limits apply {}", "a ".repeat(200), "b ".repeat(200));
        let snippet = extract_snippet(&content, "rate limits", Some(60));
        assert!(snippet.contains("rate limits"));
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_multibyte_content() {
        let content = "é".repeat(300);
        let snippet = extract_snippet(&content, "x", Some(50));
        assert_eq!(snippet, format!("{}...", "é".repeat(25)));
    }

    #[test]
    fn test_unbroken_text_is_cut_to_max_length() {
        let content = format!("{}token{}", "x".repeat(300), "y".repeat(300));
        let snippet = extract_snippet(&content, "token", Some(50));
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("token"));
        assert_eq!(snippet.len(), 50 + 6);
    }

    #[test]
    fn test_whitespace_beyond_slack_is_ignored() {
        let content = format!("{} {}", "a".repeat(100), "b".repeat(400));
        let snippet = extract_snippet(&content, "", Some(60));
        assert_eq!(snippet, format!("{}...", "a".repeat(60)));
    }
}
