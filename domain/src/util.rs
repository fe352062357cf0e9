//! Shared string helpers for logs and console previews.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview: newlines collapsed to spaces, cut at `max_bytes`
/// with a trailing `...` when anything was dropped.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_str(&flat, max_bytes);
    if cut.len() < flat.len() {
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("SELECT * FROM albums", 6), "SELECT");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        let s = "Motörhead";
        // 'ö' occupies bytes 3..5; cutting at 4 backs up to 3
        assert_eq!(truncate_str(s, 4), "Mot");
    }

    #[test]
    fn preview_flattens_and_marks_cut() {
        assert_eq!(preview("SELECT 1\nFROM t", 100), "SELECT 1 FROM t");
        assert_eq!(preview("SELECT name FROM artists", 11), "SELECT name...");
    }
}
