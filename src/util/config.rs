//! Configuration file parsing utilities.
//!
//! Helpers for `key = value` files with comment skipping.

/// What: Check if a line should be skipped (empty or comment).
///
/// Inputs:
/// - `line`: Line to check
///
/// Output:
/// - `true` if the line should be skipped, `false` otherwise
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
#[must_use]
pub fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Parse a key-value pair from a line.
///
/// Inputs:
/// - `line`: Line containing key=value format
///
/// Output:
/// - `Some((key, value))` if parsing succeeds, `None` otherwise
///
/// Details:
/// - Splits on the first `=`; the key is lowercased with `.`, `-` and spaces folded to `_`.
/// - A trailing ` # comment` on the value is removed.
#[must_use]
pub fn parse_key_value(line: &str) -> Option<(String, String)> {
    let (raw_key, raw_val) = line.trim().split_once('=')?;
    let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
    if key.is_empty() {
        return None;
    }
    Some((key, strip_inline_comment(raw_val.trim()).to_string()))
}

/// What: Remove a trailing inline comment introduced by whitespace + `#`.
///
/// Details:
/// - `#` without preceding whitespace is kept so URLs with fragments survive.
#[must_use]
pub fn strip_inline_comment(val: &str) -> &str {
    val.find(" #")
        .or_else(|| val.find("\t#"))
        .map_or(val, |idx| val[..idx].trim_end())
}

/// Interpret common truthy spellings (`true`, `1`, `yes`, `on`).
#[must_use]
pub fn parse_bool(val: &str) -> bool {
    let lv = val.trim().to_ascii_lowercase();
    lv == "true" || lv == "1" || lv == "yes" || lv == "on"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Comments and blank lines are skipped.
    fn skips_comments_and_blank_lines() {
        assert!(skip_comment_or_empty("   "));
        assert!(skip_comment_or_empty("# c"));
        assert!(skip_comment_or_empty("// c"));
        assert!(skip_comment_or_empty("; c"));
        assert!(!skip_comment_or_empty("key = v"));
    }

    #[test]
    /// What: Key-value lines normalise keys and strip inline comments.
    ///
    /// Inputs:
    /// - Lines with dashed keys, inline comments, URL fragments, no `=`.
    ///
    /// Output:
    /// - Normalised pairs or `None`.
    fn parses_key_value_lines() {
        assert_eq!(
            parse_key_value("Step-Delay.MS = 250 # pacing"),
            Some(("step_delay_ms".into(), "250".into()))
        );
        assert_eq!(
            parse_key_value("server_url = https://h:8001/#x"),
            Some(("server_url".into(), "https://h:8001/#x".into()))
        );
        assert_eq!(parse_key_value("novalue"), None);
        assert_eq!(parse_key_value(" = x"), None);
    }

    #[test]
    /// What: Truthy spellings parse as `true`.
    fn parses_truthy_values() {
        for v in ["true", "1", "YES", " on "] {
            assert!(parse_bool(v), "{v}");
        }
        assert!(!parse_bool("off"));
    }
}
