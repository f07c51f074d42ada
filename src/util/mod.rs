//! Utility functions for URL encoding, timestamps and text layout.

pub mod config;

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

/// What: Percent-encode a string for use in URLs according to RFC 3986.
///
/// Inputs:
/// - `input`: String to encode.
///
/// Output:
/// - Returns a percent-encoded string where reserved characters are escaped.
///
/// Details:
/// - Unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `.`, `_`, `~`) are left as-is.
/// - Space is encoded as `%20` (not `+`).
/// - Operates on raw bytes; any non-ASCII bytes are hex-escaped.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => {
                out.push('%');
                let _ = write!(out, "{b:02X}");
            }
        }
    }
    out
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// What: Pad `text` with spaces to `width` terminal columns.
///
/// Inputs:
/// - `text`: Cell content.
/// - `width`: Target display width.
///
/// Output:
/// - `text` followed by enough spaces; unchanged when already wider.
///
/// Details:
/// - Measures display width, so wide characters count as two columns.
#[must_use]
pub fn pad_to_width(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + (width - w));
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width - w));
    out
}

/// Display width of `text` in terminal columns.
#[must_use]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// One padded table line; missing cells render empty.
fn table_line<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    let joined = widths
        .iter()
        .map(|w| pad_to_width(cells.next().unwrap_or(""), *w))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", joined.trim_end())
}

/// What: Lay out rows as a plain-text table.
///
/// Inputs:
/// - `headers`: Column titles.
/// - `rows`: Cells per row; short rows are padded with empty cells.
///
/// Output:
/// - Header line, a dash rule, then one line per row, each ending in `\n`.
///
/// Details:
/// - Columns are separated by two spaces; trailing padding is trimmed.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }
    let mut out = table_line(&widths, headers.iter().copied());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&table_line(&widths, rule.iter().map(String::as_str)));
    for row in rows {
        out.push_str(&table_line(&widths, row.iter().map(String::as_str)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Percent-encoding leaves unreserved characters and escapes the rest.
    fn percent_encode_escapes_reserved() {
        assert_eq!(percent_encode("glibc-2.38_x~"), "glibc-2.38_x~");
        assert_eq!(percent_encode("a b/c"), "a%20b%2Fc");
        assert_eq!(percent_encode("libstdc++"), "libstdc%2B%2B");
    }

    #[test]
    /// What: Padding accounts for wide characters.
    ///
    /// Inputs:
    /// - ASCII text, CJK text, text longer than the width.
    ///
    /// Output:
    /// - Display width equals the target or the original width.
    fn pad_to_width_counts_display_columns() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(display_width(&pad_to_width("日本", 6)), 6);
        assert_eq!(pad_to_width("abcdef", 3), "abcdef");
    }

    #[test]
    /// What: Timestamp has the expected shape.
    fn now_stamp_has_date_and_time() {
        let s = now_stamp();
        assert_eq!(s.len(), 19);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
    }

    #[test]
    /// What: Tables align columns by display width.
    ///
    /// Inputs:
    /// - Two columns, one row with a short second cell missing.
    ///
    /// Output:
    /// - Padded header, rule and rows without trailing spaces.
    fn render_table_aligns_columns() {
        let out = render_table(
            &["Package", "Version"],
            &[vec!["vim".into(), "9.1".into()], vec!["bash-completion".into()]],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Package          Version");
        assert_eq!(lines[1], "---------------  -------");
        assert_eq!(lines[2], "vim              9.1");
        assert_eq!(lines[3], "bash-completion");
    }
}
