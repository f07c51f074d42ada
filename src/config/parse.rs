use super::Settings;
use crate::util::config::{parse_bool, parse_key_value, skip_comment_or_empty};

/// What: Parse settings.conf content into `settings`.
///
/// Inputs:
/// - `content`: File content.
/// - `settings`: Settings to update in place.
///
/// Output:
/// - Keys that were not recognised, for a warning.
///
/// Details:
/// - Values that fail to parse leave the previous value untouched.
/// - Several spellings are accepted per key.
pub fn parse_settings(content: &str, settings: &mut Settings) -> Vec<String> {
    let mut unknown = Vec::new();
    for line in content.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((key, val)) = parse_key_value(line) else {
            continue;
        };
        match key.as_str() {
            "server_url" | "server" | "url" => {
                if !val.is_empty() {
                    settings.server_url = val;
                }
            }
            "step_delay_ms" | "step_delay" => {
                if let Ok(v) = val.parse::<u64>() {
                    settings.step_delay_ms = v;
                }
            }
            "task_poll_interval_ms" | "poll_interval_ms" => {
                if let Ok(v) = val.parse::<u64>() {
                    settings.task_poll_interval_ms = v;
                }
            }
            "request_timeout_secs" | "timeout_secs" => {
                if let Ok(v) = val.parse::<u64>()
                    && v > 0
                {
                    settings.request_timeout_secs = v;
                }
            }
            "log_level" => {
                if !val.is_empty() {
                    settings.log_level = val.to_ascii_lowercase();
                }
            }
            "assume_yes" | "yes" => settings.assume_yes = parse_bool(&val),
            _ => unknown.push(key),
        }
    }
    unknown
}
