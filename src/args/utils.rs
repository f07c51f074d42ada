//! Shared utilities for argument processing.

use std::io::{self, BufRead, Write};

use serde_json::{Map, Value};

use super::CliError;

/// What: Determine the log level from flags and settings.
///
/// Inputs:
/// - `verbose`: `-v` flag.
/// - `flag`: `--log-level` value, if given.
/// - `configured`: `log_level` from settings.conf.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `--log-level`, which overrides the settings file.
#[must_use]
pub fn determine_log_level(verbose: bool, flag: Option<&str>, configured: &str) -> String {
    if verbose {
        "debug".to_string()
    } else {
        flag.unwrap_or(configured).to_string()
    }
}

/// What: Parse package names from input, handling both comma-separated and space-separated formats.
///
/// Inputs:
/// - `packages`: Vector of package strings (may contain comma-separated values).
///
/// Output:
/// - Vector of individual package names.
///
/// Details:
/// - Splits each input string by commas and trims whitespace.
/// - Filters out empty strings.
#[must_use]
pub fn parse_package_names(packages: &[String]) -> Vec<String> {
    packages
        .iter()
        .flat_map(|pkg| pkg.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// What: Turn `key=value` arguments into a repository config map.
///
/// Inputs:
/// - `pairs`: Raw `--set` values.
///
/// Output:
/// - Config map with string values; `comps` is split on whitespace into a list.
///
/// # Errors
/// - `CliError::Usage` for an entry without `=` or with an empty key.
pub fn parse_setting_pairs(pairs: &[String]) -> Result<Map<String, Value>, CliError> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CliError::Usage(format!("expected KEY=VALUE, got '{pair}'")));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Usage(format!("empty key in '{pair}'")));
        }
        let value = value.trim();
        let value = if key == "comps" {
            Value::Array(value.split_whitespace().map(Value::from).collect())
        } else {
            Value::from(value)
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

/// What: Read a yes/no answer from `input`.
///
/// Inputs:
/// - `message`: Prompt text written to stdout.
/// - `input`: Line source (stdin in the binary).
///
/// Output:
/// - `true` only for an explicit `y`/`yes`; empty input and read errors mean no.
pub fn confirm_from(message: &str, input: &mut impl BufRead) -> bool {
    print!("{message} [y/N]: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    if input.read_line(&mut line).is_ok() {
        let trimmed = line.trim();
        trimmed.eq_ignore_ascii_case("y") || trimmed.eq_ignore_ascii_case("yes")
    } else {
        false
    }
}

/// What: Prompt on stdin unless `assume_yes` is set.
///
/// Inputs:
/// - `message`: Prompt text.
/// - `assume_yes`: `--yes` flag or `assume_yes` setting.
///
/// Output:
/// - Whether to proceed.
pub fn confirm(message: &str, assume_yes: bool) -> bool {
    if assume_yes {
        tracing::debug!(prompt = message, "confirmation skipped");
        return true;
    }
    confirm_from(message, &mut io::stdin().lock())
}
