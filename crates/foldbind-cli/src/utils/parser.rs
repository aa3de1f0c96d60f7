use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    MissingSeparator(String),

    #[error("Empty key in --set value '{0}'.")]
    EmptyKey(String),

    #[error("Invalid integer value for {key}: {value}")]
    InvalidInteger { key: String, value: String },

    #[error("Tool key '{key}' in '{name}' must be lower-case letters, digits, '-' or '_'.")]
    InvalidToolKey { key: String, name: String },
}

/// Splits `KEY=VALUE` at the first `=`.
pub fn parse_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(pair.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(pair.to_string()));
    }
    Ok((key, value))
}

/// A comma-separated list with blanks removed: `"colabfold, esmfold"`.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whitespace-separated command-line words: `"--num-models 1"`.
pub fn parse_words(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Seconds as a timeout; `0` disables the timeout.
pub fn parse_timeout_secs(key: &str, value: &str) -> Result<Option<Duration>, ParseError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidInteger {
            key: key.to_string(),
            value: value.to_string(),
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

pub fn validate_tool_key<'a>(key: &'a str, name: &str) -> Result<&'a str, ParseError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(key)
    } else {
        Err(ParseError::InvalidToolKey {
            key: key.to_string(),
            name: name.to_string(),
        })
    }
}
