//! Base-name shell glob matching for `file_pattern`.
//!
//! Supported syntax:
//! - `*`      → any run of characters
//! - `?`      → exactly one character
//! - `[abc]`, `[a-z]`, `[^a-z]`, `[!a-z]` → character classes
//! - `\x`     → literal `x`
//!
//! An unterminated class, an empty class, or a trailing backslash is a
//! malformed pattern.

use std::ffi::OsStr;

use regex::Regex;

use crate::core::errors::{FkError, Result};

/// Compiled file pattern. An empty pattern matches every name.
#[derive(Debug, Clone)]
pub struct FilePattern {
    compiled: Option<Regex>,
}

impl FilePattern {
    /// Compile a glob. Returns `InvalidPattern` for malformed input.
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self { compiled: None });
        }
        let regex_str = glob_to_regex(pattern).map_err(|details| invalid(pattern, &details))?;
        let compiled = Regex::new(&regex_str).map_err(|err| invalid(pattern, &err.to_string()))?;
        Ok(Self {
            compiled: Some(compiled),
        })
    }

    /// Whether `name` (a base name, not a path) matches.
    pub fn matches(&self, name: &OsStr) -> bool {
        self.compiled
            .as_ref()
            .is_none_or(|re| re.is_match(&name.to_string_lossy()))
    }
}

fn glob_to_regex(pattern: &str) -> std::result::Result<String, String> {
    let mut regex_str = String::with_capacity(pattern.len() * 2 + 6);
    regex_str.push_str("(?s)^");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex_str.push_str(".*"),
            '?' => regex_str.push('.'),
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "trailing backslash".to_string())?;
                regex_str.push_str(&regex::escape(&escaped.to_string()));
            }
            '[' => {
                regex_str.push('[');
                if matches!(chars.peek(), Some('^' | '!')) {
                    chars.next();
                    regex_str.push('^');
                }
                let mut items = 0usize;
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        ']' if items > 0 => {
                            closed = true;
                            break;
                        }
                        ']' => return Err("empty character class".to_string()),
                        '-' if items == 0 => {
                            return Err("character class starts with '-'".to_string());
                        }
                        '\\' => {
                            let escaped = chars
                                .next()
                                .ok_or_else(|| "trailing backslash".to_string())?;
                            push_class_char(&mut regex_str, escaped);
                            items += 1;
                        }
                        '-' => {
                            let hi = match chars.next() {
                                Some('\\') => chars
                                    .next()
                                    .ok_or_else(|| "trailing backslash".to_string())?,
                                Some(']') | None => {
                                    return Err("unterminated range".to_string());
                                }
                                Some(hi) => hi,
                            };
                            regex_str.push('-');
                            push_class_char(&mut regex_str, hi);
                        }
                        c => {
                            push_class_char(&mut regex_str, c);
                            items += 1;
                        }
                    }
                }
                if !closed {
                    return Err("unterminated character class".to_string());
                }
                regex_str.push(']');
            }
            c => regex_str.push_str(&regex::escape(&c.to_string())),
        }
    }

    regex_str.push('$');
    Ok(regex_str)
}

fn push_class_char(out: &mut String, c: char) {
    if c.is_ascii_punctuation() {
        out.push('\\');
    }
    out.push(c);
}

fn invalid(pattern: &str, details: &str) -> FkError {
    FkError::InvalidPattern {
        pattern: pattern.to_string(),
        details: details.to_string(),
    }
}
