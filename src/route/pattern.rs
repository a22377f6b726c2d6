//! Exclusion glob patterns.
//!
//! Patterns are matched against `/`-separated paths relative to the project
//! root and compiled once into anchored regexes.
//!
//! | Glob        | Matches                                      |
//! |-------------|----------------------------------------------|
//! | `*`         | any run of characters except `/`             |
//! | `**/`       | zero or more whole directories               |
//! | `**`        | anything, including `/`                      |
//! | `?`         | one character except `/`                     |
//! | `[abc]`     | character class (`[!abc]` negates)           |
//! | `{a,b}`     | alternation                                  |

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid exclude pattern `{pattern}`: {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: String,
}

impl PatternError {
    fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }
}

/// A compiled set of exclusion patterns.
#[derive(Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self, PatternError> {
        let patterns = globs
            .iter()
            .map(|g| compile(g.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches the `/`-separated relative path.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(rel_path))
    }
}

/// Compile one glob into an anchored regex.
pub fn compile(glob: &str) -> Result<Regex, PatternError> {
    if glob.trim().is_empty() {
        return Err(PatternError::new(glob, "pattern is empty"));
    }

    let mut re = String::with_capacity(glob.len() * 2 + 2);
    re.push('^');

    let mut chars = glob.chars().peekable();
    let mut brace_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    re.push_str("(?:.*/)?");
                } else {
                    re.push_str(".*");
                }
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '[' => {
                re.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    re.push('^');
                }
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' || c == '[' {
                        re.push('\\');
                    }
                    re.push(c);
                }
                if !closed {
                    return Err(PatternError::new(glob, "unterminated character class"));
                }
                re.push(']');
            }
            '{' => {
                brace_depth += 1;
                re.push_str("(?:");
            }
            ',' if brace_depth > 0 => re.push('|'),
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                re.push(')');
            }
            '}' => return Err(PatternError::new(glob, "unmatched `}`")),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    if brace_depth > 0 {
        return Err(PatternError::new(glob, "unterminated `{`"));
    }

    re.push('$');
    Regex::new(&re).map_err(|e| PatternError::new(glob, e.to_string()))
}
