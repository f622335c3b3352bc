//! Maps a hostname to the set of provider instances willing to manage it.
//!
//! A matcher carries an ordered list of include patterns and a list of
//! exclude patterns, plus a mode (glob or regex). Evaluation: if any exclude
//! pattern matches, the hostname is rejected; otherwise it matches iff any
//! include pattern matches.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    Glob,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum MatcherError {
    #[error("invalid regex pattern `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },
}

#[derive(Clone)]
enum Pattern {
    Glob { regex: Regex, raw: String },
    Regex { regex: Regex, raw: String },
}

impl Pattern {
    fn raw(&self) -> &str {
        match self {
            Pattern::Glob { raw, .. } => raw,
            Pattern::Regex { raw, .. } => raw,
        }
    }

    fn is_match(&self, hostname: &str) -> bool {
        match self {
            Pattern::Glob { regex, .. } => regex.is_match(hostname),
            Pattern::Regex { regex, .. } => regex.is_match(hostname),
        }
    }
}

/// Compiled include/exclude pattern set for one provider instance.
#[derive(Clone)]
pub struct DomainMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl DomainMatcher {
    /// Compile a new matcher. Invalid regex patterns (only relevant in
    /// `MatchMode::Regex`) fail construction, per `spec.md` §4.B.
    pub fn new(
        include: &[String],
        exclude: &[String],
        mode: MatchMode,
    ) -> Result<Self, MatcherError> {
        let compile = |raw: &str| -> Result<Pattern, MatcherError> {
            match mode {
                MatchMode::Glob => {
                    let regex = Regex::new(&glob_to_regex(raw)).map_err(|e| {
                        MatcherError::InvalidRegex {
                            pattern: raw.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    Ok(Pattern::Glob {
                        regex,
                        raw: raw.to_string(),
                    })
                }
                MatchMode::Regex => {
                    let regex = Regex::new(raw).map_err(|e| MatcherError::InvalidRegex {
                        pattern: raw.to_string(),
                        reason: e.to_string(),
                    })?;
                    Ok(Pattern::Regex {
                        regex,
                        raw: raw.to_string(),
                    })
                }
            }
        };

        Ok(DomainMatcher {
            include: include
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
            exclude: exclude
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
        })
    }

    /// An "accept everything" matcher, for provider instances with no
    /// configured domain restriction.
    pub fn accept_all() -> Self {
        DomainMatcher {
            include: vec![Pattern::Regex {
                regex: Regex::new(".*").unwrap(),
                raw: "*".to_string(),
            }],
            exclude: vec![],
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        if self.exclude.iter().any(|p| p.is_match(hostname)) {
            return false;
        }
        self.include.iter().any(|p| p.is_match(hostname))
    }

    #[cfg(test)]
    fn include_patterns(&self) -> Vec<&str> {
        self.include.iter().map(|p| p.raw()).collect()
    }
}

/// Translate a shell-style glob (`*` matches any label characters, not
/// crossing a `.`; `?` matches a single character) into an anchored regex.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => out.push_str("[^.]*"),
            '?' => out.push_str("[^.]"),
            '.' => out.push_str("\\."),
            '\\' | '+' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('$');
    out
}

/// Registry of provider instances, preserving registration order so results
/// are deterministic across runs with the same configuration.
pub struct MatcherRegistry<T> {
    entries: Vec<(DomainMatcher, T)>,
}

impl<T> MatcherRegistry<T> {
    pub fn new() -> Self {
        MatcherRegistry { entries: vec![] }
    }

    pub fn register(&mut self, matcher: DomainMatcher, value: T) {
        self.entries.push((matcher, value));
    }

    /// Provider instances matching `hostname`, in registration order.
    pub fn matching(&self, hostname: &str) -> Vec<&T> {
        self.entries
            .iter()
            .filter(|(m, _)| m.matches(hostname))
            .map(|(_, v)| v)
            .collect()
    }
}

impl<T> Default for MatcherRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
