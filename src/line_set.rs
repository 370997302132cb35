//! Parsing of line-range attribute values like `"2,4-6,9"` into a set of
//! 1-based physical line numbers.

use fancy_regex::Regex;
use itertools::Itertools;
use std::fmt;
use std::sync::LazyLock;

// Tokens are an integer optionally followed by `-` and a second integer, and
// must sit directly after a separator (comma or whitespace). The input is
// prefixed with a comma so the first token is matched uniformly.
static LINE_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?<=[\s,])\d+(-\d+)?").unwrap());

/// The resolved set of physical line numbers to mark in one code block.
///
/// Duplicates are tolerated in the backing storage; membership is all that
/// matters to the splitter, which wraps each physical line at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    lines: Vec<usize>,
}

impl LineSet {
    /// Parse a raw attribute value into a line set.
    ///
    /// Accepts comma/whitespace-separated tokens of the form `N` or `N-M`.
    /// A range `N-M` contributes every line in `[N, M]` when `M >= N` and
    /// nothing at all when `M < N`. Tokens that do not match the extraction
    /// pattern are ignored; parsing never fails.
    pub fn parse(raw: &str) -> Self {
        let mut lines = Vec::new();
        let prefixed = format!(",{raw}");

        for token in LINE_TOKEN_REGEX.find_iter(&prefixed).filter_map(|m| m.ok()) {
            let token = token.as_str();
            match token.split_once('-') {
                Some((start, end)) => {
                    // Both halves are all-digit by construction; overflow on
                    // absurd input drops the token like any other malformed one.
                    let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) else {
                        continue;
                    };
                    if end >= start {
                        lines.extend(start..=end);
                    }
                }
                None => {
                    if let Ok(n) = token.parse::<usize>() {
                        lines.push(n);
                    }
                }
            }
        }

        Self { lines }
    }

    pub fn contains(&self, lineno: usize) -> bool {
        self.lines.contains(&lineno)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of stored entries, duplicates included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().copied()
    }
}

impl FromIterator<usize> for LineSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for LineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.iter().sorted_unstable().dedup().join(","))
    }
}
