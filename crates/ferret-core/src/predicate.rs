//! Name predicates for ferret searches.
//!
//! A predicate is compiled once per run and then applied to every file name
//! streamed out of a volume, so construction may be relatively expensive but
//! matching must be cheap. Three kinds are supported:
//!
//! - Glob patterns (`*` and `?`), compiled to an anchored regex
//! - Raw regular expressions, used verbatim
//! - Fuzzy matching with a bounded Levenshtein distance
//!
//! All matching is case-insensitive. Predicates are immutable after
//! construction and safe to share across volume workers.

use crate::error::{FerretError, Result};
use regex::Regex;

/// A compiled name predicate, selected once per run.
#[derive(Debug, Clone)]
pub enum NamePredicate {
    /// Glob pattern compiled to an anchored regex
    Glob(Regex),

    /// User-supplied regex, unanchored
    Regex(Regex),

    /// Bounded edit-distance match against a query
    Fuzzy {
        /// Lowercased query as UTF-16 code units
        query: Vec<u16>,
        /// Maximum accepted Levenshtein distance
        max_distance: u8,
    },
}

impl NamePredicate {
    /// Compile a glob pattern (`*` matches any run of characters, `?` exactly
    /// one) into an anchored, case-insensitive regex.
    pub fn glob(pattern: &str) -> Result<Self> {
        let mut regex_pattern = String::with_capacity(pattern.len() * 2 + 6);
        regex_pattern.push_str("(?i)^");

        for c in pattern.chars() {
            match c {
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                // Escape regex special characters
                '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                    regex_pattern.push('\\');
                    regex_pattern.push(c);
                }
                _ => regex_pattern.push(c),
            }
        }

        regex_pattern.push('$');

        let regex = Regex::new(&regex_pattern)
            .map_err(|e| FerretError::invalid_pattern(pattern, e.to_string()))?;
        Ok(NamePredicate::Glob(regex))
    }

    /// Compile a user-supplied regex. The pattern is used verbatim apart from
    /// a case-insensitivity flag; callers wanting anchors provide their own.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("(?i){}", pattern))
            .map_err(|e| FerretError::invalid_pattern(pattern, e.to_string()))?;
        Ok(NamePredicate::Regex(regex))
    }

    /// Build a fuzzy predicate accepting names within `max_distance` edits of
    /// `query`.
    pub fn fuzzy(query: &str, max_distance: u8) -> Self {
        NamePredicate::Fuzzy {
            query: query.to_lowercase().encode_utf16().collect(),
            max_distance,
        }
    }

    /// Apply the predicate to a file name.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePredicate::Glob(regex) | NamePredicate::Regex(regex) => regex.is_match(name),
            NamePredicate::Fuzzy {
                query,
                max_distance,
            } => {
                let name: Vec<u16> = name.to_lowercase().encode_utf16().collect();
                levenshtein(&name, query) <= *max_distance as usize
            }
        }
    }
}

/// Levenshtein distance between two UTF-16 strings.
///
/// Two-row iterative formulation: `v0` holds the previous row of the edit
/// matrix and `v1` the row under construction. Distances are over 16-bit
/// code units, so a surrogate pair counts as two units.
pub fn levenshtein(a: &[u16], b: &[u16]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut v0: Vec<usize> = (0..=b.len()).collect();
    let mut v1: Vec<usize> = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        v1[0] = i + 1;

        for (j, &cb) in b.iter().enumerate() {
            let deletion = v0[j + 1] + 1;
            let insertion = v1[j] + 1;
            let substitution = v0[j] + usize::from(ca != cb);
            v1[j + 1] = deletion.min(insertion).min(substitution);
        }

        std::mem::swap(&mut v0, &mut v1);
    }

    v0[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn dist(a: &str, b: &str) -> usize {
        levenshtein(&utf16(a), &utf16(b))
    }

    #[test]
    fn test_glob_star() {
        let p = NamePredicate::glob("report_*.log").unwrap();

        assert!(p.matches("report_42.log"));
        assert!(p.matches("report_.log")); // '*' matches the empty run
        assert!(p.matches("REPORT_42.LOG")); // Case insensitive
        assert!(!p.matches("report_42.txt"));
        assert!(!p.matches("report_42.log.bak"));
    }

    #[test]
    fn test_glob_question_mark() {
        let p = NamePredicate::glob("test?.txt").unwrap();

        assert!(p.matches("test1.txt"));
        assert!(p.matches("testA.txt"));
        assert!(!p.matches("test.txt"));
        assert!(!p.matches("test12.txt"));
    }

    #[test]
    fn test_glob_is_anchored() {
        let p = NamePredicate::glob("main.rs").unwrap();

        assert!(p.matches("main.rs"));
        assert!(!p.matches("domain.rs"));
        assert!(!p.matches("main.rs.orig"));
    }

    #[test]
    fn test_glob_escapes_metacharacters() {
        // The dot must match literally, not any character
        let p = NamePredicate::glob("a.b").unwrap();
        assert!(p.matches("a.b"));
        assert!(!p.matches("aXb"));

        let p = NamePredicate::glob("notes(1)[2]").unwrap();
        assert!(p.matches("notes(1)[2]"));
    }

    #[test]
    fn test_glob_literal_equivalence() {
        // A glob without metacharacters behaves like an exact match
        let p = NamePredicate::glob("Cargo.toml").unwrap();
        assert!(p.matches("cargo.toml"));
        assert!(!p.matches("Cargo.tom"));
    }

    #[test]
    fn test_regex_verbatim() {
        let p = NamePredicate::regex(r"^img_\d+\.(png|jpg)$").unwrap();

        assert!(p.matches("img_01.png"));
        assert!(p.matches("IMG_7.JPG")); // Case insensitive
        assert!(!p.matches("imgX.png"));
    }

    #[test]
    fn test_regex_unanchored_by_default() {
        let p = NamePredicate::regex(r"\d{4}").unwrap();

        assert!(p.matches("backup-2024-final.zip"));
        assert!(!p.matches("backup-24.zip"));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(NamePredicate::regex("[unclosed").is_err());
    }

    #[test]
    fn test_fuzzy_threshold() {
        // "config_prod" is 5 edits away from "config"
        let p = NamePredicate::fuzzy("config", 5);
        assert!(p.matches("config_prod"));

        let p = NamePredicate::fuzzy("config", 4);
        assert!(!p.matches("config_prod"));
    }

    #[test]
    fn test_fuzzy_exact_at_zero() {
        let p = NamePredicate::fuzzy("readme", 0);
        assert!(p.matches("README"));
        assert!(!p.matches("readm"));
    }

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(dist("kitten", "sitting"), 3);
        assert_eq!(dist("flaw", "lawn"), 2);
        assert_eq!(dist("config_prod", "config"), 5);
        assert_eq!(dist("", "abc"), 3);
        assert_eq!(dist("abc", ""), 3);
    }

    #[test]
    fn test_levenshtein_identity() {
        for s in ["", "a", "readme.md", "Ünïcödé"] {
            assert_eq!(dist(s, s), 0);
        }
    }

    #[test]
    fn test_levenshtein_symmetry() {
        let samples = ["", "a", "ab", "kitten", "sitting", "config"];
        for a in samples {
            for b in samples {
                assert_eq!(dist(a, b), dist(b, a));
            }
        }
    }

    #[test]
    fn test_levenshtein_triangle_inequality() {
        let samples = ["", "cat", "cart", "dart", "kitten", "sitting"];
        for a in samples {
            for b in samples {
                for c in samples {
                    assert!(dist(a, c) <= dist(a, b) + dist(b, c));
                }
            }
        }
    }

    #[test]
    fn test_levenshtein_length_bound() {
        let samples = ["", "x", "abcdef", "abcdefghij"];
        for a in samples {
            for b in samples {
                assert!(dist(a, b) <= a.len().max(b.len()));
            }
        }
    }

    #[test]
    fn test_levenshtein_counts_code_units() {
        // U+1F600 is a surrogate pair: two code units away from the empty string
        assert_eq!(dist("\u{1F600}", ""), 2);
    }
}
