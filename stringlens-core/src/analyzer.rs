// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! String Analyzer
//!
//! Pure functions deriving lexical properties from a string. No I/O and no
//! shared state; the only impure input of a record, its creation time, is
//! supplied later through [`StringAnalysis::into_record`].
//!
//! ## Units
//!
//! - Length and uniqueness count Unicode scalar values (`char`), never bytes
//!   or grapheme clusters.
//! - Palindromes are checked on the lowercased string with every run of
//!   non letter/number code points (`[^\p{L}\p{N}]+`) removed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

use crate::error::StringLensError;
use crate::frequency::CharacterFrequencyMap;
use crate::record::{content_hash, StringAnalysis, StringProperties};

static NON_ALPHANUMERIC: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+"));

/// Errors from string analysis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Input bytes are not UTF-8
    #[error("Input is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// Palindrome normalization failed
    #[error("Failed to normalize string for palindrome check: {0}")]
    Normalization(String),

    /// Derived properties disagree with each other
    #[error("Analysis invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<AnalysisError> for StringLensError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidEncoding(_) => StringLensError::Validation(err.to_string()),
            _ => StringLensError::Internal(err.to_string()),
        }
    }
}

/// Analyze raw bytes, rejecting anything that is not UTF-8.
pub fn analyze_bytes(bytes: &[u8]) -> Result<StringAnalysis, AnalysisError> {
    let value =
        std::str::from_utf8(bytes).map_err(|e| AnalysisError::InvalidEncoding(e.to_string()))?;
    analyze(value)
}

/// Derive every property of `value`.
pub fn analyze(value: &str) -> Result<StringAnalysis, AnalysisError> {
    let character_frequency_map = CharacterFrequencyMap::from_text(value);
    let properties = StringProperties {
        is_palindrome: is_palindrome(value)?,
        length: code_point_length(value),
        word_count: word_count(value),
        unique_character_count: unique_character_count(value),
        character_frequency_map,
    };

    check_invariants(&properties)?;

    tracing::trace!(
        length = properties.length,
        words = properties.word_count,
        palindrome = properties.is_palindrome,
        "analyzed string"
    );

    Ok(StringAnalysis {
        original_value: value.to_string(),
        content_hash: content_hash(value),
        properties,
    })
}

/// Lowercase, strip non letters/digits, compare against the reverse.
///
/// The empty normalized string is a palindrome.
pub fn is_palindrome(value: &str) -> Result<bool, AnalysisError> {
    let pattern = NON_ALPHANUMERIC
        .as_ref()
        .map_err(|e| AnalysisError::Normalization(e.to_string()))?;

    let lowered = value.to_lowercase();
    let normalized = pattern.replace_all(&lowered, "");

    Ok(normalized.chars().eq(normalized.chars().rev()))
}

/// Unicode scalar values in `value`.
pub fn code_point_length(value: &str) -> usize {
    value.chars().count()
}

/// Whitespace-delimited tokens of the trimmed string.
///
/// Runs of whitespace collapse into one delimiter. An empty or all-whitespace
/// string yields a single empty token and therefore counts as one word.
pub fn word_count(value: &str) -> usize {
    value.split_whitespace().count().max(1)
}

/// Distinct code points in `value`.
pub fn unique_character_count(value: &str) -> usize {
    value.chars().collect::<HashSet<_>>().len()
}

fn check_invariants(properties: &StringProperties) -> Result<(), AnalysisError> {
    let map = &properties.character_frequency_map;

    if map.total() != properties.length {
        return Err(AnalysisError::InvariantViolation(format!(
            "frequency total {} != length {}",
            map.total(),
            properties.length
        )));
    }
    if map.len() != properties.unique_character_count {
        return Err(AnalysisError::InvariantViolation(format!(
            "frequency keys {} != unique characters {}",
            map.len(),
            properties.unique_character_count
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_racecar() {
        let analysis = analyze("racecar").unwrap();
        let props = &analysis.properties;
        assert!(props.is_palindrome);
        assert_eq!(props.length, 7);
        assert_eq!(props.word_count, 1);
        assert_eq!(props.unique_character_count, 4);
        assert_eq!(props.character_frequency_map.count('r'), 2);
        assert_eq!(props.character_frequency_map.count('e'), 1);
    }

    #[test]
    fn test_palindrome_ignores_case_and_punctuation() {
        assert!(is_palindrome("A man a plan a canal Panama").unwrap());
        assert!(is_palindrome("Was it a car or a cat I saw?").unwrap());
        assert!(!is_palindrome("hello").unwrap());
    }

    #[test]
    fn test_empty_is_palindrome() {
        assert!(is_palindrome("").unwrap());
        assert!(is_palindrome("?!  ...").unwrap());
    }

    #[test]
    fn test_palindrome_reverses_code_points() {
        assert!(is_palindrome("été").unwrap());
        assert!(is_palindrome("Ésé").unwrap());
        assert!(is_palindrome("日本日").unwrap());
        assert!(!is_palindrome("日本").unwrap());
    }

    #[test]
    fn test_length_counts_code_points() {
        assert_eq!(code_point_length("héllo"), 5);
        assert_eq!(code_point_length("🦀🦀"), 2);
        // e + combining acute accent is two code points
        assert_eq!(code_point_length("e\u{301}"), 2);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count("  hello \t\n  world  "), 2);
        assert_eq!(word_count("one"), 1);
    }

    #[test]
    fn test_word_count_empty_is_one() {
        assert_eq!(word_count(""), 1);
        assert_eq!(word_count("   "), 1);
        assert_eq!(analyze("   ").unwrap().properties.word_count, 1);
    }

    #[test]
    fn test_word_count_unicode_whitespace() {
        assert_eq!(word_count("\u{a0}hello"), 1);
        assert_eq!(word_count("hello\u{2003}world\u{a0}"), 2);
    }

    #[test]
    fn test_unique_characters() {
        assert_eq!(unique_character_count("hello"), 4);
        assert_eq!(unique_character_count(""), 0);
        assert_eq!(unique_character_count("aA"), 2);
    }

    #[test]
    fn test_analyze_bytes_rejects_invalid_utf8() {
        let err = analyze_bytes(&[0x66, 0x6f, 0xff]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidEncoding(_)));
        assert!(matches!(
            StringLensError::from(err),
            StringLensError::Validation(_)
        ));
    }

    #[test]
    fn test_analyze_bytes_accepts_utf8() {
        let analysis = analyze_bytes("noon".as_bytes()).unwrap();
        assert!(analysis.properties.is_palindrome);
        assert_eq!(analysis.content_hash, content_hash("noon"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_length_is_code_point_count(s in any::<String>()) {
                let analysis = analyze(&s).unwrap();
                prop_assert_eq!(analysis.properties.length, s.chars().count());
            }

            #[test]
            fn prop_frequency_map_matches_counts(s in any::<String>()) {
                let props = analyze(&s).unwrap().properties;
                prop_assert_eq!(props.character_frequency_map.total(), props.length);
                prop_assert_eq!(props.character_frequency_map.len(), props.unique_character_count);
            }

            #[test]
            fn prop_analysis_is_idempotent(s in any::<String>()) {
                prop_assert_eq!(analyze(&s).unwrap(), analyze(&s).unwrap());
            }

            #[test]
            fn prop_mirrored_strings_are_palindromes(s in "[a-zA-Z0-9 ,.]{0,40}") {
                let mirrored: String = s.chars().chain(s.chars().rev()).collect();
                prop_assert!(is_palindrome(&mirrored).unwrap());
            }
        }
    }
}
