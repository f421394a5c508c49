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

//! Natural Language Query Parser
//!
//! Interprets short free-text queries into a [`FilterRequest`] using a fixed,
//! ordered list of pattern detectors over the trimmed, lowercased query.
//! Every detector sets at most one field; later detectors overwrite earlier
//! ones ("exactly N characters" replaces "longer/shorter than" bounds).
//!
//! ## Example Queries
//!
//! - "all single word palindromic strings"
//! - "strings longer than 10 characters"
//! - "palindromes containing the letter a"
//! - "strings with more than one word that are not palindromes"
//!
//! ## Errors
//!
//! - Empty queries, or queries no detector recognizes, are
//!   [`QueryError::Unparseable`].
//! - A query asking for palindromes and non-palindromes at once is
//!   [`QueryError::Conflict`].

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::filter::{FilterRequest, FlagValue, WordCountFilter};
use crate::QueryError;

/// Interpreted query, echoed back to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    /// Query text as received
    pub original: String,
    /// Filters derived from the text
    pub parsed_filters: FilterRequest,
}

/// Detector identity, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorRule {
    Palindrome,
    NotPalindrome,
    LongerThan,
    ShorterThan,
    ExactLength,
    ContainsCharacter,
    SingleWord,
    TwoWords,
    ThreeWords,
    MultipleWords,
}

/// Detectors sharing a group are mutually exclusive: the first one in list
/// order that fires wins and the rest of the group is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorGroup {
    WordCount,
}

type ApplyFn = fn(&Regex, &str, &mut FilterRequest) -> Result<bool, QueryError>;

struct Detector {
    rule: DetectorRule,
    regex: Regex,
    group: Option<DetectorGroup>,
    apply: ApplyFn,
}

/// Palindrome mention, optionally negated ("not a palindrome", "non-palindromic").
const PALINDROME_MENTION: &str = r"\b(not\s+(?:an?\s+)?|non-?)?palindrom(?:e|ic)";

/// Natural language query parser
pub struct NaturalLanguageParser {
    detectors: Vec<Detector>,
}

impl NaturalLanguageParser {
    /// Create a new parser, compiling every detector pattern.
    pub fn new() -> Result<Self, regex::Error> {
        let detectors = vec![
            detector(DetectorRule::Palindrome, PALINDROME_MENTION, None, detect_palindrome)?,
            detector(DetectorRule::NotPalindrome, PALINDROME_MENTION, None, detect_not_palindrome)?,
            detector(
                DetectorRule::LongerThan,
                r"\b(?:longer|greater)\s+than\s+(\d+)",
                None,
                |re, query, filters| {
                    let Some(n) = captured_number(re, query)? else {
                        return Ok(false);
                    };
                    filters.min_length = Some(n.checked_add(1).ok_or_else(|| number_too_large(n))?);
                    Ok(true)
                },
            )?,
            detector(
                DetectorRule::ShorterThan,
                r"\b(?:shorter|less)\s+than\s+(\d+)",
                None,
                |re, query, filters| {
                    let Some(n) = captured_number(re, query)? else {
                        return Ok(false);
                    };
                    filters.max_length = Some(n - 1);
                    Ok(true)
                },
            )?,
            detector(
                DetectorRule::ExactLength,
                r"\bexactly\s+(\d+)\s+(?:characters?|letters?|chars?)\b",
                None,
                |re, query, filters| {
                    let Some(n) = captured_number(re, query)? else {
                        return Ok(false);
                    };
                    filters.min_length = Some(n);
                    filters.max_length = Some(n);
                    Ok(true)
                },
            )?,
            detector(
                DetectorRule::ContainsCharacter,
                r"\bcontain(?:s|ing)?\b(?:\s+the)?(?:\s+(?:letter|character|char))?\s+([a-z])\b",
                None,
                |re, query, filters| {
                    let letter = re
                        .captures(query)
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| m.as_str().chars().next());
                    match letter {
                        Some(c) => {
                            filters.contains_character = Some(c);
                            Ok(true)
                        }
                        None => Ok(false),
                    }
                },
            )?,
            detector(
                DetectorRule::SingleWord,
                r"\bsingle\s+word",
                Some(DetectorGroup::WordCount),
                |re, query, filters| Ok(set_word_count(re, query, filters, WordCountFilter::Exactly(1))),
            )?,
            detector(
                DetectorRule::TwoWords,
                r"\btwo\s+words",
                Some(DetectorGroup::WordCount),
                |re, query, filters| Ok(set_word_count(re, query, filters, WordCountFilter::Exactly(2))),
            )?,
            detector(
                DetectorRule::ThreeWords,
                r"\bthree\s+words",
                Some(DetectorGroup::WordCount),
                |re, query, filters| Ok(set_word_count(re, query, filters, WordCountFilter::Exactly(3))),
            )?,
            detector(
                DetectorRule::MultipleWords,
                r"\bmultiple\s+words|\bmore\s+than\s+one\s+word",
                Some(DetectorGroup::WordCount),
                |re, query, filters| Ok(set_word_count(re, query, filters, WordCountFilter::MoreThanOne)),
            )?,
        ];

        Ok(Self { detectors })
    }

    /// Detector rules in evaluation order.
    pub fn rules(&self) -> Vec<DetectorRule> {
        self.detectors.iter().map(|d| d.rule).collect()
    }

    /// Parse a natural language query
    pub fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(QueryError::Unparseable("empty query".to_string()));
        }

        let mut filters = FilterRequest::default();
        let mut settled_groups: Vec<DetectorGroup> = Vec::new();

        for detector in &self.detectors {
            if let Some(group) = detector.group {
                if settled_groups.contains(&group) {
                    continue;
                }
            }

            if (detector.apply)(&detector.regex, &normalized, &mut filters)? {
                debug!(rule = ?detector.rule, "natural language detector matched");
                if let Some(group) = detector.group {
                    settled_groups.push(group);
                }
            }
        }

        if filters.is_empty() {
            return Err(QueryError::Unparseable(
                "no recognizable filter in query".to_string(),
            ));
        }

        Ok(ParsedQuery {
            original: query.to_string(),
            parsed_filters: filters,
        })
    }
}

fn detector(
    rule: DetectorRule,
    pattern: &str,
    group: Option<DetectorGroup>,
    apply: ApplyFn,
) -> Result<Detector, regex::Error> {
    Ok(Detector {
        rule,
        regex: Regex::new(pattern)?,
        group,
        apply,
    })
}

fn detect_palindrome(re: &Regex, query: &str, filters: &mut FilterRequest) -> Result<bool, QueryError> {
    let affirmed = re
        .captures_iter(query)
        .any(|caps| caps.get(1).is_none());
    if affirmed {
        filters.is_palindrome = Some(FlagValue::Bool(true));
    }
    Ok(affirmed)
}

fn detect_not_palindrome(
    re: &Regex,
    query: &str,
    filters: &mut FilterRequest,
) -> Result<bool, QueryError> {
    let negated = re
        .captures_iter(query)
        .any(|caps| caps.get(1).is_some());
    if !negated {
        return Ok(false);
    }

    if filters.is_palindrome == Some(FlagValue::Bool(true)) {
        return Err(QueryError::Conflict(
            "query asks for both palindromes and non-palindromes".to_string(),
        ));
    }

    filters.is_palindrome = Some(FlagValue::Bool(false));
    Ok(true)
}

fn set_word_count(re: &Regex, query: &str, filters: &mut FilterRequest, value: WordCountFilter) -> bool {
    if re.is_match(query) {
        filters.word_count = Some(value);
        true
    } else {
        false
    }
}

fn captured_number(re: &Regex, query: &str) -> Result<Option<i64>, QueryError> {
    let Some(digits) = re.captures(query).and_then(|caps| caps.get(1)) else {
        return Ok(None);
    };
    digits
        .as_str()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| number_too_large(digits.as_str()))
}

fn number_too_large(n: impl std::fmt::Display) -> QueryError {
    QueryError::Unparseable(format!("number {} is too large", n))
}
