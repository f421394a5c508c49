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

//! Filter Builder
//!
//! Translates a structured filter request into a [`StringPredicate`] the
//! store can evaluate, together with [`AppliedFilters`]: the normalized subset
//! of the request that actually constrained the query, echoed back to
//! clients.
//!
//! ## Normalization
//!
//! - `is_palindrome` accepts booleans, 0/1 and the tokens
//!   `1/true/yes/y` and `0/false/no/n` (case-insensitive, trimmed). Anything
//!   else is treated as absent, never as an error.
//! - `min_length > max_length` is silently swapped.
//! - `word_count` is either an exact count or "more than one word".

use serde::{Deserialize, Serialize, Serializer};
use stringlens_core::AnalyzedString;
use stringlens_storage::RecordPredicate;
use tracing::debug;

use crate::QueryError;

/// Palindrome flag as received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FlagValue {
    /// Three-way reading of the flag: true, false, or absent.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Int(1) => Some(true),
            FlagValue::Int(0) => Some(false),
            FlagValue::Int(_) => None,
            FlagValue::Text(text) => match text.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" => Some(true),
                "0" | "false" | "no" | "n" => Some(false),
                _ => None,
            },
        }
    }
}

/// Word count constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCountFilter {
    /// Exactly `n` words
    Exactly(i64),
    /// Two or more words
    MoreThanOne,
}

impl WordCountFilter {
    pub fn matches(&self, word_count: usize) -> bool {
        match self {
            WordCountFilter::Exactly(n) => i64::try_from(word_count).map_or(false, |wc| wc == *n),
            WordCountFilter::MoreThanOne => word_count > 1,
        }
    }
}

impl Serialize for WordCountFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WordCountFilter::Exactly(n) => serializer.serialize_i64(*n),
            WordCountFilter::MoreThanOne => serializer.serialize_str(">1"),
        }
    }
}

/// Raw filter parameters as they arrive on a query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub is_palindrome: Option<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub word_count: Option<String>,
    pub contains_character: Option<String>,
}

/// Structured filter request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<FlagValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<WordCountFilter>,
}

impl FilterRequest {
    /// Validate and type raw parameters.
    pub fn from_params(params: &FilterParams) -> Result<Self, QueryError> {
        Ok(Self {
            is_palindrome: params.is_palindrome.clone().map(FlagValue::Text),
            min_length: parse_integer("min_length", params.min_length.as_deref())?,
            max_length: parse_integer("max_length", params.max_length.as_deref())?,
            contains_character: parse_character(params.contains_character.as_deref())?,
            word_count: parse_integer("word_count", params.word_count.as_deref())?
                .map(WordCountFilter::Exactly),
        })
    }

    /// True when no field is set at all.
    pub fn is_empty(&self) -> bool {
        self.is_palindrome.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.contains_character.is_none()
            && self.word_count.is_none()
    }
}

fn parse_integer(field: &str, raw: Option<&str>) -> Result<Option<i64>, QueryError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| QueryError::Validation(format!("{} must be an integer", field)))
    })
    .transpose()
}

fn parse_character(raw: Option<&str>) -> Result<Option<char>, QueryError> {
    let Some(value) = raw else {
        return Ok(None);
    };

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Some(c)),
        _ => Err(QueryError::Validation(
            "contains_character must be a single character".to_string(),
        )),
    }
}

/// Predicate over stored records; every set field must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringPredicate {
    pub is_palindrome: Option<bool>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub word_count: Option<WordCountFilter>,
    pub contains_character: Option<char>,
}

impl StringPredicate {
    /// True when the predicate matches every record.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

impl RecordPredicate for StringPredicate {
    fn matches(&self, record: &AnalyzedString) -> bool {
        let props = &record.properties;
        let length = i64::try_from(props.length).unwrap_or(i64::MAX);

        if let Some(expected) = self.is_palindrome {
            if props.is_palindrome != expected {
                return false;
            }
        }

        if let Some(min) = self.min_length {
            if length < min {
                return false;
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return false;
            }
        }

        if let Some(ref wc) = self.word_count {
            if !wc.matches(props.word_count) {
                return false;
            }
        }

        if let Some(c) = self.contains_character {
            if !props.character_frequency_map.contains(c) {
                return false;
            }
        }

        true
    }
}

/// Filters that were applied, with normalized values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<WordCountFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,
}

/// Translate `request` into a predicate and the applied-filter record.
pub fn build(request: &FilterRequest) -> (StringPredicate, AppliedFilters) {
    let is_palindrome = request.is_palindrome.as_ref().and_then(FlagValue::as_bool);

    let (min_length, max_length) = match (request.min_length, request.max_length) {
        (Some(min), Some(max)) if min > max => (Some(max), Some(min)),
        bounds => bounds,
    };

    let predicate = StringPredicate {
        is_palindrome,
        min_length,
        max_length,
        word_count: request.word_count,
        contains_character: request.contains_character,
    };

    let applied = AppliedFilters {
        is_palindrome,
        min_length,
        max_length,
        word_count: request.word_count,
        contains_character: request.contains_character,
    };

    debug!(?applied, "built string predicate");
    (predicate, applied)
}
