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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::frequency::CharacterFrequencyMap;

/// SHA-256 of the raw UTF-8 bytes, lowercase hex.
///
/// Doubles as the external identifier of a stored string, so changing the
/// algorithm invalidates every issued id.
pub fn content_hash(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Lexical properties derived from a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringProperties {
    /// Palindrome over the letter/digit-normalized, lowercased form
    pub is_palindrome: bool,
    /// Unicode code points in the original string
    pub length: usize,
    /// Whitespace-delimited tokens; an empty string counts as one
    pub word_count: usize,
    /// Distinct code points
    pub unique_character_count: usize,
    /// Occurrences per code point, in first-occurrence order
    pub character_frequency_map: CharacterFrequencyMap,
}

/// Output of the analyzer, not yet stamped with a creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringAnalysis {
    pub original_value: String,
    pub content_hash: String,
    pub properties: StringProperties,
}

impl StringAnalysis {
    /// Stamp the analysis as a record created at `created_at`.
    pub fn into_record(self, created_at: DateTime<Utc>) -> AnalyzedString {
        AnalyzedString {
            content_hash: self.content_hash,
            original_value: self.original_value,
            properties: self.properties,
            created_at,
        }
    }
}

/// A stored, analyzed string. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedString {
    pub content_hash: String,
    pub original_value: String,
    pub properties: StringProperties,
    pub created_at: DateTime<Utc>,
}

impl AnalyzedString {
    /// True when `content_hash` matches a fresh hash of `original_value`.
    pub fn hash_is_consistent(&self) -> bool {
        self.content_hash == content_hash(&self.original_value)
    }
}
