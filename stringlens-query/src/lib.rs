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

//! Stringlens Query Engine
//!
//! Filter translation, natural-language interpretation and the high-level
//! engine tying analysis and storage together.

pub mod engine;
pub mod filter;
pub mod nl_query_parser;

pub use engine::{FilterResult, NaturalLanguageResult, StringEngine};
pub use filter::{
    build, AppliedFilters, FilterParams, FilterRequest, FlagValue, StringPredicate,
    WordCountFilter,
};
pub use nl_query_parser::{DetectorRule, NaturalLanguageParser, ParsedQuery};

use stringlens_core::StringLensError;

/// Errors from filter validation and query interpretation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Malformed filter parameter
    #[error("{0}")]
    Validation(String),

    /// Contradicting natural-language filters
    #[error("{0}")]
    Conflict(String),

    /// Nothing recognizable in a natural-language query
    #[error("{0}")]
    Unparseable(String),
}

impl From<QueryError> for StringLensError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(msg) => StringLensError::Validation(msg),
            QueryError::Conflict(msg) => StringLensError::Conflict(msg),
            QueryError::Unparseable(msg) => StringLensError::Unparseable(msg),
        }
    }
}
