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

use thiserror::Error;

/// Errors surfaced to callers of the Stringlens core.
///
/// Lower layers keep their own error types and convert into this one at the
/// crate boundary. The HTTP layer maps each variant to a status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StringLensError {
    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// Value already stored
    #[error("String already exists in the system")]
    Duplicate(String),

    /// No record for the requested value
    #[error("String does not exist in the system")]
    NotFound(String),

    /// Natural-language query produced contradicting filters
    #[error("Query parsed but resulted in conflicting filters: {0}")]
    Conflict(String),

    /// Natural-language query matched no known pattern
    #[error("Unable to parse natural language query: {0}")]
    Unparseable(String),

    /// Unexpected failure in analysis, storage or encoding
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StringLensError {
    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StringLensError::Validation(_) => "validation",
            StringLensError::Duplicate(_) => "duplicate",
            StringLensError::NotFound(_) => "not_found",
            StringLensError::Conflict(_) => "conflict",
            StringLensError::Unparseable(_) => "unparseable",
            StringLensError::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, StringLensError>;
