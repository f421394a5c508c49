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

use stringlens_core::{AnalyzedString, StringLensError};

/// Record store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for StringLensError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(hash) => StringLensError::Duplicate(hash),
            StoreError::NotFound(hash) => StringLensError::NotFound(hash),
            other => StringLensError::Internal(other.to_string()),
        }
    }
}

/// Filter evaluated by a store against each record.
pub trait RecordPredicate {
    fn matches(&self, record: &AnalyzedString) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&AnalyzedString) -> bool,
{
    fn matches(&self, record: &AnalyzedString) -> bool {
        self(record)
    }
}

/// Persistence interface for analyzed strings.
///
/// `original_value` is unique store-wide. Implementations must make the
/// uniqueness check and the insert atomic, so that racing inserts of one value
/// produce exactly one success and [`StoreError::Duplicate`] for the rest.
pub trait RecordStore: Send + Sync {
    /// Insert a new record, returning the stored copy.
    fn insert(&self, record: AnalyzedString) -> Result<AnalyzedString, StoreError>;

    /// Exact-match lookup by original value.
    fn find_by_value(&self, value: &str) -> Result<AnalyzedString, StoreError>;

    /// Records matching `predicate`, in creation order.
    fn query(&self, predicate: &dyn RecordPredicate) -> Result<Vec<AnalyzedString>, StoreError>;

    /// Remove the record for `value`, returning it.
    fn delete_by_value(&self, value: &str) -> Result<AnalyzedString, StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
