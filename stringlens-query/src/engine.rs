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

//! Query engine for Stringlens
//!
//! Provides the high-level API combining analysis, filtering and storage.

use std::sync::Arc;

use chrono::Utc;
use stringlens_core::{analyze, AnalyzedString, Result, StringLensError};
use stringlens_storage::RecordStore;
use tracing::{debug, info};

use crate::filter::{build, AppliedFilters, FilterRequest};
use crate::nl_query_parser::{NaturalLanguageParser, ParsedQuery};

/// Records matched by a structured filter
#[derive(Debug, Clone)]
pub struct FilterResult {
    pub records: Vec<AnalyzedString>,
    pub filters_applied: AppliedFilters,
}

/// Records matched by a natural-language query
#[derive(Debug, Clone)]
pub struct NaturalLanguageResult {
    pub records: Vec<AnalyzedString>,
    pub interpreted: ParsedQuery,
    pub filters_applied: AppliedFilters,
}

/// Main Stringlens interface
///
/// **Thread Safety:**
/// - Safe to share across threads via Arc
/// - Duplicate detection is delegated to the store, which makes the
///   check-and-insert atomic
pub struct StringEngine {
    store: Arc<dyn RecordStore>,
    parser: NaturalLanguageParser,
}

impl StringEngine {
    /// Create an engine on top of `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Result<Self> {
        let parser = NaturalLanguageParser::new()
            .map_err(|e| StringLensError::Internal(format!("query patterns: {}", e)))?;
        Ok(Self { store, parser })
    }

    /// Analyze and store a new string
    pub fn create(&self, value: &str) -> Result<AnalyzedString> {
        let record = analyze(value)?.into_record(Utc::now());
        let stored = self.store.insert(record)?;
        info!(hash = %stored.content_hash, length = stored.properties.length, "stored string");
        Ok(stored)
    }

    /// Look up a string by its exact value
    pub fn get(&self, value: &str) -> Result<AnalyzedString> {
        Ok(self.store.find_by_value(value)?)
    }

    /// Records matching a structured filter request, in creation order
    pub fn filter(&self, request: &FilterRequest) -> Result<FilterResult> {
        let (predicate, filters_applied) = build(request);
        let records = self.store.query(&predicate)?;
        debug!(matched = records.len(), "structured filter evaluated");
        Ok(FilterResult {
            records,
            filters_applied,
        })
    }

    /// Interpret `query` and return the records it selects
    pub fn filter_natural_language(&self, query: &str) -> Result<NaturalLanguageResult> {
        let interpreted = self.parser.parse(query)?;
        let FilterResult {
            records,
            filters_applied,
        } = self.filter(&interpreted.parsed_filters)?;

        Ok(NaturalLanguageResult {
            records,
            interpreted,
            filters_applied,
        })
    }

    /// Remove a string by its exact value
    pub fn delete(&self, value: &str) -> Result<()> {
        let removed = self.store.delete_by_value(value)?;
        info!(hash = %removed.content_hash, "deleted string");
        Ok(())
    }

    /// Number of stored strings
    pub fn count(&self) -> usize {
        self.store.len()
    }
}
