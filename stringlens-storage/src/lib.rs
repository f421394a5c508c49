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

//! Stringlens Storage Layer
//!
//! Record store for analyzed strings.
//!
//! ## Architecture
//!
//! - **`RecordStore`**: the interface the engine is written against
//!   (insert, exact-value lookup, predicate query, delete)
//! - **`RecordPredicate`**: filter seam; the store evaluates predicates
//!   without knowing filter semantics
//! - **`StringStore`**: in-memory implementation with optional JSON snapshot
//!   durability
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stringlens_storage::{RecordStore, StringStore};
//!
//! let store = StringStore::open("./stringlens-data")?;
//! let record = stringlens_core::analyze("racecar")?.into_record(chrono::Utc::now());
//! store.insert(record)?;
//! let palindromes = store.query(&|r: &AnalyzedString| r.properties.is_palindrome)?;
//! ```

pub mod record_store;
pub mod string_store;

pub use record_store::{RecordPredicate, RecordStore, StoreError};
pub use string_store::{StringStore, SNAPSHOT_FILE};
