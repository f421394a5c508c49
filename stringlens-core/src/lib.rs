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

//! Stringlens Core
//!
//! Fundamental data structures for analyzed strings and the pure analysis
//! functions that derive them.

pub mod analyzer;
pub mod error;
pub mod frequency;
pub mod record;

pub use analyzer::{
    analyze, analyze_bytes, code_point_length, is_palindrome, unique_character_count,
    word_count, AnalysisError,
};
pub use error::{Result, StringLensError};
pub use frequency::CharacterFrequencyMap;
pub use record::{content_hash, AnalyzedString, StringAnalysis, StringProperties};
