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

//! String resource endpoints
//!
//! - `POST   /strings`                              analyze and store
//! - `GET    /strings`                              list with structured filters
//! - `GET    /strings/filter-by-natural-language`   list with a free-text query
//! - `GET    /strings/:value`                       exact lookup
//! - `DELETE /strings/:value`                       remove

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stringlens_core::{AnalyzedString, CharacterFrequencyMap};
use stringlens_query::{AppliedFilters, FilterParams, FilterRequest, ParsedQuery};
use tracing::{debug, info};

use super::{ApiError, AppState};

/// Stored string as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordView {
    /// SHA-256 of the value
    pub id: String,
    pub value: String,
    pub properties: PropertiesView,
    /// RFC 3339, UTC
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertiesView {
    pub is_palindrome: bool,
    pub length: usize,
    pub word_count: usize,
    pub unique_characters: usize,
    pub sha256_hash: String,
    pub character_frequency_map: CharacterFrequencyMap,
}

impl From<AnalyzedString> for RecordView {
    fn from(record: AnalyzedString) -> Self {
        let AnalyzedString {
            content_hash,
            original_value,
            properties,
            created_at,
        } = record;

        Self {
            id: content_hash.clone(),
            value: original_value,
            properties: PropertiesView {
                is_palindrome: properties.is_palindrome,
                length: properties.length,
                word_count: properties.word_count,
                unique_characters: properties.unique_character_count,
                sha256_hash: content_hash,
                character_frequency_map: properties.character_frequency_map,
            },
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub data: Vec<RecordView>,
    pub count: usize,
    pub filters_applied: AppliedFilters,
}

#[derive(Debug, Serialize)]
pub struct NaturalLanguageResponse {
    pub data: Vec<RecordView>,
    pub count: usize,
    pub interpreted_query: ParsedQuery,
    pub filters_applied: AppliedFilters,
}

#[derive(Debug, Deserialize)]
pub struct NaturalLanguageParams {
    pub query: Option<String>,
}

fn records_to_views(records: Vec<AnalyzedString>) -> Vec<RecordView> {
    records.into_iter().map(RecordView::from).collect()
}

/// POST /strings
pub async fn create_string(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordView>), ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let value = match body.get("value") {
        Some(Value::String(value)) => value.clone(),
        None | Some(Value::Null) => {
            return Err(ApiError::BadRequest(
                "Invalid request body or missing \"value\" field".to_string(),
            ))
        }
        Some(_) => {
            return Err(ApiError::Unprocessable(
                "Invalid data type for \"value\" (must be string)".to_string(),
            ))
        }
    };

    let record = state.engine.create(&value)?;
    info!(id = %record.content_hash, "Created string");

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /strings/:value
pub async fn get_string(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<Json<RecordView>, ApiError> {
    let record = state.engine.get(&value)?;
    Ok(Json(record.into()))
}

/// GET /strings
pub async fn list_strings(
    State(state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<FilterResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let request = FilterRequest::from_params(&params)?;

    let result = state.engine.filter(&request)?;
    debug!(count = result.records.len(), "Listed strings");

    let data = records_to_views(result.records);
    Ok(Json(FilterResponse {
        count: data.len(),
        data,
        filters_applied: result.filters_applied,
    }))
}

/// GET /strings/filter-by-natural-language
pub async fn filter_by_natural_language(
    State(state): State<AppState>,
    params: Result<Query<NaturalLanguageParams>, QueryRejection>,
) -> Result<Json<NaturalLanguageResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing \"query\" parameter".to_string()))?;

    let result = state.engine.filter_natural_language(&query)?;
    debug!(count = result.records.len(), query = %query, "Interpreted natural language query");

    let data = records_to_views(result.records);
    Ok(Json(NaturalLanguageResponse {
        count: data.len(),
        data,
        interpreted_query: result.interpreted,
        filters_applied: result.filters_applied,
    }))
}

/// DELETE /strings/:value
pub async fn delete_string(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete(&value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the strings router
pub fn strings_router() -> Router<AppState> {
    Router::new()
        .route("/strings", get(list_strings).post(create_string))
        .route(
            "/strings/filter-by-natural-language",
            get(filter_by_natural_language),
        )
        .route("/strings/:value", get(get_string).delete(delete_string))
}
