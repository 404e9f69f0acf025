// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::MutexGuard;

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use revise_core::error::ErrorKind;
use revise_core::error::ErrorReport;
use revise_core::error::Fallible;
use revise_core::lifecycle::apply_sweep;
use revise_core::queue::QueueEntry;
use revise_core::queue::build_queue_from_store;
use revise_core::review::record_review;
use revise_core::store::ItemStore;
use revise_core::store::not_found;
use revise_core::types::item::ReviewableItem;
use revise_core::types::item_id::ItemId;
use revise_core::types::timestamp::Timestamp;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::cmd::review::parse_rating;
use crate::cmd::serve::server::ServerState;
use crate::db::Database;

/// An error on its way out as a JSON response.
pub struct ApiError(ErrorReport);

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Precondition => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0.message());
        }
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn lock(state: &ServerState) -> Fallible<MutexGuard<'_, Database>> {
    state
        .db
        .lock()
        .map_err(|_| ErrorReport::new("database lock poisoned"))
}

pub async fn list_items_handler(
    State(state): State<ServerState>,
) -> ApiResult<Vec<ReviewableItem>> {
    let db = lock(&state)?;
    let items = db.list_all()?.into_iter().map(|v| v.item).collect();
    Ok(Json(items))
}

/// Look up an item by its id or an unambiguous prefix of it.
pub async fn get_item_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<ReviewableItem> {
    let db = lock(&state)?;
    let id: ItemId = db.resolve_id(&id)?;
    let stored = db.get(&id)?.ok_or_else(|| not_found(&id))?;
    Ok(Json(stored.item))
}

#[derive(Deserialize)]
pub struct QueueParams {
    limit: Option<usize>,
}

pub async fn queue_handler(
    State(state): State<ServerState>,
    Query(params): Query<QueueParams>,
) -> ApiResult<Vec<QueueEntry>> {
    let db = lock(&state)?;
    let queue = build_queue_from_store(&*db, Timestamp::now(), &state.config, params.limit)?;
    Ok(Json(queue))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    rating: String,
    #[serde(default)]
    time_spent_seconds: u32,
}

pub async fn review_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<ReviewableItem> {
    let rating = parse_rating(&request.rating)?;
    let db = lock(&state)?;
    let id: ItemId = db.resolve_id(&id)?;
    let item = record_review(
        &*db,
        &id,
        rating,
        Timestamp::now(),
        request.time_spent_seconds,
        &state.config,
    )?;
    log::debug!("Reviewed {id} as {rating}");
    Ok(Json(item))
}

#[derive(Serialize)]
pub struct SkippedItem {
    id: ItemId,
    error: String,
}

#[derive(Serialize)]
pub struct SweepResponse {
    archived: Vec<ItemId>,
    deleted: Vec<ItemId>,
    skipped: Vec<SkippedItem>,
}

pub async fn sweep_handler(State(state): State<ServerState>) -> ApiResult<SweepResponse> {
    let db = lock(&state)?;
    let report = apply_sweep(&*db, Timestamp::now())?;
    Ok(Json(SweepResponse {
        archived: report.archived,
        deleted: report.deleted,
        skipped: report
            .skipped
            .into_iter()
            .map(|(id, e)| SkippedItem {
                id,
                error: e.message().to_string(),
            })
            .collect(),
    }))
}

pub async fn not_found_handler() -> ApiError {
    ApiError(ErrorReport::not_found("no such route"))
}
