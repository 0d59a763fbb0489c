//! Poll endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use pollbox_common::{AppResult, MAX_PAGE_SIZE};
use pollbox_core::{
    CreatePollInput, Poll, PollOption, PollResults, PollSummary, UpdatePollInput, VoteInput,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    response::{self, ApiResponse},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_polls).post(create_poll))
        .route(
            "/{id}",
            get(get_poll).put(update_poll).delete(delete_poll),
        )
        .route("/{id}/vote", post(vote))
        .route("/{id}/results", get(results))
}

/// List polls query.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListPollsQuery {
    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// Poll list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollListResponse {
    pub polls: Vec<PollSummary>,
}

/// List polls, newest first.
async fn list_polls(
    State(state): State<AppState>,
    Query(query): Query<ListPollsQuery>,
) -> AppResult<ApiResponse<PollListResponse>> {
    query.validate()?;

    let limit = query.limit.unwrap_or(state.default_page_size);
    let polls = state
        .poll_service
        .list_polls(limit as usize, query.offset as usize)
        .await?;

    Ok(ApiResponse::ok(PollListResponse { polls }))
}

/// Create poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub is_active: Option<bool>,
}

/// Created poll response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollResponse {
    pub id: String,
    pub poll: Poll,
}

/// Create a poll.
async fn create_poll(
    State(state): State<AppState>,
    Json(req): Json<CreatePollRequest>,
) -> AppResult<ApiResponse<CreatePollResponse>> {
    let poll = state
        .poll_service
        .create_poll(CreatePollInput {
            title: req.title,
            description: req.description,
            options: req.options,
            is_active: req.is_active,
        })
        .await?;

    Ok(ApiResponse::created(CreatePollResponse {
        id: poll.id.clone(),
        poll,
    }))
}

/// Get a poll.
async fn get_poll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Poll>> {
    let poll = state.poll_service.get_poll(&id).await?;
    Ok(ApiResponse::ok(poll))
}

/// Option entry of an update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptionRequest {
    /// Empty or absent for a new option.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Accepted for wire compatibility; stored counts are authoritative.
    #[serde(default)]
    pub votes: u64,
}

/// Update poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<UpdateOptionRequest>,
    /// Omitted keeps the poll open or closed as stored.
    pub is_active: Option<bool>,
}

/// Update a poll.
async fn update_poll(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePollRequest>,
) -> AppResult<ApiResponse<Poll>> {
    let options = req
        .options
        .into_iter()
        .map(|o| PollOption {
            id: o.id,
            text: o.text,
            votes: o.votes,
        })
        .collect();

    let poll = state
        .poll_service
        .update_poll(UpdatePollInput {
            id,
            title: req.title,
            description: req.description,
            options,
            is_active: req.is_active,
        })
        .await?;

    Ok(ApiResponse::ok(poll))
}

/// Delete a poll.
async fn delete_poll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.poll_service.delete_poll(&id).await?;
    Ok(response::ok())
}

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub option_id: String,
}

/// Vote on a poll.
async fn vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<Poll>> {
    let poll = state
        .poll_service
        .vote(VoteInput {
            poll_id: id,
            option_id: req.option_id,
        })
        .await?;

    Ok(ApiResponse::ok(poll))
}

/// Get a poll's results.
async fn results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PollResults>> {
    let results = state.poll_service.results(&id).await?;
    Ok(ApiResponse::ok(results))
}
