//! Submission routes
//!
//! - `POST  /api/submissions/create`  `{ url, type, context? }`
//! - `POST  /api/submissions/verify`  `{ submissionId }`
//! - `PATCH /api/submissions/modify`  `{ id, status? }`
//! - `GET   /api/submissions/mine`
//! - `GET   /api/submissions/feed`

use bytes::Bytes;
use hyper::{HeaderMap, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::auth::authenticate;
use crate::db::schemas::SubmissionStatus;
use crate::routes::{error_response, json_response, parse_json_body, BoxBody};
use crate::server::AppState;
use crate::services::{
    create_submission, feed, my_submissions, set_status, verify, NewSubmission, SubmissionView,
};
use crate::types::{KarmaError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    #[serde(default)]
    submission_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModifyRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// POST /api/submissions/create
pub async fn handle_create_submission(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response<BoxBody> {
    match create_submission_inner(state, headers, body).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn create_submission_inner(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response<BoxBody>> {
    let user = authenticate(headers, &state.jwt)?;
    let request: NewSubmission = parse_json_body(body)?;

    let (submission, points) = create_submission(
        state.store.as_ref(),
        state.reddit.as_ref(),
        &state.ledger,
        &user.user_id,
        request,
    )
    .await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({ "submission": SubmissionView::from(submission), "points": points }),
    ))
}

/// POST /api/submissions/verify
pub async fn handle_verify_submission(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response<BoxBody> {
    match verify_submission_inner(state, headers, body).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn verify_submission_inner(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response<BoxBody>> {
    let request: VerifyRequest = parse_json_body(body)?;
    let submission_id = request
        .submission_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| KarmaError::Validation("submissionId is required".into()))?;
    let user = authenticate(headers, &state.jwt)?;

    let outcome = verify(
        state.store.as_ref(),
        state.reddit.as_ref(),
        &state.ledger,
        &user.user_id,
        &submission_id,
    )
    .await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "success": true,
            "points": outcome.new_balance,
            "pointsEarned": outcome.points_earned,
            "interaction": outcome.interaction,
            "detected": outcome.detected,
        }),
    ))
}

/// PATCH /api/submissions/modify
pub async fn handle_modify_submission(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response<BoxBody> {
    match modify_submission_inner(state, headers, body).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn modify_submission_inner(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response<BoxBody>> {
    let request: ModifyRequest = parse_json_body(body)?;
    let invalid = || KarmaError::Validation("Invalid request body".into());

    let id = request
        .id
        .filter(|id| uuid::Uuid::parse_str(id).is_ok())
        .ok_or_else(invalid)?;
    let status = request
        .status
        .map(|s| SubmissionStatus::parse(&s).ok_or_else(invalid))
        .transpose()?;

    let user = authenticate(headers, &state.jwt)?;
    let submission = set_status(state.store.as_ref(), &user.user_id, &id, status).await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({ "submission": SubmissionView::from(submission) }),
    ))
}

/// GET /api/submissions/mine
pub async fn handle_my_submissions(state: &AppState, headers: &HeaderMap) -> Response<BoxBody> {
    match my_submissions_inner(state, headers).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn my_submissions_inner(state: &AppState, headers: &HeaderMap) -> Result<Response<BoxBody>> {
    let user = authenticate(headers, &state.jwt)?;
    let submissions = my_submissions(state.store.as_ref(), &user.user_id).await?;
    Ok(json_response(StatusCode::OK, &json!({ "submissions": submissions })))
}

/// GET /api/submissions/feed
pub async fn handle_feed(state: &AppState, headers: &HeaderMap) -> Response<BoxBody> {
    match feed_inner(state, headers).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn feed_inner(state: &AppState, headers: &HeaderMap) -> Result<Response<BoxBody>> {
    let user = authenticate(headers, &state.jwt)?;
    let submissions = feed(state.store.as_ref(), &user.user_id).await?;
    Ok(json_response(StatusCode::OK, &json!({ "submissions": submissions })))
}
