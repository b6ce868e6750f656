//! Account routes
//!
//! - `GET /api/me`: provisions the account on first call, then returns the summary
//! - `POST /api/onboarding/complete`, `PATCH /api/settings/update`: link (or
//!   re-link) the caller's Reddit username

use bytes::Bytes;
use hyper::{HeaderMap, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::auth::authenticate;
use crate::routes::{error_response, json_response, parse_json_body, BoxBody};
use crate::server::AppState;
use crate::services::{ensure_account, link_reddit_account, me};
use crate::types::{KarmaError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkRequest {
    #[serde(default)]
    reddit_username: Option<String>,
}

/// GET /api/me
pub async fn handle_me(state: &AppState, headers: &HeaderMap) -> Response<BoxBody> {
    match me_inner(state, headers).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn me_inner(state: &AppState, headers: &HeaderMap) -> Result<Response<BoxBody>> {
    let user = authenticate(headers, &state.jwt)?;
    ensure_account(
        state.store.as_ref(),
        &user.user_id,
        user.email,
        user.name,
        state.ledger.starting_points,
    )
    .await?;

    let view = me(state.store.as_ref(), &user.user_id).await?;
    Ok(json_response(StatusCode::OK, &view))
}

/// POST /api/onboarding/complete and PATCH /api/settings/update
pub async fn handle_link_reddit(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response<BoxBody> {
    match link_inner(state, headers, body).await {
        Ok(response) => response,
        Err(e) => error_response(e),
    }
}

async fn link_inner(state: &AppState, headers: &HeaderMap, body: &Bytes) -> Result<Response<BoxBody>> {
    let user = authenticate(headers, &state.jwt)?;
    let request: LinkRequest = parse_json_body(body)?;
    let username = request
        .reddit_username
        .ok_or_else(|| KarmaError::Validation("Reddit username is required".into()))?;

    let identity = link_reddit_account(
        state.store.as_ref(),
        state.reddit.as_ref(),
        &user.user_id,
        &username,
    )
    .await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({ "success": true, "username": identity.username }),
    ))
}
