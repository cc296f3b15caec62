//! Webhook intake for both hosts.
//!
//! A delivery is authenticated, decoded into a typed event, acknowledged with
//! `202 Accepted`, and handed to a blocking worker. Only authentication can
//! refuse a delivery: an authentic one that cannot be decoded is logged and
//! acknowledged without dispatch, and what a handler does never changes the
//! response.

pub mod error;
pub mod payload;
pub mod signature;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

pub use error::WebhookError;
pub use payload::{decode_github, decode_gitlab};
pub use signature::{sign, verify_github_signature, verify_gitlab_token};

use crate::runtime::AppState;

pub const GITHUB_EVENT_HEADER: &str = "x-github-event";
pub const GITHUB_SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const GITLAB_EVENT_HEADER: &str = "x-gitlab-event";
pub const GITLAB_TOKEN_HEADER: &str = "x-gitlab-token";

/// `POST /githubhooks`
pub async fn github_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    verify_github_signature(
        state.bridge.secret(),
        header(&headers, GITHUB_SIGNATURE_HEADER),
        &body,
    )
    .inspect_err(|err| tracing::warn!(source = "github", error = %err, "delivery rejected"))?;

    let decoded = header(&headers, GITHUB_EVENT_HEADER)
        .ok_or(WebhookError::MissingEventHeader("X-GitHub-Event"))
        .and_then(|kind| decode_github(kind, &body));
    let event = match decoded {
        Ok(event) => event,
        Err(err) => return Ok(ignore_undecodable("github", &err)),
    };

    let bridge = Arc::clone(&state.bridge);
    tokio::task::spawn_blocking(move || {
        let _ = bridge.handle_primary(event);
    });
    Ok(StatusCode::ACCEPTED)
}

/// `POST /gitlabhooks`
pub async fn gitlab_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    verify_gitlab_token(state.bridge.secret(), header(&headers, GITLAB_TOKEN_HEADER))
        .inspect_err(|err| tracing::warn!(source = "gitlab", error = %err, "delivery rejected"))?;

    let decoded = header(&headers, GITLAB_EVENT_HEADER)
        .ok_or(WebhookError::MissingEventHeader("X-Gitlab-Event"))
        .and_then(|kind| decode_gitlab(kind, &body));
    let event = match decoded {
        Ok(event) => event,
        Err(err) => return Ok(ignore_undecodable("gitlab", &err)),
    };

    let bridge = Arc::clone(&state.bridge);
    tokio::task::spawn_blocking(move || {
        let _ = bridge.handle_secondary(event);
    });
    Ok(StatusCode::ACCEPTED)
}

fn ignore_undecodable(source: &str, err: &WebhookError) -> StatusCode {
    tracing::warn!(source, error = %err, "undecodable delivery ignored");
    StatusCode::ACCEPTED
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
