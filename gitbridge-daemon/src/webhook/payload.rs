//! Wire payloads and their decoding into typed events.
//!
//! Only the fields the bridge acts on are modelled; serde ignores the rest.

use serde::Deserialize;

use gitbridge_core::{CheckSuiteAction, CommitSha, PipelineStatus, PrimaryEvent, SecondaryEvent};

use super::error::WebhookError;

pub const GITHUB_PUSH: &str = "push";
pub const GITHUB_CHECK_SUITE: &str = "check_suite";
pub const GITLAB_PIPELINE: &str = "Pipeline Hook";

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct CheckSuitePayload {
    action: String,
    check_suite: CheckSuite,
}

#[derive(Debug, Deserialize)]
struct CheckSuite {
    head_sha: String,
}

#[derive(Debug, Deserialize)]
struct PipelinePayload {
    object_attributes: PipelineAttributes,
}

#[derive(Debug, Deserialize)]
struct PipelineAttributes {
    sha: String,
    status: String,
}

/// Decode a GitHub delivery announced as `event` (the `X-GitHub-Event` value).
pub fn decode_github(event: &str, body: &[u8]) -> Result<PrimaryEvent, WebhookError> {
    match event {
        GITHUB_PUSH => {
            let payload: PushPayload = parse(body)?;
            Ok(PrimaryEvent::Push {
                git_ref: payload.git_ref,
            })
        }
        GITHUB_CHECK_SUITE => {
            let payload: CheckSuitePayload = parse(body)?;
            Ok(PrimaryEvent::CheckSuite {
                action: CheckSuiteAction::from(payload.action.as_str()),
                head_sha: commit(&payload.check_suite.head_sha)?,
            })
        }
        other => Ok(PrimaryEvent::Unsupported {
            kind: other.to_string(),
        }),
    }
}

/// Decode a GitLab delivery announced as `event` (the `X-Gitlab-Event` value).
pub fn decode_gitlab(event: &str, body: &[u8]) -> Result<SecondaryEvent, WebhookError> {
    match event {
        GITLAB_PIPELINE => {
            let payload: PipelinePayload = parse(body)?;
            Ok(SecondaryEvent::Pipeline {
                sha: commit(&payload.object_attributes.sha)?,
                status: PipelineStatus::from(payload.object_attributes.status.as_str()),
            })
        }
        other => Ok(SecondaryEvent::Unsupported {
            kind: other.to_string(),
        }),
    }
}

fn parse<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, WebhookError> {
    serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

fn commit(raw: &str) -> Result<CommitSha, WebhookError> {
    CommitSha::parse(raw).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}
