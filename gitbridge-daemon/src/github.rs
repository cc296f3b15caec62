//! GitHub check-runs client.
//!
//! ## Authentication
//!
//! 1. Sign a short-lived App JWT (RS256, `iat` backdated 60s, `exp` +10min).
//! 2. Exchange it at `/app/installations/{id}/access_tokens`.
//! 3. Reuse the installation token until a minute before it expires.
//!
//! Every request carries the REST API version header and runs on a `ureq`
//! agent with connect/request timeouts, so a hung API surfaces as an ordinary
//! [`ChecksError::Transport`].

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use gitbridge_core::{
    AppCredentials, CheckRunId, ChecksApi, ChecksError, CreateCheckRun, RepoSlug, UpdateCheckRun,
};

use crate::error::DaemonError;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("gitbridge/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Refresh the installation token this long before GitHub expires it.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

enum Auth {
    App {
        app_id: u64,
        installation_id: u64,
        key: EncodingKey,
        cached: Mutex<Option<InstallationToken>>,
    },
    /// A token minted elsewhere (installation or fine-grained PAT).
    Static(String),
}

#[derive(Clone)]
struct InstallationToken {
    token: String,
    expires_at: u64,
}

pub struct GitHubChecksClient {
    agent: ureq::Agent,
    api_url: String,
    auth: Auth,
}

impl GitHubChecksClient {
    /// Authenticate as a GitHub App installation.
    pub fn from_app(api_url: &str, app: &AppCredentials) -> Result<Self, DaemonError> {
        let pem = std::fs::read(&app.private_key_path).map_err(|e| DaemonError::Credentials {
            path: app.private_key_path.clone(),
            message: e.to_string(),
        })?;
        let key = EncodingKey::from_rsa_pem(&pem).map_err(|e| DaemonError::Credentials {
            path: app.private_key_path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::with_auth(
            api_url,
            Auth::App {
                app_id: app.app_id,
                installation_id: app.installation_id,
                key,
                cached: Mutex::new(None),
            },
        ))
    }

    /// Use a pre-minted bearer token.
    pub fn with_token(api_url: &str, token: impl Into<String>) -> Self {
        Self::with_auth(api_url, Auth::Static(token.into()))
    }

    fn with_auth(api_url: &str, auth: Auth) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn bearer(&self) -> Result<String, ChecksError> {
        match &self.auth {
            Auth::Static(token) => Ok(token.clone()),
            Auth::App {
                app_id,
                installation_id,
                key,
                cached,
            } => {
                let now = unix_now()?;
                // Held across the exchange so concurrent callers mint once.
                let mut cached = cached.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(token) = cached.as_ref() {
                    if now + TOKEN_REFRESH_MARGIN_SECS < token.expires_at {
                        return Ok(token.token.clone());
                    }
                }
                let jwt = app_jwt(*app_id, key, now)?;
                let fresh = self.exchange(*installation_id, &jwt)?;
                tracing::debug!(installation_id, expires_at = fresh.expires_at, "minted installation token");
                let token = fresh.token.clone();
                *cached = Some(fresh);
                Ok(token)
            }
        }
    }

    fn exchange(&self, installation_id: u64, jwt: &str) -> Result<InstallationToken, ChecksError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            token: String,
            expires_at: String,
        }

        let endpoint = format!(
            "{}/app/installations/{installation_id}/access_tokens",
            self.api_url
        );
        let request = self.agent.post(&endpoint);
        let response = send(request, jwt, &endpoint, None::<&()>)?;
        let payload: TokenResponse = decode(response, &endpoint)?;

        let expires_at = DateTime::parse_from_rfc3339(&payload.expires_at)
            .map_err(|e| ChecksError::Decode {
                endpoint: endpoint.clone(),
                message: format!("expires_at '{}': {e}", payload.expires_at),
            })?
            .timestamp();
        Ok(InstallationToken {
            token: payload.token,
            expires_at: u64::try_from(expires_at).unwrap_or(0),
        })
    }

    fn check_runs_url(&self, repo: &RepoSlug) -> String {
        format!(
            "{}/repos/{}/{}/check-runs",
            self.api_url, repo.owner, repo.repository
        )
    }
}

impl ChecksApi for GitHubChecksClient {
    fn create_check_run(
        &self,
        repo: &RepoSlug,
        request: &CreateCheckRun,
    ) -> Result<CheckRunId, ChecksError> {
        #[derive(Deserialize)]
        struct Created {
            id: u64,
        }

        let endpoint = self.check_runs_url(repo);
        let token = self.bearer()?;
        let response = send(self.agent.post(&endpoint), &token, &endpoint, Some(request))?;
        let created: Created = decode(response, &endpoint)?;
        tracing::info!(repo = %repo, sha = %request.head_sha, check_run = created.id, "created check-run");
        Ok(CheckRunId(created.id))
    }

    fn update_check_run(
        &self,
        repo: &RepoSlug,
        check_run: CheckRunId,
        request: &UpdateCheckRun,
    ) -> Result<(), ChecksError> {
        let endpoint = format!("{}/{check_run}", self.check_runs_url(repo));
        let token = self.bearer()?;
        send(
            self.agent.request("PATCH", &endpoint),
            &token,
            &endpoint,
            Some(request),
        )?;
        tracing::info!(repo = %repo, %check_run, conclusion = %request.conclusion, "completed check-run");
        Ok(())
    }
}

fn send<T: Serialize>(
    request: ureq::Request,
    bearer: &str,
    endpoint: &str,
    body: Option<&T>,
) -> Result<ureq::Response, ChecksError> {
    let request = request
        .set("Accept", ACCEPT)
        .set("X-GitHub-Api-Version", API_VERSION)
        .set("Authorization", &format!("Bearer {bearer}"));
    let result = match body {
        Some(body) => request.send_json(body),
        None => request.call(),
    };
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => Err(ChecksError::Http {
            status,
            endpoint: endpoint.to_string(),
            message: response
                .into_string()
                .unwrap_or_else(|_| "unreadable response body".to_string()),
        }),
        Err(ureq::Error::Transport(transport)) => Err(ChecksError::Transport {
            endpoint: endpoint.to_string(),
            message: transport.to_string(),
        }),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    response: ureq::Response,
    endpoint: &str,
) -> Result<T, ChecksError> {
    response.into_json().map_err(|e| ChecksError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// RS256 App JWT valid for ten minutes, backdated for clock drift.
pub(crate) fn app_jwt(app_id: u64, key: &EncodingKey, now: u64) -> Result<String, ChecksError> {
    #[derive(Serialize)]
    struct Claims {
        iat: u64,
        exp: u64,
        iss: String,
    }

    let claims = Claims {
        iat: now.saturating_sub(60),
        exp: now + 600,
        iss: app_id.to_string(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
        .map_err(|e| ChecksError::Auth(format!("signing app JWT: {e}")))
}

fn unix_now() -> Result<u64, ChecksError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ChecksError::Auth(format!("system clock before epoch: {e}")))
}
