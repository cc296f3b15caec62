//! Bridge configuration.
//!
//! # Sources
//!
//! Lowest precedence first:
//! 1. built-in defaults
//! 2. YAML config file (`--config <path>`)
//! 3. command-line overrides
//!
//! The file and the overrides share one shape, [`Settings`], whose keys match
//! the flag names (`local-path`, `app-id`, ...). Unknown keys in the file are
//! rejected at load time.
//!
//! # Example
//!
//! ```yaml
//! port: 3000
//! secret: s3cr3t
//! github: git@github.com:acme/widgets.git
//! gitlab: git@gitlab.example.com:mirrors/widgets.git
//! local-path: /var/lib/gitbridge/widgets
//! app-id: 44467
//! installation-id: 3771539
//! privkey: /etc/gitbridge/app.pem
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checks::DEFAULT_CHECK_NAME;
use crate::error::ConfigError;
use crate::types::RepoSlug;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOCAL_PATH: &str = "/tmp/gitbridge/repo";
pub const DEFAULT_MIRROR_REMOTE: &str = "mirror";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

// ---------------------------------------------------------------------------
// 1. Raw settings
// ---------------------------------------------------------------------------

/// Unresolved settings from one source. Every field is optional.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub port: Option<u16>,
    pub secret: Option<String>,
    /// Primary repository URL.
    pub github: Option<String>,
    /// Secondary (mirror) repository URL.
    pub gitlab: Option<String>,
    pub local_path: Option<PathBuf>,
    pub privkey: Option<PathBuf>,
    pub app_id: Option<u64>,
    pub installation_id: Option<u64>,
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub check_name: Option<String>,
    pub mirror_remote: Option<String>,
    pub mirror_all_branches: Option<bool>,
    pub api_url: Option<String>,
}

impl Settings {
    /// Overlay `over` on top of `self`; values present in `over` win.
    pub fn merge(self, over: Settings) -> Settings {
        Settings {
            port: over.port.or(self.port),
            secret: over.secret.or(self.secret),
            github: over.github.or(self.github),
            gitlab: over.gitlab.or(self.gitlab),
            local_path: over.local_path.or(self.local_path),
            privkey: over.privkey.or(self.privkey),
            app_id: over.app_id.or(self.app_id),
            installation_id: over.installation_id.or(self.installation_id),
            owner: over.owner.or(self.owner),
            repository: over.repository.or(self.repository),
            check_name: over.check_name.or(self.check_name),
            mirror_remote: over.mirror_remote.or(self.mirror_remote),
            mirror_all_branches: over.mirror_all_branches.or(self.mirror_all_branches),
            api_url: over.api_url.or(self.api_url),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("port", &self.port)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("github", &self.github)
            .field("gitlab", &self.gitlab)
            .field("local_path", &self.local_path)
            .field("privkey", &self.privkey)
            .field("app_id", &self.app_id)
            .field("installation_id", &self.installation_id)
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("check_name", &self.check_name)
            .field("mirror_remote", &self.mirror_remote)
            .field("mirror_all_branches", &self.mirror_all_branches)
            .field("api_url", &self.api_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// 2. Resolved configuration
// ---------------------------------------------------------------------------

/// GitHub App identity used to authenticate check-run calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: u64,
    pub installation_id: u64,
    pub private_key_path: PathBuf,
}

/// Fully resolved configuration for one repository pair.
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub port: u16,
    pub secret: String,
    pub primary_url: String,
    pub secondary_url: String,
    pub local_path: PathBuf,
    pub repo: RepoSlug,
    pub check_name: String,
    pub mirror_remote: String,
    pub mirror_all_branches: bool,
    pub api_url: String,
    /// `None` runs the bridge mirror-only.
    pub app: Option<AppCredentials>,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("port", &self.port)
            .field("secret", &"<redacted>")
            .field("primary_url", &self.primary_url)
            .field("secondary_url", &self.secondary_url)
            .field("local_path", &self.local_path)
            .field("repo", &self.repo)
            .field("check_name", &self.check_name)
            .field("mirror_remote", &self.mirror_remote)
            .field("mirror_all_branches", &self.mirror_all_branches)
            .field("api_url", &self.api_url)
            .field("app", &self.app)
            .finish()
    }
}

impl BridgeConfig {
    /// Apply defaults and validate.
    pub fn resolve(settings: Settings) -> Result<Self, ConfigError> {
        let secret = required(settings.secret, "secret")?;
        let primary_url = required(settings.github, "github")?;
        let secondary_url = required(settings.gitlab, "gitlab")?;

        let repo = resolve_slug(&primary_url, settings.owner, settings.repository)?;
        let app = resolve_app(settings.app_id, settings.installation_id, settings.privkey)?;

        let mirror_remote = settings
            .mirror_remote
            .unwrap_or_else(|| DEFAULT_MIRROR_REMOTE.to_string());
        if mirror_remote == "origin" || mirror_remote.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "mirror-remote",
                reason: format!("'{mirror_remote}' cannot name the mirror remote"),
            });
        }

        Ok(Self {
            port: settings.port.unwrap_or(DEFAULT_PORT),
            secret,
            primary_url,
            secondary_url,
            local_path: settings
                .local_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_PATH)),
            repo,
            check_name: settings
                .check_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHECK_NAME.to_string()),
            mirror_remote,
            mirror_all_branches: settings.mirror_all_branches.unwrap_or(false),
            api_url: settings
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            app,
        })
    }

    /// `true` when check-runs can be created and updated.
    pub fn checks_enabled(&self) -> bool {
        self.app.is_some()
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing { key }),
    }
}

fn resolve_slug(
    primary_url: &str,
    owner: Option<String>,
    repository: Option<String>,
) -> Result<RepoSlug, ConfigError> {
    if let (Some(owner), Some(repository)) = (&owner, &repository) {
        return Ok(RepoSlug::new(owner.clone(), repository.clone()));
    }
    let derived = RepoSlug::from_remote_url(primary_url).ok_or_else(|| ConfigError::Invalid {
        key: "github",
        reason: format!(
            "cannot derive owner/repository from '{primary_url}'; set 'owner' and 'repository'"
        ),
    })?;
    Ok(RepoSlug::new(
        owner.unwrap_or(derived.owner),
        repository.unwrap_or(derived.repository),
    ))
}

fn resolve_app(
    app_id: Option<u64>,
    installation_id: Option<u64>,
    privkey: Option<PathBuf>,
) -> Result<Option<AppCredentials>, ConfigError> {
    match (app_id, installation_id, privkey) {
        (None, None, None) => Ok(None),
        (Some(app_id), Some(installation_id), Some(private_key_path)) => Ok(Some(AppCredentials {
            app_id,
            installation_id,
            private_key_path,
        })),
        _ => Err(ConfigError::Invalid {
            key: "app-id",
            reason: "app-id, installation-id and privkey must be set together".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load raw settings from a YAML file.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed or if it
/// contains a key gitbridge does not know.
pub fn load_settings_at(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the optional file, overlay `overrides`, and resolve.
pub fn load(file: Option<&Path>, overrides: Settings) -> Result<BridgeConfig, ConfigError> {
    let base = match file {
        Some(path) => load_settings_at(path)?,
        None => Settings::default(),
    };
    BridgeConfig::resolve(base.merge(overrides))
}
