//! Ambient configuration (§4.11, §6): a single `Settings` value assembled once at
//! binary start from environment variables, then threaded down explicitly. No
//! on-disk config file — the worker is invoked by a platform trigger with no
//! deployment-local file to ship alongside it.

use config::Config;
use config::ConfigError;
use serde::Deserialize;

const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Selects the parameter-store path prefix and, indirectly, which upstream
/// deployment this run talks to (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Staging,
    Production,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            _ => Err(()),
        }
    }
}

/// Raw shape read straight off the environment; `STAGE` is validated and
/// defaulted afterwards since an unrecognised value falls back to `staging`
/// rather than failing configuration load (§6).
#[derive(Debug, Deserialize)]
struct RawSettings {
    stage: Option<String>,
    overwrite_outgoing_emails: Option<String>,
    api_base_url: String,
    http_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub stage: Stage,
    /// Non-empty only when `OVERWRITE_OUTGOING_EMAILS` is set; empty/unset means
    /// "use the rendered recipients as-is" (§4.7).
    pub overwrite_outgoing_emails: Option<String>,
    pub api_base_url: String,
    pub http_timeout_seconds: u64,
}

impl Settings {
    /// `/{stage}/email-worker/{name}` (§6 secret-store keys).
    pub fn secret_path(&self, name: &str) -> String {
        format!("/{}/email-worker/{name}", self.stage.as_str())
    }
}

/// Loads `Settings` from the process environment. `API_BASE_URL` is the only
/// required variable; everything else has a documented default (§6).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let raw: RawSettings = Config::builder()
        .add_source(config::Environment::default())
        .build()?
        .try_deserialize()?;

    let stage = raw
        .stage
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Stage::Staging);

    let overwrite_outgoing_emails = raw
        .overwrite_outgoing_emails
        .filter(|value| !value.is_empty());

    Ok(Settings {
        stage,
        overwrite_outgoing_emails,
        api_base_url: raw.api_base_url,
        http_timeout_seconds: raw.http_timeout_seconds.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
    })
}
