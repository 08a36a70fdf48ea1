use std::env;
use std::time::Duration;

use permdesk_core::{ApiCredentials, AppError, AppResult};
use permdesk_domain::RoleName;
use url::Url;

/// What the runner does with the configured permission manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Replace the rows with the grants the role holds, then save.
    Fetch,
    /// Save the stored document again, re-applying its grants.
    Save,
    /// Create the document for the role.
    Create,
}

impl SyncMode {
    fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fetch" => Ok(Self::Fetch),
            "save" => Ok(Self::Save),
            "create" => Ok(Self::Create),
            other => Err(AppError::Validation(format!(
                "invalid PERMISSION_SYNC_MODE value '{other}', expected fetch, save or create"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Save => "save",
            Self::Create => "create",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub base_url: Url,
    pub credentials: ApiCredentials,
    pub manager_name: RoleName,
    pub http_timeout: Duration,
    pub mode: SyncMode,
}

impl SyncConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, "FRAPPE_BASE_URL")?;
        let base_url = Url::parse(base_url.trim().trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!("invalid FRAPPE_BASE_URL value '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "FRAPPE_BASE_URL must be a hierarchical URL, got '{base_url}'"
            )));
        }

        let credentials = ApiCredentials::new(
            required(&lookup, "FRAPPE_API_KEY")?,
            required(&lookup, "FRAPPE_API_SECRET")?,
        )?;
        let manager_name = RoleName::new(required(&lookup, "PERMISSION_MANAGER_NAME")?)?;

        let timeout_seconds = match lookup("FRAPPE_HTTP_TIMEOUT_SECONDS") {
            Some(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid FRAPPE_HTTP_TIMEOUT_SECONDS value '{value}': {error}"
                ))
            })?,
            None => 15,
        };
        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "FRAPPE_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let mode = lookup("PERMISSION_SYNC_MODE")
            .map(|value| SyncMode::parse(value.as_str()))
            .transpose()?
            .unwrap_or(SyncMode::Fetch);

        Ok(Self {
            base_url,
            credentials,
            manager_name,
            http_timeout: Duration::from_secs(timeout_seconds),
            mode,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}
