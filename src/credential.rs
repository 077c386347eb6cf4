use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecoveryError;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const MAX_TTL_DAYS: i64 = 3650;

/// Opaque model API key. Never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Result<Self, RecoveryError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RecoveryError::CredentialMissing);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        let chars = self.0.chars().collect::<Vec<char>>();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head = chars[..4].iter().collect::<String>();
        let tail = chars[chars.len() - 2..].iter().collect::<String>();
        format!("{head}…{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Flag,
    Saved,
    Environment,
}

impl CredentialSource {
    pub fn label(self) -> &'static str {
        match self {
            CredentialSource::Flag => "--api-key",
            CredentialSource::Saved => "saved key",
            CredentialSource::Environment => GEMINI_API_KEY_ENV,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredCredential {
    pub api_key: String,
    pub saved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredCredential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// File-backed key store with a fixed expiry, one key per file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    ttl: Duration,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, ttl_days: i64) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::days(ttl_days.clamp(1, MAX_TTL_DAYS)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, credential: &Credential) -> Result<StoredCredential> {
        self.save_at(credential, Utc::now())
    }

    pub fn save_at(&self, credential: &Credential, now: DateTime<Utc>) -> Result<StoredCredential> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create credential store directory '{}'",
                    parent.display()
                )
            })?;
        }

        let stored = StoredCredential {
            api_key: credential.expose().to_string(),
            saved_at: now,
            expires_at: now + self.ttl,
        };
        let payload =
            toml::to_string(&stored).context("failed to serialize credential store file")?;
        std::fs::write(&self.path, payload).with_context(|| {
            format!("failed to write credential store '{}'", self.path.display())
        })?;
        restrict_permissions(&self.path)?;

        tracing::info!(
            path = %self.path.display(),
            expires_at = %stored.expires_at.to_rfc3339(),
            "Saved API key"
        );
        Ok(stored)
    }

    pub fn load(&self) -> Result<Option<Credential>> {
        self.load_at(Utc::now())
    }

    /// Returns the saved key unless it is missing, blank, or expired at `now`.
    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Option<Credential>> {
        let Some(stored) = self.read_stored()? else {
            return Ok(None);
        };

        if stored.is_expired_at(now) {
            tracing::debug!(
                path = %self.path.display(),
                expired_at = %stored.expires_at.to_rfc3339(),
                "Ignoring expired saved API key"
            );
            return Ok(None);
        }

        Ok(Credential::new(stored.api_key).ok())
    }

    pub fn read_stored(&self) -> Result<Option<StoredCredential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!("failed to read credential store '{}'", self.path.display())
        })?;
        let stored = toml::from_str::<StoredCredential>(&content).with_context(|| {
            format!(
                "invalid credential store '{}'. Run `breakup-recovery key clear` and save the key again.",
                self.path.display()
            )
        })?;
        Ok(Some(stored))
    }

    /// Removes the saved key. Returns whether a file was present.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path).with_context(|| {
            format!("failed to remove credential store '{}'", self.path.display())
        })?;
        tracing::info!(path = %self.path.display(), "Cleared saved API key");
        Ok(true)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).with_context(|| {
        format!(
            "failed to restrict permissions on credential store '{}'",
            path.display()
        )
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Picks the active key: explicit input, then the saved key, then the environment default.
pub fn resolve_credential(
    explicit: Option<&str>,
    store: &CredentialStore,
    env_default: Option<String>,
) -> Result<Option<ResolvedCredential>> {
    if let Some(credential) = explicit.and_then(|value| Credential::new(value).ok()) {
        return Ok(Some(ResolvedCredential {
            credential,
            source: CredentialSource::Flag,
        }));
    }

    if let Some(credential) = store.load()? {
        return Ok(Some(ResolvedCredential {
            credential,
            source: CredentialSource::Saved,
        }));
    }

    Ok(env_default
        .and_then(|value| Credential::new(value).ok())
        .map(|credential| ResolvedCredential {
            credential,
            source: CredentialSource::Environment,
        }))
}

pub fn env_default_credential() -> Option<String> {
    std::env::var(GEMINI_API_KEY_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
