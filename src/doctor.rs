use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::RuntimeConfig;
use crate::credential::{CredentialStore, ResolvedCredential, GEMINI_API_KEY_ENV};
use crate::model::{validate_api_key, validate_model_name};

/// Prints the resolved configuration and returns whether everything needed for a run is in place.
pub fn run_doctor<W: Write>(
    cfg: &RuntimeConfig,
    active: Option<&ResolvedCredential>,
    store: &CredentialStore,
    out: &mut W,
) -> Result<bool> {
    let mut healthy = true;

    writeln!(
        out,
        "Active profile: '{}' (config: {})",
        cfg.profile, cfg.config_path
    )?;

    match active {
        Some(resolved) => {
            let shown = if cfg.show_sensitive_config {
                resolved.credential.expose().to_string()
            } else {
                resolved.credential.masked()
            };
            writeln!(
                out,
                "API key: {} (source={})",
                shown,
                resolved.source.label()
            )?;
            if let Err(err) = validate_api_key(&resolved.credential) {
                healthy = false;
                writeln!(out, "API key check: failed ({err})")?;
            }
        }
        None => {
            healthy = false;
            writeln!(out, "API key: missing")?;
            writeln!(
                out,
                "Tip: run `breakup-recovery key save --key <KEY>` or export {GEMINI_API_KEY_ENV}"
            )?;
        }
    }

    match validate_model_name(&cfg.model) {
        Ok(()) => writeln!(out, "Model: {} (ok)", cfg.model)?,
        Err(err) => {
            healthy = false;
            writeln!(out, "Model: {} (invalid: {err})", cfg.model)?;
        }
    }
    writeln!(out, "API base URL: {}", cfg.api_base_url)?;
    writeln!(
        out,
        "Pacing: pace_ms={} request_timeout_secs={}",
        cfg.pace_ms, cfg.request_timeout_secs
    )?;
    writeln!(
        out,
        "Web search (honesty agent): {}",
        if cfg.web_search { "enabled" } else { "disabled" }
    )?;

    let saved = match store.read_stored() {
        Ok(Some(stored)) if stored.is_expired_at(Utc::now()) => format!(
            "expired {}",
            stored.expires_at.format("%Y-%m-%d")
        ),
        Ok(Some(stored)) => format!("expires {}", stored.expires_at.format("%Y-%m-%d")),
        Ok(None) => "none".to_string(),
        Err(err) => {
            healthy = false;
            format!("unreadable ({err:#})")
        }
    };
    writeln!(
        out,
        "Credential store: {} ttl_days={} saved={}",
        store.path().display(),
        cfg.credential_ttl_days,
        saved
    )?;
    writeln!(
        out,
        "Telemetry: enabled={} path={}",
        cfg.telemetry_enabled, cfg.telemetry_path
    )?;

    out.flush().context("failed to write doctor report")?;
    Ok(healthy)
}
