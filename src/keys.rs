use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::credential::{Credential, CredentialStore, ResolvedCredential};
use crate::render::Renderer;

/// Persists `input` to the store. Returns `false` when there was nothing to save.
pub fn run_key_save<W: Write>(
    store: &CredentialStore,
    input: Option<&str>,
    renderer: &mut Renderer<W>,
) -> Result<bool> {
    let Some(credential) = input.and_then(|value| Credential::new(value).ok()) else {
        renderer
            .warning("Please enter a key first.")
            .context("failed to write output")?;
        return Ok(false);
    };

    let stored = store.save(&credential)?;
    renderer
        .success(&format!(
            "Key saved to {} until {} 🍪",
            store.path().display(),
            stored.expires_at.format("%Y-%m-%d")
        ))
        .context("failed to write output")?;
    Ok(true)
}

pub fn run_key_clear<W: Write>(store: &CredentialStore, renderer: &mut Renderer<W>) -> Result<bool> {
    let removed = store.clear()?;
    let message = if removed {
        "Cleared saved key 🗑️"
    } else {
        "No saved key to clear."
    };
    renderer
        .success(message)
        .context("failed to write output")?;
    Ok(removed)
}

pub fn run_key_status<W: Write>(
    active: Option<&ResolvedCredential>,
    store: &CredentialStore,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    match active {
        Some(resolved) => renderer.success(&format!(
            "Active key: {} (from {})",
            resolved.credential.masked(),
            resolved.source.label()
        )),
        None => renderer.warning("API Key required."),
    }
    .context("failed to write output")?;

    let saved_line = match store.read_stored()? {
        Some(stored) if stored.is_expired_at(Utc::now()) => format!(
            "Saved key at {}: expired on {}",
            store.path().display(),
            stored.expires_at.format("%Y-%m-%d")
        ),
        Some(stored) => format!(
            "Saved key at {}: expires on {}",
            store.path().display(),
            stored.expires_at.format("%Y-%m-%d")
        ),
        None => format!("Saved key at {}: none", store.path().display()),
    };
    renderer
        .success(&saved_line)
        .context("failed to write output")?;
    Ok(())
}
