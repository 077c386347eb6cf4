/// The main action: activate the credential, gate on readiness, then render each role as it lands.
use std::io::Write;

use anyhow::{Context, Result};
use serde_json::json;

use crate::agents::Role;
use crate::credential::Credential;
use crate::error::redact_sensitive_text;
use crate::orchestrator::{Orchestrator, RecoveryReport};
use crate::render::Renderer;
use crate::request::{Readiness, RecoveryRequest};
use crate::session::RecoverySession;
use crate::telemetry::TelemetrySink;

#[derive(Debug)]
pub enum RecoveryOutcome {
    /// The main action was disabled; nothing was called.
    Skipped(Readiness),
    /// No agent set was available; nothing was called.
    Refused,
    Completed(RecoveryReport),
}

pub async fn run_recovery<W: Write>(
    session: &mut RecoverySession,
    credential: Option<Credential>,
    request: RecoveryRequest,
    orchestrator: &Orchestrator,
    renderer: &mut Renderer<W>,
    telemetry: &TelemetrySink,
) -> Result<RecoveryOutcome> {
    match credential {
        Some(credential) => {
            if session.activate(credential).is_ok() {
                telemetry.emit("agents.initialized", json!({}));
            } else if let Some(message) = session.init_error() {
                let message = message.to_string();
                telemetry.emit(
                    "agents.init_failed",
                    json!({ "error": redact_sensitive_text(&message) }),
                );
                renderer.error(&message).context("failed to write output")?;
            }
        }
        None => session.clear(),
    }

    let readiness = session.readiness(&request);
    if !readiness.is_ready() {
        tracing::info!(readiness = ?readiness, "Main action disabled");
        renderer
            .readiness(readiness)
            .context("failed to write output")?;
        return Ok(RecoveryOutcome::Skipped(readiness));
    }

    let image_count = request.images().len();
    let mut run = match orchestrator.run(session.agents(), request) {
        Ok(run) => run,
        Err(err) => {
            renderer
                .error(&err.to_string())
                .context("failed to write output")?;
            return Ok(RecoveryOutcome::Refused);
        }
    };

    telemetry.emit(
        "run.started",
        json!({
            "images": image_count,
            "pace_ms": orchestrator.pace().as_millis() as u64,
        }),
    );
    renderer.header().context("failed to write output")?;

    let mut report = RecoveryReport::default();
    while let Some(role) = run.upcoming_role() {
        renderer.progress(role).context("failed to write output")?;
        let Some(response) = run.next_response().await else {
            break;
        };
        telemetry.emit_response(&response);
        renderer
            .response(&response)
            .context("failed to write output")?;
        report.responses.push(response);
    }

    telemetry.emit(
        "run.completed",
        json!({
            "succeeded": report.succeeded(),
            "failed": report.failed(),
        }),
    );
    renderer.summary(&report).context("failed to write output")?;

    Ok(RecoveryOutcome::Completed(report))
}

pub fn run_roles_list<W: Write>(renderer: &mut Renderer<W>, web_search_enabled: bool) -> Result<()> {
    for role in Role::ALL {
        renderer
            .role_card(role, web_search_enabled)
            .context("failed to write output")?;
    }
    Ok(())
}

/// Joins positional words and an optional text file into the narrative.
pub fn read_narrative(words: &[String], text_file: Option<&str>) -> Result<String> {
    let mut sections = Vec::<String>::new();
    let inline = words.join(" ");
    if !inline.trim().is_empty() {
        sections.push(inline.trim().to_string());
    }
    if let Some(path) = text_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input text file '{path}'"))?;
        if !content.trim().is_empty() {
            sections.push(content.trim().to_string());
        }
    }
    Ok(sections.join("\n\n"))
}
