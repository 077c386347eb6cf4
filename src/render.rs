/// Terminal presentation: banners, per-role progress lines, and response sections.
use std::io::{self, Write};

use crate::agents::Role;
use crate::error::redact_sensitive_text;
use crate::orchestrator::{AgentResponse, RecoveryReport, RoleOutcome};
use crate::request::Readiness;

// ---------------------------------------------------------------------------
// ANSI color helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const CYAN: &str = "\x1b[36m";
pub const BOLD_GREEN: &str = "\x1b[1;32m";
pub const BOLD_YELLOW: &str = "\x1b[1;33m";
pub const BOLD_RED: &str = "\x1b[1;31m";
pub const BOLD_MAGENTA: &str = "\x1b[1;35m";

pub const RUN_HEADER: &str = "Your Personalized Recovery Plan 🛡️";

pub struct Renderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn header(&mut self) -> io::Result<()> {
        let title = self.paint(BOLD_MAGENTA, RUN_HEADER);
        writeln!(self.out)?;
        let rule = self.paint(DIM, &"━".repeat(40));
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{rule}")?;
        self.out.flush()
    }

    pub fn progress(&mut self, role: Role) -> io::Result<()> {
        let line = self.paint(DIM, role.progress_message());
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn response(&mut self, response: &AgentResponse) -> io::Result<()> {
        match &response.outcome {
            RoleOutcome::Success { content } => {
                let title = self.paint(BOLD, response.section_title());
                writeln!(self.out)?;
                writeln!(self.out, "{title}")?;
                writeln!(self.out)?;
                writeln!(self.out, "{}", content.trim_end())?;
            }
            RoleOutcome::Failure { error } => {
                let banner = self.paint(BOLD_RED, &format!("✖ {}", redact_sensitive_text(error)));
                writeln!(self.out)?;
                writeln!(self.out, "{banner}")?;
            }
        }
        self.out.flush()
    }

    pub fn summary(&mut self, report: &RecoveryReport) -> io::Result<()> {
        writeln!(self.out)?;
        let line = format!(
            "{} of {} agents responded",
            report.succeeded(),
            report.responses.len()
        );
        let styled = if report.failed() == 0 {
            self.paint(BOLD_GREEN, &line)
        } else {
            self.paint(BOLD_YELLOW, &line)
        };
        writeln!(self.out, "{styled}")?;
        self.out.flush()
    }

    pub fn readiness(&mut self, readiness: Readiness) -> io::Result<()> {
        let style = if readiness.is_ready() {
            BOLD_GREEN
        } else {
            BOLD_YELLOW
        };
        let line = self.paint(style, readiness.message());
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(BOLD_RED, message);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn success(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(BOLD_GREEN, message);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(BOLD_YELLOW, message);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn role_card(&mut self, role: Role, web_search_enabled: bool) -> io::Result<()> {
        let name = self.paint(CYAN, role.agent_name());
        let tools = if web_search_enabled && role.uses_web_search() {
            "web search"
        } else {
            "none"
        };
        let label = self.paint(DIM, &format!("({})", role.label()));
        writeln!(self.out, "{name} {label}")?;
        writeln!(self.out, "  Section: {}", role.section_title())?;
        writeln!(self.out, "  Prompt: \"{}: <your story>\"", role.prompt_prefix())?;
        writeln!(self.out, "  Tools: {tools}")?;
        for line in role.instructions() {
            writeln!(self.out, "  - {line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}
