use thiserror::Error;

/// Failures a caller of the library is expected to branch on.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("API key required. Pass --api-key, set GEMINI_API_KEY, or run `breakup-recovery key save`.")]
    CredentialMissing,

    #[error("Error initializing agents: {0}")]
    AgentSetInitFailure(String),

    #[error("Agents are not initialized. Please check API Key.")]
    AgentsNotInitialized,

    #[error("{agent} failed: {message}")]
    RoleInvocation {
        agent: &'static str,
        message: String,
    },

    #[error("unsupported image '{name}': {reason}")]
    Image { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credential,
    Model,
    Input,
    Storage,
    Internal,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Credential => "CREDENTIAL",
            ErrorCategory::Model => "MODEL",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Storage => "STORAGE",
            ErrorCategory::Internal => "INTERNAL",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            ErrorCategory::Credential => {
                "Get a key from https://aistudio.google.com/ and run `breakup-recovery key save --key <KEY>`."
            }
            ErrorCategory::Model => {
                "Check the model id and API base URL, then retry with RUST_LOG=info for request logs."
            }
            ErrorCategory::Input => "Run breakup-recovery --help and correct command arguments.",
            ErrorCategory::Storage => {
                "Check permissions on the credential store and telemetry paths (see `breakup-recovery doctor`)."
            }
            ErrorCategory::Internal => {
                "Retry with RUST_LOG=debug. If it persists, capture logs and open an issue."
            }
        }
    }
}

pub fn categorize_error(err: &anyhow::Error) -> ErrorCategory {
    if let Some(recovery) = err.downcast_ref::<RecoveryError>() {
        return match recovery {
            RecoveryError::CredentialMissing => ErrorCategory::Credential,
            RecoveryError::AgentSetInitFailure(_) | RecoveryError::AgentsNotInitialized => {
                ErrorCategory::Credential
            }
            RecoveryError::RoleInvocation { .. } => ErrorCategory::Model,
            RecoveryError::Image { .. } => ErrorCategory::Input,
        };
    }

    let msg = format!("{err:#}").to_ascii_lowercase();

    if msg.contains("api key") || msg.contains("api_key") || msg.contains("credential") {
        return ErrorCategory::Credential;
    }

    if msg.contains("model") || msg.contains("generatecontent") {
        return ErrorCategory::Model;
    }

    if msg.contains("invalid value")
        || msg.contains("unknown argument")
        || msg.contains("profile")
        || msg.contains("failed to read input")
        || msg.contains("image")
    {
        return ErrorCategory::Input;
    }

    if msg.contains("telemetry") || msg.contains("directory") || msg.contains("permission") {
        return ErrorCategory::Storage;
    }

    ErrorCategory::Internal
}

pub fn format_cli_error(err: &anyhow::Error, show_sensitive_config: bool) -> String {
    let category = categorize_error(err);
    let rendered_error = render_error_message(err, show_sensitive_config);
    format!(
        "[{}] {}\nHint: {}",
        category.code(),
        rendered_error,
        category.hint()
    )
}

pub fn render_error_message(err: &anyhow::Error, show_sensitive_config: bool) -> String {
    let text = format!("{err:#}");
    if show_sensitive_config {
        text
    } else {
        redact_sensitive_text(&text)
    }
}

pub fn redact_sensitive_text(text: &str) -> String {
    redact_google_api_keys(&redact_key_query_params(text))
}

/// Masks the value of `key=` query parameters, as in `...:generateContent?key=AIza...`.
pub fn redact_key_query_params(text: &str) -> String {
    const KEY_PARAM: &str = "key=";
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    while let Some(offset) = text[cursor..].find(KEY_PARAM) {
        let start = cursor + offset;
        let value_start = start + KEY_PARAM.len();
        let preceded_by_separator = start == 0
            || matches!(text.as_bytes()[start - 1], b'?' | b'&' | b' ' | b'\t' | b'\n');
        out.push_str(&text[cursor..value_start]);

        let remainder = &text[value_start..];
        let end = remainder
            .find(|ch: char| {
                ch.is_whitespace() || matches!(ch, '&' | '"' | '\'' | ')' | ']' | '}' | ',' | ';')
            })
            .unwrap_or(remainder.len());

        if preceded_by_separator && end > 0 {
            out.push_str("[REDACTED]");
        } else {
            out.push_str(&remainder[..end]);
        }
        cursor = value_start + end;
    }

    out.push_str(&text[cursor..]);
    out
}

/// Masks bare Google API keys (`AIza` followed by 35 key characters).
pub fn redact_google_api_keys(text: &str) -> String {
    const PREFIX: &str = "AIza";
    const KEY_LEN: usize = 39;
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    while let Some(offset) = text[cursor..].find(PREFIX) {
        let start = cursor + offset;
        out.push_str(&text[cursor..start]);

        let token_len = text[start..]
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'))
            .unwrap_or(text.len() - start);

        if token_len == KEY_LEN {
            out.push_str("AIza[REDACTED]");
        } else {
            out.push_str(&text[start..start + token_len]);
        }
        cursor = start + token_len;
    }

    out.push_str(&text[cursor..]);
    out
}
