use crate::credential::Credential;

/// A single run's input: narrative text plus raw screenshot bytes, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryRequest {
    text: String,
    images: Vec<Vec<u8>>,
}

impl RecoveryRequest {
    pub fn new(text: impl Into<String>, images: Vec<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            images,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn images(&self) -> &[Vec<u8>] {
        &self.images
    }

    pub fn has_content(&self) -> bool {
        !self.text.is_empty() || !self.images.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Vec<u8>>) {
        (self.text, self.images)
    }
}

/// Whether the main action may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    MissingCredential,
    EmptyRequest,
}

impl Readiness {
    pub fn evaluate(credential: Option<&Credential>, request: &RecoveryRequest) -> Self {
        if credential.is_none() {
            return Readiness::MissingCredential;
        }
        if !request.has_content() {
            return Readiness::EmptyRequest;
        }
        Readiness::Ready
    }

    pub fn is_ready(self) -> bool {
        matches!(self, Readiness::Ready)
    }

    pub fn message(self) -> &'static str {
        match self {
            Readiness::Ready => "System Ready ✅",
            Readiness::MissingCredential => {
                "Please enter your API Key (--api-key, GEMINI_API_KEY, or `key save`) to start."
            }
            Readiness::EmptyRequest => {
                "Share what happened (text) or attach chat screenshots (--image) to get a recovery plan."
            }
        }
    }
}
