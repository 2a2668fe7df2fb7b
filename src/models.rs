use crate::config::Config;
use crate::llm::CompletionClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub completion: CompletionClient,
}

/// Uniform answer envelope. Success and error outcomes share this shape;
/// errors are encoded in the string value.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub token_configured: bool,
    pub token_prefix: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProbeResponse {
    pub ok: bool,
    pub detail: String,
}
