use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

use crate::extract;
use crate::llm::CompletionClient;
use crate::models::{AnswerResponse, AppState};
use crate::prompt;
use crate::summarize;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", post(submit))
        .with_state(state)
}

/// Outermost boundary of the pipeline. Whatever happens inside, the caller
/// receives a 200 with `{ "answer": <string> }`; only a request missing its
/// `question` field is rejected at the protocol level.
async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnswerResponse>, StatusCode> {
    let (question, upload) = read_form(multipart)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let Some(question) = question else {
        return Err(StatusCode::BAD_REQUEST);
    };

    info!(has_file = upload.is_some(), "question received");

    let answer = match run_pipeline(&state.completion, &question, upload).await {
        Ok(answer) => answer,
        Err(e @ AppError::Archive(_)) => format!("Error: {e}"),
        Err(e) => {
            warn!(error = %e, "request failed at the outer boundary");
            format!("Server error: {e}")
        }
    };

    Ok(Json(AnswerResponse { answer }))
}

/// Pulls the question text and the optional upload out of the multipart form.
async fn read_form(
    mut multipart: Multipart,
) -> AppResult<(Option<String>, Option<(String, Vec<u8>)>)> {
    let mut question = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?
    {
        match field.name().map(str::to_string).as_deref() {
            Some("question") => {
                question = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidRequest(e.to_string()))?,
                );
            }
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    upload = Some((filename, data.to_vec()));
                }
            }
            _ => {}
        }
    }

    Ok((question, upload))
}

/// Unpack, summarize, compose, synthesize. Extraction failures propagate;
/// per-file parse trouble is already degraded inside `summarize`.
pub(crate) async fn run_pipeline(
    completion: &CompletionClient,
    question: &str,
    upload: Option<(String, Vec<u8>)>,
) -> AppResult<String> {
    let entries = match upload {
        Some((name, bytes)) => extract::unpack(&name, bytes)?,
        None => Vec::new(),
    };

    let summaries: Vec<(String, String)> = entries
        .iter()
        .filter(|entry| summarize::is_tabular(&entry.name))
        .map(|entry| (entry.name.clone(), summarize::summarize(entry)))
        .collect();

    let prompt = prompt::compose(question, &summaries);
    Ok(completion.synthesize(&prompt).await)
}
