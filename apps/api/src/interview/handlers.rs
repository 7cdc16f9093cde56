use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::auth::BearerToken;
use crate::backend_client::validate_path_id;
use crate::errors::AppError;
use crate::interview::models::{GeneratedFeedback, InterviewSession, SessionProgress, SessionView};
use crate::interview::prompts::{FEEDBACK_PROMPT, FEEDBACK_SYSTEM};
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    Backend,
    Generated,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub source: FeedbackSource,
    pub feedback: Value,
}

fn require_object(body: &Value) -> Result<(), AppError> {
    if body.is_object() {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        ))
    }
}

fn token_ref(token: &Option<BearerToken>) -> Option<&str> {
    token.as_ref().map(|t| t.0.as_str())
}

/// Question/answer transcript fed to the feedback prompt.
pub fn build_transcript(session: &InterviewSession) -> String {
    session
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let answer = session.answer_for(i).unwrap_or("(no answer)");
            let category = q
                .category
                .as_deref()
                .map(|c| format!(" [{c}]"))
                .unwrap_or_default();
            format!("Q{n}{category}: {}\nA{n}: {answer}", q.text.trim(), n = i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// POST /api/interview/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    token: Option<BearerToken>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    require_object(&body)?;
    let session = state
        .interview
        .create_session(&body, token_ref(&token))
        .await?;
    Ok(Json(session))
}

/// GET /api/interview/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    token: Option<BearerToken>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let id = validate_path_id(&id, "session id")?;
    let session = state.interview.get_session(id, token_ref(&token)).await?;
    let progress = SessionProgress::from_session(&InterviewSession::from_value(&session), Utc::now());
    Ok(Json(SessionView { session, progress }))
}

/// POST /api/interview/sessions/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    token: Option<BearerToken>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let id = validate_path_id(&id, "session id")?;
    require_object(&body)?;
    let result = state
        .interview
        .submit_answer(id, &body, token_ref(&token))
        .await?;
    Ok(Json(result))
}

/// GET /api/interview/sessions/:id/feedback
///
/// Falls back to generating feedback from the transcript when the backend
/// has none for this session.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    token: Option<BearerToken>,
    Path(id): Path<String>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let id = validate_path_id(&id, "session id")?;
    let token = token_ref(&token);

    if let Some(feedback) = state.interview.get_feedback(id, token).await? {
        return Ok(Json(FeedbackResponse {
            source: FeedbackSource::Backend,
            feedback,
        }));
    }

    let session = InterviewSession::from_value(&state.interview.get_session(id, token).await?);
    if session.questions.is_empty() {
        return Err(AppError::NotFound(format!(
            "Session {id} has no questions to give feedback on"
        )));
    }

    let role_line = session
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!(" for the role of {r}"))
        .unwrap_or_default();
    let prompt = FEEDBACK_PROMPT
        .replace("{role_line}", &role_line)
        .replace("{transcript}", &build_transcript(&session))
        .replace("{grounding}", GROUNDING_INSTRUCTION);

    let system = format!("{FEEDBACK_SYSTEM} {JSON_ONLY_SYSTEM}");
    let mut generated: GeneratedFeedback = state
        .llm
        .call_json(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Feedback generation failed: {e}")))?;
    generated.overall_score = generated.overall_score.min(100);
    info!("Generated interview feedback for session {id}");

    let feedback = serde_json::to_value(generated).map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(FeedbackResponse {
        source: FeedbackSource::Generated,
        feedback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_marks_unanswered_questions() {
        let session = InterviewSession::from_value(&json!({
            "questions": [
                {"id": "a", "text": "Why this company?"},
                {"id": "b", "text": " Biggest failure? "}
            ],
            "answers": [{"questionId": "a", "answer": "Mission"}]
        }));
        assert_eq!(
            build_transcript(&session),
            "Q1: Why this company?\nA1: Mission\n\nQ2: Biggest failure?\nA2: (no answer)"
        );
    }

    #[test]
    fn test_require_object() {
        assert!(require_object(&json!({"role": "SRE"})).is_ok());
        assert!(matches!(
            require_object(&json!([1, 2])),
            Err(AppError::Validation(_))
        ));
    }
}
