//! Typed view over interview sessions returned by the interview backend.
//! Only the fields needed for progress and feedback are modelled; the raw
//! JSON is what gets passed back to the client.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Integers, or strings holding one; anything else reads as absent.
fn loose_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(raw.and_then(|n| T::try_from(n).ok()))
}

/// Accepts RFC 3339, offset-less local date-times (read as UTC) and epoch
/// milliseconds.
fn loose_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => parse_timestamp(&s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Keeps the well-formed elements of a list and drops the rest.
fn valid_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewQuestion {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(alias = "question", alias = "prompt")]
    pub text: String,
    #[serde(alias = "kind")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewAnswer {
    #[serde(deserialize_with = "string_or_number")]
    pub question_id: Option<String>,
    #[serde(deserialize_with = "loose_integer")]
    pub question_index: Option<usize>,
    #[serde(alias = "text", alias = "response")]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewSession {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(alias = "jobRole", deserialize_with = "string_or_number")]
    pub role: Option<String>,
    #[serde(deserialize_with = "valid_items")]
    pub questions: Vec<InterviewQuestion>,
    #[serde(deserialize_with = "valid_items")]
    pub answers: Vec<InterviewAnswer>,
    #[serde(deserialize_with = "loose_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(alias = "timeLimitSeconds", deserialize_with = "loose_integer")]
    pub duration_seconds: Option<i64>,
}

impl InterviewSession {
    /// Tolerant parse: an unexpected shape yields an empty session.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// Answer given for the question at `index`, matched by id first and
    /// then by position.
    pub fn answer_for(&self, index: usize) -> Option<&str> {
        let question = self.questions.get(index)?;
        self.answers
            .iter()
            .find(|a| match (&a.question_id, &question.id) {
                (Some(aid), Some(qid)) => aid == qid,
                _ => a.question_index == Some(index),
            })
            .map(|a| a.answer.trim())
            .filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub answered: usize,
    pub total: usize,
    pub percent: u32,
    /// `None` when the session has no time limit.
    pub remaining_seconds: Option<i64>,
    pub expired: bool,
}

impl SessionProgress {
    pub fn from_session(session: &InterviewSession, now: DateTime<Utc>) -> Self {
        let total = session.questions.len();
        let answered = (0..total)
            .filter(|i| session.answer_for(*i).is_some())
            .count();
        let percent = if total == 0 {
            0
        } else {
            ((answered as f64 / total as f64) * 100.0).round() as u32
        };

        let remaining_seconds = match (session.started_at, session.duration_seconds) {
            (Some(started), Some(limit)) => {
                let deadline = started + Duration::seconds(limit.max(0));
                Some((deadline - now).num_seconds().max(0))
            }
            _ => None,
        };

        Self {
            answered,
            total,
            percent,
            remaining_seconds,
            expired: remaining_seconds == Some(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session: Value,
    pub progress: SessionProgress,
}

/// Feedback produced locally when the interview backend has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFeedback {
    #[serde(default)]
    pub overall_score: u32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn session_json() -> Value {
        json!({
            "id": 42,
            "role": "Backend Engineer",
            "questions": [
                {"id": "q1", "text": "Tell me about yourself"},
                {"id": "q2", "question": "Design a rate limiter"},
                {"id": "q3", "text": "Why Rust?"}
            ],
            "answers": [
                {"questionId": "q1", "answer": "I build APIs"},
                {"questionId": "q3", "text": "   "}
            ],
            "startedAt": "2024-05-10T12:00:00Z",
            "durationSeconds": 1800
        })
    }

    #[test]
    fn test_parses_loose_session_shape() {
        let session = InterviewSession::from_value(&session_json());
        assert_eq!(session.id.as_deref(), Some("42"));
        assert_eq!(session.questions[1].text, "Design a rate limiter");
        assert_eq!(session.answer_for(0), Some("I build APIs"));
        assert_eq!(session.answer_for(2), None);
        assert_eq!(session.answer_for(9), None);
    }

    #[test]
    fn test_progress_counts_non_blank_answers() {
        let session = InterviewSession::from_value(&session_json());
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 10, 0).unwrap();
        let progress = SessionProgress::from_session(&session, now);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percent, 33);
        assert_eq!(progress.remaining_seconds, Some(1200));
        assert!(!progress.expired);
    }

    #[test]
    fn test_remaining_time_saturates_and_expires() {
        let session = InterviewSession::from_value(&session_json());
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 14, 0, 0).unwrap();
        let progress = SessionProgress::from_session(&session, now);
        assert_eq!(progress.remaining_seconds, Some(0));
        assert!(progress.expired);
    }

    #[test]
    fn test_local_start_time_and_bad_entries_keep_the_session() {
        let session = InterviewSession::from_value(&json!({
            "id": "s-1",
            "questions": [
                {"id": "q1", "text": "Tell me about yourself"},
                {"id": "q2", "text": null},
                {"id": "q3", "prompt": "Why Rust?"}
            ],
            "answers": [{"questionId": "q1", "answer": "I build APIs"}, "oops"],
            "startedAt": "2024-05-10T12:00:00",
            "timeLimitSeconds": "600"
        }));
        assert_eq!(session.questions.len(), 2);
        assert_eq!(session.answers.len(), 1);
        assert_eq!(
            session.started_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap())
        );

        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 4, 0).unwrap();
        let progress = SessionProgress::from_session(&session, now);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.remaining_seconds, Some(360));
    }

    #[test]
    fn test_epoch_millis_start_time() {
        let session = InterviewSession::from_value(&json!({
            "startedAt": 1_715_342_400_000_i64
        }));
        assert_eq!(
            session.started_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_untimed_and_empty_sessions() {
        let progress = SessionProgress::from_session(&InterviewSession::default(), Utc::now());
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.remaining_seconds, None);
        assert!(!progress.expired);

        let by_index = InterviewSession::from_value(&json!({
            "questions": [{"text": "Q"}],
            "answers": [{"questionIndex": 0, "answer": "A"}]
        }));
        assert_eq!(by_index.answer_for(0), Some("A"));
    }
}
