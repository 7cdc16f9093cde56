// Interview feedback prompt templates.

pub const FEEDBACK_SYSTEM: &str = "\
You are a senior interviewer giving candid, constructive feedback on a mock interview. \
Respond with a single JSON object only.";

pub const FEEDBACK_PROMPT: &str = r#"Review this mock interview{role_line}.

Transcript:
{transcript}

Return JSON with exactly these fields:
{
  "overallScore": <integer 0-100>,
  "strengths": [<short strings>],
  "improvements": [<short, actionable strings>],
  "summary": "<2-3 sentences>"
}

Unanswered questions count against the score.
{grounding}"#;
