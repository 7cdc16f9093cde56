// CV text-generation prompt templates.

pub const SUMMARY_SYSTEM: &str = "\
You are an experienced career coach who writes concise, specific CV summaries. \
Write in the first person without using the word 'I' at the start of every sentence. \
Respond with the summary text only: no headings, no quotes, no markdown.";

pub const SUMMARY_PROMPT: &str = r#"Write a professional summary of 3 to 4 sentences (at most 80 words) for the CV below.
{target_role_line}
CV (markdown):
{cv_markdown}

{grounding}"#;
