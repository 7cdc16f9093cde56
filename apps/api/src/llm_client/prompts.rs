// Shared prompt fragments.
// Each module that needs generation keeps its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to any prompt that writes about the user's own history.
pub const GROUNDING_INSTRUCTION: &str = "\
    Only use facts present in the data provided. \
    Do NOT invent employers, titles, dates, metrics or technologies. \
    If the data does not support a claim, leave it out.";
