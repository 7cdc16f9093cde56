// Interview practice: proxy to the interview backend plus local feedback fallback.

pub mod client;
pub mod handlers;
pub mod models;
pub mod prompts;
