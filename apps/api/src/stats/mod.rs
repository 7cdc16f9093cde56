// Roadmap document persistence and the dashboard statistics derived from it.
// Derived statistics are recomputed on every request and never stored.

pub mod compute;
pub mod handlers;
pub mod store;
pub mod streak;
