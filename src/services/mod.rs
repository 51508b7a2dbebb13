pub mod backfill;
pub mod classifier;
pub mod gate;
pub mod gemini;
pub mod init;
pub mod notifications;
pub mod push;
pub mod recipients;
pub mod templates;
pub mod triggers;
