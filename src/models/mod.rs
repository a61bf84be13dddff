pub mod common;
pub mod error;
pub mod metrics;
pub mod query;
pub mod chat;
pub mod llm;
pub mod media;
