pub mod recorder;
pub mod aggregator;
pub mod llm_service;
pub mod conversation_service;
pub mod media_host;
pub mod minio_service;

pub use aggregator::MetricAggregator;
pub use conversation_service::ConversationService;
pub use media_host::{LocalMediaHost, MediaHost};
pub use recorder::MetricRecorder;
