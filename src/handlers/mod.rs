pub mod backend_health_handler;
pub mod health_metrics;
pub mod mental_health;
pub mod media;
