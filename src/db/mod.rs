//! Persistence for health records and chat transcripts.
//!
//! Handlers never touch a connection directly: the store is built once at
//! startup and injected as an `Arc<dyn HealthStore>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error as ThisError;

use crate::config::settings::{DatabaseSettings, StorageBackend};
use crate::models::chat::ChatMessage;
use crate::models::metrics::{MealRecord, SleepRecord, WaterEntry, WaterRecord, WeightRecord};
use crate::models::query::DateRange;

pub mod health_data;
pub mod chat;
pub mod postgres;
pub mod memory;

pub use memory::InMemoryHealthStore;
pub use postgres::PgHealthStore;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Add `entry` to the (user, date) water record, creating it if absent.
    /// The increment must be atomic with respect to concurrent callers.
    async fn upsert_water(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: WaterEntry,
    ) -> Result<WaterRecord, StoreError>;

    async fn insert_weight(&self, record: WeightRecord) -> Result<WeightRecord, StoreError>;

    async fn insert_sleep(&self, record: SleepRecord) -> Result<SleepRecord, StoreError>;

    async fn insert_meal(&self, record: MealRecord) -> Result<MealRecord, StoreError>;

    async fn water_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<WaterRecord>, StoreError>;

    async fn weight_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<WeightRecord>, StoreError>;

    async fn sleep_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<SleepRecord>, StoreError>;

    async fn meals_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<MealRecord>, StoreError>;

    /// Append to the user's transcript, preserving slice order.
    async fn append_chat_messages(&self, user_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError>;

    /// The most recent `limit` messages, oldest first.
    async fn chat_history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError>;
}

/// Build the store selected in configuration.
///
/// Postgres migrations are applied before the store is handed out.
pub async fn build_store(
    backend: StorageBackend,
    database: &DatabaseSettings,
) -> Result<Arc<dyn HealthStore>, StoreError> {
    match backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            Ok(Arc::new(InMemoryHealthStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(32)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
                .connect_lazy(database.connection_string().expose_secret())?;
            let store = PgHealthStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}
