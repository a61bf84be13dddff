use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::{chat, health_data, HealthStore, StoreError};
use crate::models::chat::ChatMessage;
use crate::models::metrics::{MealRecord, SleepRecord, WaterEntry, WaterRecord, WeightRecord};
use crate::models::query::DateRange;

/// `HealthStore` backed by Postgres.
#[derive(Clone, Debug)]
pub struct PgHealthStore {
    pool: PgPool,
}

impl PgHealthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl HealthStore for PgHealthStore {
    async fn upsert_water(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: WaterEntry,
    ) -> Result<WaterRecord, StoreError> {
        health_data::upsert_water_intake(&self.pool, user_id, date, entry).await
    }

    async fn insert_weight(&self, record: WeightRecord) -> Result<WeightRecord, StoreError> {
        health_data::insert_weight_entry(&self.pool, &record).await?;
        Ok(record)
    }

    async fn insert_sleep(&self, record: SleepRecord) -> Result<SleepRecord, StoreError> {
        health_data::insert_sleep_entry(&self.pool, &record).await?;
        Ok(record)
    }

    async fn insert_meal(&self, record: MealRecord) -> Result<MealRecord, StoreError> {
        health_data::insert_meal_entry(&self.pool, &record).await?;
        Ok(record)
    }

    async fn water_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<WaterRecord>, StoreError> {
        health_data::get_water_intake(&self.pool, user_id, range).await
    }

    async fn weight_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<WeightRecord>, StoreError> {
        health_data::get_weight_entries(&self.pool, user_id, range).await
    }

    async fn sleep_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<SleepRecord>, StoreError> {
        health_data::get_sleep_entries(&self.pool, user_id, range).await
    }

    async fn meals_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<MealRecord>, StoreError> {
        health_data::get_meal_entries(&self.pool, user_id, range).await
    }

    async fn append_chat_messages(&self, user_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        chat::insert_chat_messages(&self.pool, user_id, messages).await
    }

    async fn chat_history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        chat::get_chat_history(&self.pool, user_id, limit).await
    }
}
