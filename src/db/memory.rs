use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::db::{HealthStore, StoreError};
use crate::models::chat::ChatMessage;
use crate::models::metrics::{MealRecord, SleepRecord, WaterEntry, WaterRecord, WeightRecord};
use crate::models::query::DateRange;

#[derive(Default)]
struct Tables {
    water: HashMap<(String, NaiveDate), WaterRecord>,
    weight: Vec<WeightRecord>,
    sleep: Vec<SleepRecord>,
    meals: Vec<MealRecord>,
    chat: HashMap<String, Vec<ChatMessage>>,
}

/// Process-local `HealthStore`. Every write happens under one lock, which
/// keeps the water increment atomic.
#[derive(Default)]
pub struct InMemoryHealthStore {
    tables: RwLock<Tables>,
}

impl InMemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

fn select<T: Clone>(
    rows: &[T],
    user_id: &str,
    range: &DateRange,
    owner: impl Fn(&T) -> &str,
    date: impl Fn(&T) -> NaiveDate,
) -> Vec<T> {
    rows.iter()
        .filter(|row| owner(row) == user_id && range.contains(date(row)))
        .cloned()
        .collect()
}

#[async_trait]
impl HealthStore for InMemoryHealthStore {
    async fn upsert_water(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: WaterEntry,
    ) -> Result<WaterRecord, StoreError> {
        let mut tables = self.write()?;
        let record = tables
            .water
            .entry((user_id.to_string(), date))
            .or_insert_with(|| WaterRecord {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                date,
                daily_total: 0.0,
                entries: Vec::new(),
                created_at: entry.timestamp,
                updated_at: entry.timestamp,
            });
        record.daily_total += entry.amount;
        record.updated_at = entry.timestamp;
        record.entries.push(entry);
        Ok(record.clone())
    }

    async fn insert_weight(&self, record: WeightRecord) -> Result<WeightRecord, StoreError> {
        self.write()?.weight.push(record.clone());
        Ok(record)
    }

    async fn insert_sleep(&self, record: SleepRecord) -> Result<SleepRecord, StoreError> {
        self.write()?.sleep.push(record.clone());
        Ok(record)
    }

    async fn insert_meal(&self, record: MealRecord) -> Result<MealRecord, StoreError> {
        self.write()?.meals.push(record.clone());
        Ok(record)
    }

    async fn water_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<WaterRecord>, StoreError> {
        let tables = self.read()?;
        let mut records: Vec<WaterRecord> = tables
            .water
            .values()
            .filter(|r| r.user_id == user_id && range.contains(r.date))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn weight_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<WeightRecord>, StoreError> {
        let tables = self.read()?;
        let mut records = select(&tables.weight, user_id, range, |r| r.user_id.as_str(), |r| r.date);
        records.sort_by_key(|r| (r.date, r.recorded_at));
        Ok(records)
    }

    async fn sleep_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<SleepRecord>, StoreError> {
        let tables = self.read()?;
        let mut records = select(&tables.sleep, user_id, range, |r| r.user_id.as_str(), |r| r.date);
        records.sort_by_key(|r| (r.date, r.start_time));
        Ok(records)
    }

    async fn meals_in_range(&self, user_id: &str, range: &DateRange) -> Result<Vec<MealRecord>, StoreError> {
        let tables = self.read()?;
        let mut records = select(&tables.meals, user_id, range, |r| r.user_id.as_str(), |r| r.date);
        records.sort_by_key(|r| (r.date, r.created_at));
        Ok(records)
    }

    async fn append_chat_messages(&self, user_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        self.write()?
            .chat
            .entry(user_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn chat_history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let tables = self.read()?;
        let transcript = match tables.chat.get(user_id) {
            Some(transcript) => transcript,
            None => return Ok(Vec::new()),
        };
        let skip = transcript.len().saturating_sub(limit);
        Ok(transcript[skip..].to_vec())
    }
}
