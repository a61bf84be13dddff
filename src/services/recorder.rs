use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::db::HealthStore;
use crate::models::error::AppError;
use crate::models::metrics::{
    MealRecord, MetricPayload, SleepRecord, StoredSample, WaterEntry, WeightRecord,
};
use crate::utils::dates::round2;

/// Writes validated metric samples, deriving computed fields first.
#[derive(Clone)]
pub struct MetricRecorder {
    store: Arc<dyn HealthStore>,
}

impl MetricRecorder {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(
        name = "Record metric sample",
        skip(self, payload),
        fields(user_id = %user_id)
    )]
    pub async fn record(&self, user_id: &str, payload: MetricPayload) -> Result<StoredSample, AppError> {
        let now = Utc::now();
        let stored = match payload {
            MetricPayload::Water { amount, date } => {
                let entry = WaterEntry { amount, timestamp: now };
                let record = self.store.upsert_water(user_id, date, entry).await?;
                tracing::info!(
                    "Water intake for {} now {} ml after +{} ml",
                    record.date, record.daily_total, amount
                );
                StoredSample::Water(record)
            }
            MetricPayload::Weight { weight, unit, recorded_at } => {
                let record = WeightRecord {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    weight,
                    unit,
                    date: recorded_at.date(),
                    recorded_at,
                    created_at: now,
                };
                StoredSample::Weight(self.store.insert_weight(record).await?)
            }
            MetricPayload::Sleep { start_time, end_time } => {
                let duration = sleep_duration_hours(start_time, end_time)?;
                let record = SleepRecord {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    start_time,
                    end_time,
                    duration,
                    date: end_time.date(),
                    created_at: now,
                };
                StoredSample::Sleep(self.store.insert_sleep(record).await?)
            }
            MetricPayload::Meal(meal) => {
                let record = MealRecord {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    name: meal.name,
                    meal_type: meal.meal_type,
                    calories: meal.calories,
                    date: meal.date,
                    image_url: meal.image_url,
                    created_at: now,
                };
                StoredSample::Meal(self.store.insert_meal(record).await?)
            }
        };

        tracing::info!("Stored {} sample", stored.metric_type());
        Ok(stored)
    }
}

/// Hours between two timestamps, rounded to two decimals.
///
/// `end_time` must be strictly after `start_time`.
pub fn sleep_duration_hours(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Result<f64, AppError> {
    if end_time <= start_time {
        return Err(AppError::InvalidRange(
            "endTime must be later than startTime".to_string(),
        ));
    }
    let seconds = (end_time - start_time).num_seconds() as f64;
    Ok(round2(seconds / 3600.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryHealthStore;
    use crate::models::metrics::WeightUnit;
    use crate::utils::dates::parse_timestamp;
    use chrono::NaiveDate;

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp("t", value).unwrap()
    }

    fn recorder() -> (MetricRecorder, Arc<InMemoryHealthStore>) {
        let store = Arc::new(InMemoryHealthStore::new());
        (MetricRecorder::new(store.clone()), store)
    }

    #[test]
    fn overnight_sleep_is_eight_hours() {
        let duration = sleep_duration_hours(ts("2024-01-01T22:00"), ts("2024-01-02T06:00")).unwrap();
        assert_eq!(duration, 8.0);
    }

    #[test]
    fn sleep_duration_rounds_to_two_decimals() {
        let duration = sleep_duration_hours(ts("2024-01-01T23:10"), ts("2024-01-02T06:30")).unwrap();
        assert_eq!(duration, 7.33);
    }

    #[test]
    fn inverted_or_empty_sleep_is_rejected() {
        assert!(matches!(
            sleep_duration_hours(ts("2024-01-02T06:00"), ts("2024-01-01T22:00")),
            Err(AppError::InvalidRange(_))
        ));
        assert!(matches!(
            sleep_duration_hours(ts("2024-01-01T22:00"), ts("2024-01-01T22:00")),
            Err(AppError::InvalidRange(_))
        ));
    }

    #[tokio::test]
    async fn water_total_is_the_sum_of_amounts() {
        let (recorder, _) = recorder();
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let amounts = [250.0, 330.5, 500.0, 125.25];

        let mut last = None;
        for amount in amounts {
            last = Some(
                recorder
                    .record("user_1", MetricPayload::Water { amount, date })
                    .await
                    .unwrap(),
            );
        }

        match last {
            Some(StoredSample::Water(record)) => {
                let expected: f64 = amounts.iter().sum();
                assert!((record.daily_total - expected).abs() < 1e-9);
                assert_eq!(record.entries.len(), amounts.len());
            }
            other => panic!("unexpected sample {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejected_sleep_is_not_stored() {
        let (recorder, store) = recorder();
        let result = recorder
            .record(
                "user_1",
                MetricPayload::Sleep {
                    start_time: ts("2024-01-02T06:00"),
                    end_time: ts("2024-01-01T22:00"),
                },
            )
            .await;
        assert!(result.is_err());

        let stored = store
            .sleep_in_range("user_1", &crate::models::query::DateRange::unbounded())
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn weight_date_comes_from_recorded_at() {
        let (recorder, _) = recorder();
        let sample = recorder
            .record(
                "user_1",
                MetricPayload::Weight {
                    weight: 72.4,
                    unit: WeightUnit::Kg,
                    recorded_at: ts("2024-02-03T07:15"),
                },
            )
            .await
            .unwrap();
        match sample {
            StoredSample::Weight(record) => {
                assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
                assert_eq!(record.weight, 72.4);
            }
            other => panic!("unexpected sample {:?}", other),
        }
    }
}
