use std::sync::Arc;

use crate::db::HealthStore;
use crate::models::error::AppError;
use crate::models::metrics::{
    MealRecord, MetricType, SleepRecord, StoredSample, WaterRecord, WeightRecord,
};
use crate::models::query::{MetricQueryResult, MetricSummary, Period};
use crate::utils::dates::local_today;

/// Reads stored samples for a period and summarises them in memory.
#[derive(Clone)]
pub struct MetricAggregator {
    store: Arc<dyn HealthStore>,
}

impl MetricAggregator {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(
        name = "Query metric samples",
        skip(self),
        fields(user_id = %user_id, metric = %metric)
    )]
    pub async fn query(
        &self,
        user_id: &str,
        metric: MetricType,
        period: Period,
    ) -> Result<MetricQueryResult, AppError> {
        let range = period.range_ending(local_today());

        let (samples, summary) = match metric {
            MetricType::Water => {
                let records = self.store.water_in_range(user_id, &range).await?;
                let summary = summarize_water(&records);
                (records.into_iter().map(StoredSample::Water).collect::<Vec<_>>(), summary)
            }
            MetricType::Weight => {
                let records = self.store.weight_in_range(user_id, &range).await?;
                let summary = summarize_weight(&records);
                (records.into_iter().map(StoredSample::Weight).collect(), summary)
            }
            MetricType::Sleep => {
                let records = self.store.sleep_in_range(user_id, &range).await?;
                let summary = summarize_sleep(&records);
                (records.into_iter().map(StoredSample::Sleep).collect(), summary)
            }
            MetricType::Meal => {
                let records = self.store.meals_in_range(user_id, &range).await?;
                let summary = summarize_meals(&records);
                (records.into_iter().map(StoredSample::Meal).collect(), summary)
            }
        };

        tracing::debug!("Found {} {} samples", summary.count, metric);

        Ok(MetricQueryResult {
            metric,
            period,
            samples,
            summary,
        })
    }
}

/// One value per day: the day's total.
pub fn summarize_water(records: &[WaterRecord]) -> MetricSummary {
    MetricSummary::from_values(MetricType::Water, records.iter().map(|r| r.daily_total))
}

/// Mixed units are normalised to kilograms.
pub fn summarize_weight(records: &[WeightRecord]) -> MetricSummary {
    MetricSummary::from_values(
        MetricType::Weight,
        records.iter().map(|r| r.unit.to_kg(r.weight)),
    )
}

pub fn summarize_sleep(records: &[SleepRecord]) -> MetricSummary {
    MetricSummary::from_values(MetricType::Sleep, records.iter().map(|r| r.duration))
}

pub fn summarize_meals(records: &[MealRecord]) -> MetricSummary {
    MetricSummary::from_values(MetricType::Meal, records.iter().map(|r| r.calories))
}
