use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::error::AppError;
use crate::models::metrics::{MetricType, StoredSample};

/// Reporting window for metric queries, anchored at "today".
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    #[default]
    None,
}

impl Period {
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(|v| v.trim().to_lowercase()) {
            None => Ok(Period::None),
            Some(v) => match v.as_str() {
                "" | "none" => Ok(Period::None),
                "daily" => Ok(Period::Daily),
                "weekly" => Ok(Period::Weekly),
                "monthly" => Ok(Period::Monthly),
                other => Err(AppError::Validation(format!(
                    "Unknown period '{}'. Use one of: daily, weekly, monthly, none",
                    other
                ))),
            },
        }
    }

    /// Inclusive calendar range ending on `today`.
    pub fn range_ending(&self, today: NaiveDate) -> DateRange {
        let days_back = match self {
            Period::Daily => 0,
            Period::Weekly => 6,
            Period::Monthly => 29,
            Period::None => return DateRange::unbounded(),
        };
        DateRange {
            start: Some(today - Duration::days(days_back)),
            end: Some(today),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self { start: None, end: None }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Query string accepted by every metric GET endpoint.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    pub user_id: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub count: usize,
    pub total: f64,
    /// `None` when nothing matched.
    pub average: Option<f64>,
    pub unit: &'static str,
}

impl MetricSummary {
    pub fn empty(metric: MetricType) -> Self {
        Self {
            count: 0,
            total: 0.0,
            average: None,
            unit: metric.unit(),
        }
    }

    /// Sum and mean over `values`.
    pub fn from_values(metric: MetricType, values: impl IntoIterator<Item = f64>) -> Self {
        let (count, total) = values
            .into_iter()
            .fold((0usize, 0.0f64), |(count, total), v| (count + 1, total + v));
        if count == 0 {
            return Self::empty(metric);
        }
        Self {
            count,
            total,
            average: Some(total / count as f64),
            unit: metric.unit(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQueryResult {
    pub metric: MetricType,
    pub period: Period,
    pub samples: Vec<StoredSample>,
    pub summary: MetricSummary,
}
