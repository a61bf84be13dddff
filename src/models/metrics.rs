use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::Display;
use uuid::Uuid;

use crate::models::error::AppError;
use crate::utils::dates::{local_now, local_today, parse_date, parse_timestamp};

pub const LBS_TO_KG: f64 = 0.453_592_37;
const MAX_MEAL_NAME_LEN: usize = 200;
/// Largest single drink accepted, in ml.
pub const MAX_WATER_AMOUNT: f64 = 20_000.0;
/// Upper bound for a weight reading, whatever the unit.
pub const MAX_WEIGHT: f64 = 1_500.0;
/// Largest single meal accepted, in kcal.
pub const MAX_MEAL_CALORIES: f64 = 20_000.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Water,
    Weight,
    Sleep,
    Meal,
}

impl MetricType {
    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::Water => "ml",
            MetricType::Weight => "kg",
            MetricType::Sleep => "hours",
            MetricType::Meal => "kcal",
        }
    }
}

impl Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricType::Water => "water",
            MetricType::Weight => "weight",
            MetricType::Sleep => "sleep",
            MetricType::Meal => "meal",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "kg" => Some(WeightUnit::Kg),
            "lbs" => Some(WeightUnit::Lbs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }

    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value * LBS_TO_KG,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

/// One drink logged towards a day's water total.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaterEntry {
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// The single water document for a (user, day).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WaterRecord {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub daily_total: f64,
    pub entries: Vec<WaterEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub id: Uuid,
    pub user_id: String,
    pub weight: f64,
    pub unit: WeightUnit,
    pub date: NaiveDate,
    pub recorded_at: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    pub id: Uuid,
    pub user_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Hours, rounded to two decimals.
    pub duration: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Any record the recorder can store, serialized as the record itself.
#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
pub enum StoredSample {
    Water(WaterRecord),
    Weight(WeightRecord),
    Sleep(SleepRecord),
    Meal(MealRecord),
}

impl StoredSample {
    pub fn metric_type(&self) -> MetricType {
        match self {
            StoredSample::Water(_) => MetricType::Water,
            StoredSample::Weight(_) => MetricType::Weight,
            StoredSample::Sleep(_) => MetricType::Sleep,
            StoredSample::Meal(_) => MetricType::Meal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub date: NaiveDate,
    pub image_url: Option<String>,
}

/// A request body that passed shape validation, one variant per metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricPayload {
    Water { amount: f64, date: NaiveDate },
    Weight { weight: f64, unit: WeightUnit, recorded_at: NaiveDateTime },
    Sleep { start_time: NaiveDateTime, end_time: NaiveDateTime },
    Meal(NewMeal),
}

/// Output of the per-endpoint validation step.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSample {
    pub user_id: String,
    pub payload: MetricPayload,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WaterRequest {
    pub user_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeightRequest {
    pub user_id: Option<String>,
    pub weight: Option<f64>,
    pub unit: Option<String>,
    pub recorded_at: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SleepRequest {
    pub user_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub meal_type: Option<String>,
    pub calories: Option<f64>,
    pub date: Option<String>,
    pub image_url: Option<String>,
}

/// Reject absent or blank user identifiers.
pub fn require_user_id(user_id: Option<String>) -> Result<String, AppError> {
    match user_id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(AppError::MissingParameter("userId")),
    }
}

fn optional_date(value: Option<String>) -> Result<NaiveDate, AppError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => parse_date("date", &raw),
        _ => Ok(local_today()),
    }
}

impl WaterRequest {
    pub fn validate(self) -> Result<ValidatedSample, AppError> {
        let user_id = require_user_id(self.user_id)?;
        let amount = self.amount.ok_or(AppError::MissingParameter("amount"))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::Validation("amount must be a positive number".to_string()));
        }
        if amount > MAX_WATER_AMOUNT {
            return Err(AppError::Validation(format!(
                "amount cannot exceed {} ml per entry",
                MAX_WATER_AMOUNT
            )));
        }
        let date = optional_date(self.date)?;

        Ok(ValidatedSample {
            user_id,
            payload: MetricPayload::Water { amount, date },
        })
    }
}

impl WeightRequest {
    pub fn validate(self) -> Result<ValidatedSample, AppError> {
        let user_id = require_user_id(self.user_id)?;
        let weight = self.weight.ok_or(AppError::MissingParameter("weight"))?;
        if !weight.is_finite() || weight <= 0.0 {
            return Err(AppError::Validation("weight must be a positive number".to_string()));
        }
        if weight > MAX_WEIGHT {
            return Err(AppError::Validation(format!("weight cannot exceed {}", MAX_WEIGHT)));
        }
        let unit = self.unit.ok_or(AppError::MissingParameter("unit"))?;
        let unit = WeightUnit::parse(&unit)
            .ok_or_else(|| AppError::Validation("unit must be one of: kg, lbs".to_string()))?;
        let recorded_at = match self.recorded_at {
            Some(raw) => parse_timestamp("recordedAt", &raw)?,
            None => local_now(),
        };

        Ok(ValidatedSample {
            user_id,
            payload: MetricPayload::Weight { weight, unit, recorded_at },
        })
    }
}

impl SleepRequest {
    /// Only the shape is checked here; ordering of the two timestamps is
    /// enforced when the duration is derived.
    pub fn validate(self) -> Result<ValidatedSample, AppError> {
        let user_id = require_user_id(self.user_id)?;
        let start_time = self.start_time.ok_or(AppError::MissingParameter("startTime"))?;
        let end_time = self.end_time.ok_or(AppError::MissingParameter("endTime"))?;

        Ok(ValidatedSample {
            user_id,
            payload: MetricPayload::Sleep {
                start_time: parse_timestamp("startTime", &start_time)?,
                end_time: parse_timestamp("endTime", &end_time)?,
            },
        })
    }
}

impl MealRequest {
    pub fn validate(self) -> Result<ValidatedSample, AppError> {
        let user_id = require_user_id(self.user_id)?;
        let name = self
            .name
            .map(|n| n.trim().chars().filter(|&c| c != '\0').collect::<String>())
            .filter(|n| !n.is_empty())
            .ok_or(AppError::MissingParameter("name"))?;
        if name.chars().count() > MAX_MEAL_NAME_LEN {
            return Err(AppError::Validation(format!(
                "name cannot exceed {} characters",
                MAX_MEAL_NAME_LEN
            )));
        }
        let meal_type = self.meal_type.ok_or(AppError::MissingParameter("mealType"))?;
        let meal_type = MealType::parse(&meal_type).ok_or_else(|| {
            AppError::Validation("mealType must be one of: breakfast, lunch, dinner, snack".to_string())
        })?;
        let calories = self.calories.ok_or(AppError::MissingParameter("calories"))?;
        if !calories.is_finite() || calories < 0.0 {
            return Err(AppError::Validation("calories must be zero or a positive number".to_string()));
        }
        if calories > MAX_MEAL_CALORIES {
            return Err(AppError::Validation(format!(
                "calories cannot exceed {} per meal",
                MAX_MEAL_CALORIES
            )));
        }
        let date = optional_date(self.date)?;
        let image_url = self.image_url.filter(|url| !url.trim().is_empty());

        Ok(ValidatedSample {
            user_id,
            payload: MetricPayload::Meal(NewMeal {
                name,
                meal_type,
                calories,
                date,
                image_url,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water(user_id: Option<&str>, amount: Option<f64>, date: Option<&str>) -> WaterRequest {
        WaterRequest {
            user_id: user_id.map(String::from),
            amount,
            date: date.map(String::from),
        }
    }

    #[test]
    fn water_requires_user_and_amount() {
        assert!(matches!(
            water(None, Some(250.0), None).validate(),
            Err(AppError::MissingParameter("userId"))
        ));
        assert!(matches!(
            water(Some("   "), Some(250.0), None).validate(),
            Err(AppError::MissingParameter("userId"))
        ));
        assert!(matches!(
            water(Some("user_1"), None, None).validate(),
            Err(AppError::MissingParameter("amount"))
        ));
    }

    #[test]
    fn water_amount_must_be_positive() {
        assert!(matches!(
            water(Some("user_1"), Some(0.0), None).validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            water(Some("user_1"), Some(-20.0), None).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn oversized_values_are_rejected() {
        let err = water(Some("user_1"), Some(1e308), None).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("amount cannot exceed"));
        assert!(water(Some("user_1"), Some(MAX_WATER_AMOUNT), None).validate().is_ok());

        let request = WeightRequest {
            user_id: Some("user_1".into()),
            weight: Some(MAX_WEIGHT + 1.0),
            unit: Some("kg".into()),
            recorded_at: None,
        };
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));

        let request = MealRequest {
            user_id: Some("user_1".into()),
            name: Some("Feast".into()),
            meal_type: Some("dinner".into()),
            calories: Some(1e300),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn water_date_defaults_to_today() {
        let sample = water(Some("user_1"), Some(300.0), None).validate().unwrap();
        match sample.payload {
            MetricPayload::Water { amount, date } => {
                assert_eq!(amount, 300.0);
                assert_eq!(date, local_today());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn weight_unit_is_restricted() {
        let request = WeightRequest {
            user_id: Some("user_1".into()),
            weight: Some(70.0),
            unit: Some("stone".into()),
            recorded_at: None,
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("kg, lbs"));

        let request = WeightRequest {
            user_id: Some("user_1".into()),
            weight: Some(154.0),
            unit: Some("LBS".into()),
            recorded_at: Some("2024-03-01T07:30".into()),
        };
        let sample = request.validate().unwrap();
        assert!(matches!(sample.payload, MetricPayload::Weight { unit: WeightUnit::Lbs, .. }));
    }

    #[test]
    fn sleep_requires_both_timestamps() {
        let request = SleepRequest {
            user_id: Some("user_1".into()),
            start_time: Some("2024-01-01T22:00".into()),
            end_time: None,
        };
        assert!(matches!(request.validate(), Err(AppError::MissingParameter("endTime"))));
    }

    #[test]
    fn meal_type_and_calories_are_checked() {
        let request = MealRequest {
            user_id: Some("user_1".into()),
            name: Some("Oatmeal".into()),
            meal_type: Some("brunch".into()),
            calories: Some(350.0),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));

        let request = MealRequest {
            user_id: Some("user_1".into()),
            name: Some("  Oatmeal ".into()),
            meal_type: Some("Breakfast".into()),
            calories: Some(350.0),
            date: Some("2024-05-02".into()),
            image_url: Some("".into()),
        };
        let sample = request.validate().unwrap();
        match sample.payload {
            MetricPayload::Meal(meal) => {
                assert_eq!(meal.name, "Oatmeal");
                assert_eq!(meal.meal_type, MealType::Breakfast);
                assert_eq!(meal.image_url, None);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn pounds_convert_to_kilograms() {
        assert!((WeightUnit::Lbs.to_kg(100.0) - 45.359237).abs() < 1e-9);
        assert_eq!(WeightUnit::Kg.to_kg(70.0), 70.0);
    }
}
