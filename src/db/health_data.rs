use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::metrics::{
    MealRecord, MealType, SleepRecord, WaterEntry, WaterRecord, WeightRecord, WeightUnit,
};
use crate::models::query::DateRange;

#[derive(Debug, FromRow)]
struct WaterRow {
    id: Uuid,
    user_id: String,
    date: NaiveDate,
    daily_total: f64,
    entries: Json<Vec<WaterEntry>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WaterRow> for WaterRecord {
    fn from(row: WaterRow) -> Self {
        WaterRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            daily_total: row.daily_total,
            entries: row.entries.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct WeightRow {
    id: Uuid,
    user_id: String,
    weight: f64,
    unit: String,
    date: NaiveDate,
    recorded_at: NaiveDateTime,
    created_at: DateTime<Utc>,
}

impl TryFrom<WeightRow> for WeightRecord {
    type Error = StoreError;

    fn try_from(row: WeightRow) -> Result<Self, Self::Error> {
        let unit = WeightUnit::parse(&row.unit)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown weight unit '{}'", row.unit)))?;
        Ok(WeightRecord {
            id: row.id,
            user_id: row.user_id,
            weight: row.weight,
            unit,
            date: row.date,
            recorded_at: row.recorded_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MealRow {
    id: Uuid,
    user_id: String,
    name: String,
    meal_type: String,
    calories: f64,
    date: NaiveDate,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MealRow> for MealRecord {
    type Error = StoreError;

    fn try_from(row: MealRow) -> Result<Self, Self::Error> {
        let meal_type = MealType::parse(&row.meal_type)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown meal type '{}'", row.meal_type)))?;
        Ok(MealRecord {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            meal_type,
            calories: row.calories,
            date: row.date,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

/// Create or increment the water record for (user_id, date) in a single
/// statement, so concurrent increments cannot overwrite each other.
pub async fn upsert_water_intake(
    pool: &PgPool,
    user_id: &str,
    date: NaiveDate,
    entry: WaterEntry,
) -> Result<WaterRecord, StoreError> {
    let row = sqlx::query_as::<_, WaterRow>(
        r#"
        INSERT INTO water_intake (id, user_id, date, daily_total, entries, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        ON CONFLICT (user_id, date) DO UPDATE
        SET daily_total = water_intake.daily_total + EXCLUDED.daily_total,
            entries = water_intake.entries || EXCLUDED.entries,
            updated_at = EXCLUDED.updated_at
        RETURNING id, user_id, date, daily_total, entries, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(entry.amount)
    .bind(Json(vec![entry.clone()]))
    .bind(entry.timestamp)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

pub async fn insert_weight_entry(pool: &PgPool, record: &WeightRecord) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO weight_entries (id, user_id, weight, unit, date, recorded_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(record.weight)
    .bind(record.unit.as_str())
    .bind(record.date)
    .bind(record.recorded_at)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_sleep_entry(pool: &PgPool, record: &SleepRecord) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO sleep_entries (id, user_id, start_time, end_time, duration, date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(record.start_time)
    .bind(record.end_time)
    .bind(record.duration)
    .bind(record.date)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_meal_entry(pool: &PgPool, record: &MealRecord) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO meal_entries (id, user_id, name, meal_type, calories, date, image_url, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(&record.name)
    .bind(record.meal_type.as_str())
    .bind(record.calories)
    .bind(record.date)
    .bind(&record.image_url)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_water_intake(
    pool: &PgPool,
    user_id: &str,
    range: &DateRange,
) -> Result<Vec<WaterRecord>, StoreError> {
    let rows = sqlx::query_as::<_, WaterRow>(
        r#"
        SELECT id, user_id, date, daily_total, entries, created_at, updated_at
        FROM water_intake
        WHERE user_id = $1
            AND ($2::date IS NULL OR date >= $2)
            AND ($3::date IS NULL OR date <= $3)
        ORDER BY date ASC
        "#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(WaterRecord::from).collect())
}

pub async fn get_weight_entries(
    pool: &PgPool,
    user_id: &str,
    range: &DateRange,
) -> Result<Vec<WeightRecord>, StoreError> {
    let rows = sqlx::query_as::<_, WeightRow>(
        r#"
        SELECT id, user_id, weight, unit, date, recorded_at, created_at
        FROM weight_entries
        WHERE user_id = $1
            AND ($2::date IS NULL OR date >= $2)
            AND ($3::date IS NULL OR date <= $3)
        ORDER BY date ASC, recorded_at ASC
        "#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(WeightRecord::try_from).collect()
}

pub async fn get_sleep_entries(
    pool: &PgPool,
    user_id: &str,
    range: &DateRange,
) -> Result<Vec<SleepRecord>, StoreError> {
    let records = sqlx::query_as::<_, SleepRecord>(
        r#"
        SELECT id, user_id, start_time, end_time, duration, date, created_at
        FROM sleep_entries
        WHERE user_id = $1
            AND ($2::date IS NULL OR date >= $2)
            AND ($3::date IS NULL OR date <= $3)
        ORDER BY date ASC, start_time ASC
        "#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

pub async fn get_meal_entries(
    pool: &PgPool,
    user_id: &str,
    range: &DateRange,
) -> Result<Vec<MealRecord>, StoreError> {
    let rows = sqlx::query_as::<_, MealRow>(
        r#"
        SELECT id, user_id, name, meal_type, calories, date, image_url, created_at
        FROM meal_entries
        WHERE user_id = $1
            AND ($2::date IS NULL OR date >= $2)
            AND ($3::date IS NULL OR date <= $3)
        ORDER BY date ASC, created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MealRecord::try_from).collect()
}
