use actix_web::{web, HttpResponse};

use super::{query_metric, store_sample, AggregatorData, RecorderData};
use crate::middleware::auth::Claims;
use crate::models::error::AppError;
use crate::models::metrics::{MealRequest, MetricType};
use crate::models::query::MetricQuery;

#[tracing::instrument(
    name = "Record meal",
    skip(body, recorder, claims),
    fields(caller = %claims.sub)
)]
pub async fn record_meal(
    body: web::Json<MealRequest>,
    recorder: RecorderData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let sample = body.into_inner().validate()?;
    store_sample(sample, &recorder, &claims).await
}

#[tracing::instrument(
    name = "Get meals",
    skip(query, aggregator, claims),
    fields(caller = %claims.sub)
)]
pub async fn get_meals(
    query: web::Query<MetricQuery>,
    aggregator: AggregatorData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    query_metric(query.into_inner(), MetricType::Meal, &aggregator, &claims).await
}
