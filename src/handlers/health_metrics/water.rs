use actix_web::{web, HttpResponse};

use super::{query_metric, store_sample, AggregatorData, RecorderData};
use crate::middleware::auth::Claims;
use crate::models::error::AppError;
use crate::models::metrics::{MetricType, WaterRequest};
use crate::models::query::MetricQuery;

#[tracing::instrument(
    name = "Record water intake",
    skip(body, recorder, claims),
    fields(caller = %claims.sub)
)]
pub async fn record_water(
    body: web::Json<WaterRequest>,
    recorder: RecorderData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let sample = body.into_inner().validate()?;
    store_sample(sample, &recorder, &claims).await
}

#[tracing::instrument(
    name = "Get water intake",
    skip(query, aggregator, claims),
    fields(caller = %claims.sub)
)]
pub async fn get_water(
    query: web::Query<MetricQuery>,
    aggregator: AggregatorData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    query_metric(query.into_inner(), MetricType::Water, &aggregator, &claims).await
}
