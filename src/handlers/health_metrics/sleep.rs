use actix_web::{web, HttpResponse};

use super::{query_metric, store_sample, AggregatorData, RecorderData};
use crate::middleware::auth::Claims;
use crate::models::error::AppError;
use crate::models::metrics::{MetricType, SleepRequest};
use crate::models::query::MetricQuery;

/// Duration is derived here; an end before the start is rejected with 400.
#[tracing::instrument(
    name = "Record sleep",
    skip(body, recorder, claims),
    fields(caller = %claims.sub)
)]
pub async fn record_sleep(
    body: web::Json<SleepRequest>,
    recorder: RecorderData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let sample = body.into_inner().validate()?;
    store_sample(sample, &recorder, &claims).await
}

#[tracing::instrument(
    name = "Get sleep",
    skip(query, aggregator, claims),
    fields(caller = %claims.sub)
)]
pub async fn get_sleep(
    query: web::Query<MetricQuery>,
    aggregator: AggregatorData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    query_metric(query.into_inner(), MetricType::Sleep, &aggregator, &claims).await
}
