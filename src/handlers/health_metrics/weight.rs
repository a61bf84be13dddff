use actix_web::{web, HttpResponse};

use super::{query_metric, store_sample, AggregatorData, RecorderData};
use crate::middleware::auth::Claims;
use crate::models::error::AppError;
use crate::models::metrics::{MetricType, WeightRequest};
use crate::models::query::MetricQuery;

#[tracing::instrument(
    name = "Record weight",
    skip(body, recorder, claims),
    fields(caller = %claims.sub)
)]
pub async fn record_weight(
    body: web::Json<WeightRequest>,
    recorder: RecorderData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let sample = body.into_inner().validate()?;
    store_sample(sample, &recorder, &claims).await
}

#[tracing::instrument(
    name = "Get weight",
    skip(query, aggregator, claims),
    fields(caller = %claims.sub)
)]
pub async fn get_weight(
    query: web::Query<MetricQuery>,
    aggregator: AggregatorData,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    query_metric(query.into_inner(), MetricType::Weight, &aggregator, &claims).await
}
