//! Record and query endpoints for the four tracked metrics.
//!
//! Every handler validates the raw body or query first, then checks that
//! the `userId` it names belongs to the authenticated caller.

use actix_web::{web, HttpResponse};

use crate::middleware::auth::Claims;
use crate::models::error::AppError;
use crate::models::metrics::{require_user_id, MetricType, ValidatedSample};
use crate::models::query::{MetricQuery, Period};
use crate::services::aggregator::MetricAggregator;
use crate::services::recorder::MetricRecorder;

pub mod water;
pub mod weight;
pub mod sleep;
pub mod meals;

async fn store_sample(
    sample: ValidatedSample,
    recorder: &MetricRecorder,
    claims: &Claims,
) -> Result<HttpResponse, AppError> {
    claims.ensure_owns(&sample.user_id)?;
    let stored = recorder.record(&sample.user_id, sample.payload).await?;
    Ok(HttpResponse::Created().json(stored))
}

async fn query_metric(
    query: MetricQuery,
    metric: MetricType,
    aggregator: &MetricAggregator,
    claims: &Claims,
) -> Result<HttpResponse, AppError> {
    // userId is checked before anything else so a missing id always wins
    let user_id = require_user_id(query.user_id)?;
    let period = Period::parse(query.period.as_deref())?;
    claims.ensure_owns(&user_id)?;

    let result = aggregator.query(&user_id, metric, period).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub(crate) type RecorderData = web::Data<MetricRecorder>;
pub(crate) type AggregatorData = web::Data<MetricAggregator>;
