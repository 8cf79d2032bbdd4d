use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::config::Config;
use crate::error::handle_rejection;
use crate::middleware;
use crate::pipeline::QueryPipeline;

mod health;
mod index;
mod query;

/// Largest accepted `POST /api/query` body.
const MAX_QUERY_BODY_BYTES: u64 = 64 * 1024;

/// Every route the service exposes, with error recovery and CORS applied.
pub fn app(
    pipeline: Arc<QueryPipeline>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let index_route = warp::path::end()
        .and(warp::get())
        .map(index::handle_index);

    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_config(config))
        .map(health::handle_health);

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            let (buffer, content_type) = crate::metrics::render();
            warp::reply::with_header(buffer, "Content-Type", content_type)
        });

    let query_route = warp::path("api")
        .and(warp::path("query"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_QUERY_BODY_BYTES))
        .and(warp::body::json())
        .and(with_pipeline(pipeline))
        .and_then(query::handle_query)
        .with(warp::log("api"));

    index_route
        .or(health_route)
        .or(metrics_route)
        .or(query_route)
        .recover(handle_rejection)
        .with(middleware::cors())
}

fn with_pipeline(
    pipeline: Arc<QueryPipeline>,
) -> impl Filter<Extract = (Arc<QueryPipeline>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}

fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || config.clone())
}
