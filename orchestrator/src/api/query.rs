use std::sync::Arc;

use warp::{Rejection, Reply};

use crate::error::ApiError;
use crate::models::QueryRequest;
use crate::pipeline::QueryPipeline;

pub async fn handle_query(
    request: QueryRequest,
    pipeline: Arc<QueryPipeline>,
) -> Result<impl Reply, Rejection> {
    let response = pipeline
        .run(request.query.as_deref())
        .await
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    Ok(warp::reply::json(&response))
}
