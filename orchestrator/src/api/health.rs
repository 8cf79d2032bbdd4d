use std::sync::Arc;

use warp::Reply;

use crate::config::Config;
use crate::models::{HealthConfig, HealthResponse};

/// Reports which configuration is present. Never inspects upstream health.
pub fn handle_health(config: Arc<Config>) -> impl Reply {
    warp::reply::json(&HealthResponse {
        status: "ok",
        message: "Server is running",
        config: HealthConfig {
            pinecone_host: config.pinecone_host.clone(),
            pinecone_index: config.pinecone_index.clone(),
            pinecone_api_key_provided: !config.pinecone_api_key.is_empty(),
            openai_api_key_provided: !config.openai_api_key.is_empty(),
        },
    })
}
