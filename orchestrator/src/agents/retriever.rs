// Retriever Agent: nearest-neighbour search against a Pinecone index

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::http::{build_client, post_json};
use super::VectorRetriever;
use crate::error::RetrievalError;
use crate::models::Match;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Option<Vec<Match>>,
}

pub struct RetrieverAgent {
    client: Client,
    query_url: String,
    api_key: String,
    dimensions: usize,
}

impl RetrieverAgent {
    pub fn new(
        host: &str,
        api_key: String,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            query_url: query_url(host),
            api_key,
            dimensions,
        })
    }
}

/// Index hosts are usually given bare (`my-index-abc.svc.pinecone.io`);
/// those are reached over HTTPS.
fn query_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/query", host)
    } else {
        format!("https://{}/query", host)
    }
}

#[async_trait]
impl VectorRetriever for RetrieverAgent {
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>, RetrievalError> {
        if vector.len() != self.dimensions {
            return Err(RetrievalError::InvalidRequest(format!(
                "vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        if top_k == 0 {
            return Err(RetrievalError::InvalidRequest(
                "topK must be at least 1".to_string(),
            ));
        }

        debug!("Retriever: querying {} for top {}", self.query_url, top_k);

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };
        let response: QueryResponse = post_json(
            self.client
                .post(&self.query_url)
                .header("Api-Key", &self.api_key),
            &request,
        )
        .await?;

        let matches = response.matches.unwrap_or_default();
        info!("Retriever: {} matches", matches.len());

        Ok(matches)
    }
}
