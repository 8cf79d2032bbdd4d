use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UNKNOWN_SOURCE: &str = "Unknown source";

pub const NO_MATCHES_ANSWER: &str =
    "I couldn't find any relevant information to answer your question.";

/// One nearest-neighbour hit from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: MatchMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// API Request/Response models
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    pub score: f64,
    pub id: String,
    pub source: String,
}

impl From<Match> for Source {
    fn from(m: Match) -> Self {
        Source {
            text: m.metadata.text,
            score: m.score,
            id: m.id,
            source: m
                .metadata
                .source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub config: HealthConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthConfig {
    pub pinecone_host: String,
    pub pinecone_index: String,
    pub pinecone_api_key_provided: bool,
    pub openai_api_key_provided: bool,
}
