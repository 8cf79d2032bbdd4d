use thiserror::Error;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

/// Failure talking to one upstream HTTP dependency.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpFailure {
    /// Nothing came back: connect failure, reset, or timeout.
    #[error("no response received: {message}")]
    NoResponse { message: String, timed_out: bool },

    /// The dependency answered with a non-2xx status.
    #[error("error response (HTTP {status}): {body}")]
    ErrorResponse { status: u16, body: String },

    #[error("malformed response: {message}")]
    Malformed { message: String },
}

impl From<reqwest::Error> for HttpFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HttpFailure::Malformed {
                message: err.to_string(),
            }
        } else {
            HttpFailure::NoResponse {
                timed_out: err.is_timeout(),
                message: err.to_string(),
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Embedding provider failure: {0}")]
    Upstream(#[from] HttpFailure),

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    #[error("Invalid vector query: {0}")]
    InvalidRequest(String),

    #[error("Vector store failure: {0}")]
    Upstream(#[from] HttpFailure),
}

impl RetrievalError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RetrievalError::Upstream(HttpFailure::NoResponse {
                timed_out: true,
                ..
            })
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("Language model failure: {0}")]
    Upstream(#[from] HttpFailure),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl Reject for ApiError {}

pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing your query";

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    let (code, body) = if let Some(api_err) = err.find::<ApiError>() {
        match api_err {
            ApiError::Pipeline(PipelineError::Validation(message)) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": message }),
            ),
            ApiError::Pipeline(pipeline_err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": INTERNAL_ERROR_MESSAGE,
                    "details": pipeline_err.to_string(),
                }),
            ),
        }
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": format!("Invalid request body: {}", body_err) }),
        )
    } else {
        return Err(err);
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}
