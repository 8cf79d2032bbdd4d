use async_trait::async_trait;

use crate::error::{EmbeddingError, RetrievalError, SynthesisError};
use crate::models::Match;

/// Serves a warp filter on an ephemeral localhost port for the rest of the
/// test and evaluates to its address.
#[cfg(test)]
macro_rules! spawn_upstream {
    ($routes:expr) => {{
        let (addr, server) = warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }};
}

pub mod context;
pub mod embedder;
mod http;
pub mod retriever;
pub mod synthesizer;

pub use context::ContextAssembler;
pub use embedder::EmbeddingAgent;
pub use retriever::RetrieverAgent;
pub use synthesizer::SynthesizerAgent;

/// Turns free text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Nearest-neighbour lookup against the vector store. Matches come back in
/// the store's ranking order.
#[async_trait]
pub trait VectorRetriever: Send + Sync {
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>, RetrievalError>;
}

#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn synthesize(&self, question: &str, context: &str) -> Result<String, SynthesisError>;
}
