// Query Orchestrator: embed -> retrieve -> assemble -> synthesize

use std::sync::Arc;

use tracing::{error, info, instrument, Span};
use uuid::Uuid;

use crate::agents::{
    AnswerSynthesizer, ContextAssembler, Embedder, EmbeddingAgent, RetrieverAgent,
    SynthesizerAgent, VectorRetriever,
};
use crate::config::Config;
use crate::error::PipelineError;
use crate::metrics::{record_outcome, STAGE_DURATION};
use crate::models::{QueryResponse, Source, NO_MATCHES_ANSWER};

pub const MISSING_QUERY_MESSAGE: &str = "Query is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Received,
    Embedding,
    Retrieving,
    NoMatches,
    Assembling,
    Synthesizing,
    Responded,
    Failed,
}

#[derive(Clone)]
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn VectorRetriever>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    assembler: ContextAssembler,
    top_k: usize,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Arc<dyn VectorRetriever>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
        assembler: ContextAssembler,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            retriever,
            synthesizer,
            assembler,
            top_k,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let embedder = EmbeddingAgent::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            config.embedding_model.clone(),
            config.embedding_dimensions,
            config.embed_timeout,
        )?;
        let retriever = RetrieverAgent::new(
            &config.pinecone_host,
            config.pinecone_api_key.clone(),
            config.embedding_dimensions,
            config.retrieval_timeout,
        )?;
        let synthesizer = SynthesizerAgent::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            config.chat_model.clone(),
            config.chat_temperature,
            config.synthesis_timeout,
        )?;

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(retriever),
            Arc::new(synthesizer),
            ContextAssembler::new(config.max_context_chars),
            config.top_k,
        ))
    }

    /// Runs one query end to end. A missing or blank query is rejected
    /// before any upstream call.
    #[instrument(skip(self, query), fields(request_id = %Uuid::new_v4(), state = tracing::field::Empty))]
    pub async fn run(&self, query: Option<&str>) -> Result<QueryResponse, PipelineError> {
        transition(QueryState::Received);

        let question = match query.map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => {
                record_outcome("invalid");
                return Err(PipelineError::Validation(MISSING_QUERY_MESSAGE.to_string()));
            }
        };
        info!("Processing query: {}", question);

        match self.answer(question).await {
            Ok(response) => {
                transition(QueryState::Responded);
                Ok(response)
            }
            Err(e) => {
                transition(QueryState::Failed);
                error!("Query failed: {}", e);
                record_outcome("failed");
                Err(e)
            }
        }
    }

    async fn answer(&self, question: &str) -> Result<QueryResponse, PipelineError> {
        transition(QueryState::Embedding);
        let vector = {
            let _timer = STAGE_DURATION.with_label_values(&["embed"]).start_timer();
            self.embedder.embed(question).await?
        };

        transition(QueryState::Retrieving);
        let matches = {
            let _timer = STAGE_DURATION.with_label_values(&["retrieve"]).start_timer();
            self.retriever.search(&vector, self.top_k).await?
        };

        if matches.is_empty() {
            transition(QueryState::NoMatches);
            record_outcome("no_matches");
            return Ok(QueryResponse {
                answer: NO_MATCHES_ANSWER.to_string(),
                sources: vec![],
            });
        }

        transition(QueryState::Assembling);
        let context = self.assembler.assemble(&matches);

        transition(QueryState::Synthesizing);
        let answer = {
            let _timer = STAGE_DURATION.with_label_values(&["synthesize"]).start_timer();
            self.synthesizer.synthesize(question, &context).await?
        };

        record_outcome("answered");
        Ok(QueryResponse {
            answer,
            sources: matches.into_iter().map(Source::from).collect(),
        })
    }
}

fn transition(state: QueryState) {
    Span::current().record("state", tracing::field::debug(state));
    info!(?state, "Query state changed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EmbeddingError, HttpFailure, RetrievalError, SynthesisError};
    use crate::models::{Match, MatchMetadata, UNKNOWN_SOURCE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeEmbedder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HttpFailure::ErrorResponse {
                    status: 429,
                    body: "rate limited".into(),
                }
                .into());
            }
            Ok(vec![0.0; 3])
        }
    }

    struct FakeRetriever {
        calls: AtomicUsize,
        top_k_seen: AtomicUsize,
        result: Result<Vec<Match>, RetrievalError>,
    }

    impl FakeRetriever {
        fn returning(result: Result<Vec<Match>, RetrievalError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                top_k_seen: AtomicUsize::new(0),
                result,
            }
        }
    }

    #[async_trait]
    impl VectorRetriever for FakeRetriever {
        async fn search(
            &self,
            _vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<Match>, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.top_k_seen.store(top_k, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct FakeSynthesizer {
        calls: AtomicUsize,
        last_context: Mutex<Option<String>>,
        fail: bool,
    }

    #[async_trait]
    impl AnswerSynthesizer for FakeSynthesizer {
        async fn synthesize(&self, _question: &str, context: &str) -> Result<String, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_context.lock().unwrap() = Some(context.to_string());
            if self.fail {
                return Err(HttpFailure::Malformed {
                    message: "no choices".into(),
                }
                .into());
            }
            Ok("AACE is ...".to_string())
        }
    }

    fn hit(id: &str, score: f64, text: &str, source: Option<&str>) -> Match {
        Match {
            id: id.into(),
            score,
            metadata: MatchMetadata {
                text: text.into(),
                source: source.map(String::from),
                ..Default::default()
            },
        }
    }

    fn pipeline(
        embedder: &Arc<FakeEmbedder>,
        retriever: &Arc<FakeRetriever>,
        synthesizer: &Arc<FakeSynthesizer>,
    ) -> QueryPipeline {
        QueryPipeline::new(
            embedder.clone(),
            retriever.clone(),
            synthesizer.clone(),
            ContextAssembler::default(),
            5,
        )
    }

    #[tokio::test]
    async fn answers_with_ranked_sources() {
        let embedder = Arc::new(FakeEmbedder::default());
        let retriever = Arc::new(FakeRetriever::returning(Ok(vec![
            hit("doc1", 0.92, "AACE is ...", None),
            hit("doc2", 0.71, "TCM Framework", Some("tcm.pdf")),
        ])));
        let synthesizer = Arc::new(FakeSynthesizer::default());

        let response = pipeline(&embedder, &retriever, &synthesizer)
            .run(Some("What is AACE?"))
            .await
            .unwrap();

        assert_eq!(response.answer, "AACE is ...");
        assert_eq!(
            response.sources,
            vec![
                Source {
                    text: "AACE is ...".into(),
                    score: 0.92,
                    id: "doc1".into(),
                    source: UNKNOWN_SOURCE.into(),
                },
                Source {
                    text: "TCM Framework".into(),
                    score: 0.71,
                    id: "doc2".into(),
                    source: "tcm.pdf".into(),
                },
            ]
        );
        assert_eq!(retriever.top_k_seen.load(Ordering::SeqCst), 5);
        assert_eq!(
            synthesizer.last_context.lock().unwrap().as_deref(),
            Some("AACE is ...\n\nTCM Framework")
        );
    }

    #[tokio::test]
    async fn blank_or_missing_query_touches_nothing() {
        let embedder = Arc::new(FakeEmbedder::default());
        let retriever = Arc::new(FakeRetriever::returning(Ok(vec![])));
        let synthesizer = Arc::new(FakeSynthesizer::default());
        let pipeline = pipeline(&embedder, &retriever, &synthesizer);

        for query in [None, Some(""), Some("  \n\t")] {
            let err = pipeline.run(query).await.unwrap_err();
            assert_eq!(
                err,
                PipelineError::Validation(MISSING_QUERY_MESSAGE.to_string())
            );
        }

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_matches_short_circuits() {
        let embedder = Arc::new(FakeEmbedder::default());
        let retriever = Arc::new(FakeRetriever::returning(Ok(vec![])));
        let synthesizer = Arc::new(FakeSynthesizer::default());

        let response = pipeline(&embedder, &retriever, &synthesizer)
            .run(Some("Unrelated question"))
            .await
            .unwrap();

        assert_eq!(response.answer, NO_MATCHES_ANSWER);
        assert!(response.sources.is_empty());
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn embedding_failure_stops_the_pipeline() {
        let embedder = Arc::new(FakeEmbedder {
            fail: true,
            ..Default::default()
        });
        let retriever = Arc::new(FakeRetriever::returning(Ok(vec![])));
        let synthesizer = Arc::new(FakeSynthesizer::default());

        let err = pipeline(&embedder, &retriever, &synthesizer)
            .run(Some("What is AACE?"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Embedding(_)));
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retrieval_failure_skips_synthesis() {
        let embedder = Arc::new(FakeEmbedder::default());
        let retriever = Arc::new(FakeRetriever::returning(Err(
            HttpFailure::NoResponse {
                message: "operation timed out".into(),
                timed_out: true,
            }
            .into(),
        )));
        let synthesizer = Arc::new(FakeSynthesizer::default());

        let err = pipeline(&embedder, &retriever, &synthesizer)
            .run(Some("What is AACE?"))
            .await
            .unwrap_err();

        match err {
            PipelineError::Retrieval(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn synthesis_failure_yields_no_partial_answer() {
        let embedder = Arc::new(FakeEmbedder::default());
        let retriever = Arc::new(FakeRetriever::returning(Ok(vec![hit(
            "doc1", 0.5, "text", None,
        )])));
        let synthesizer = Arc::new(FakeSynthesizer {
            fail: true,
            ..Default::default()
        });

        let err = pipeline(&embedder, &retriever, &synthesizer)
            .run(Some("What is AACE?"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Synthesis(_)));
    }
}
