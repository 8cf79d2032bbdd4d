#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use orchestrator::config::Config;
use serde_json::{json, Value};
use warp::Filter;

pub const DIMENSIONS: usize = 3;

/// Call counts seen by the fake upstream, one per endpoint.
#[derive(Default)]
pub struct Hits {
    pub embeddings: AtomicUsize,
    pub query: AtomicUsize,
    pub completions: AtomicUsize,
}

impl Hits {
    pub fn total(&self) -> usize {
        self.embeddings.load(Ordering::SeqCst)
            + self.query.load(Ordering::SeqCst)
            + self.completions.load(Ordering::SeqCst)
    }
}

/// One process-local server standing in for both OpenAI and Pinecone.
pub struct FakeUpstream {
    pub matches: Value,
    pub answer: String,
    pub query_delay: Duration,
}

impl FakeUpstream {
    pub fn with_matches(matches: Value) -> Self {
        Self {
            matches,
            answer: "AACE is ...".to_string(),
            query_delay: Duration::ZERO,
        }
    }

    pub fn spawn(self) -> (SocketAddr, Arc<Hits>) {
        let hits = Arc::new(Hits::default());

        let embed_hits = hits.clone();
        let embeddings = warp::path!("v1" / "embeddings").map(move || {
            embed_hits.embeddings.fetch_add(1, Ordering::SeqCst);
            warp::reply::json(&json!({ "data": [{ "embedding": vec![0.25f32; DIMENSIONS] }] }))
        });

        let query_hits = hits.clone();
        let matches = self.matches;
        let delay = self.query_delay;
        let query = warp::path!("query").and_then(move || {
            query_hits.query.fetch_add(1, Ordering::SeqCst);
            let body = json!({ "matches": matches.clone() });
            async move {
                tokio::time::sleep(delay).await;
                Ok::<_, warp::Rejection>(warp::reply::json(&body))
            }
        });

        let chat_hits = hits.clone();
        let answer = self.answer;
        let completions = warp::path!("v1" / "chat" / "completions").map(move || {
            chat_hits.completions.fetch_add(1, Ordering::SeqCst);
            warp::reply::json(&json!({
                "choices": [{ "index": 0, "message": { "role": "assistant", "content": answer } }]
            }))
        });

        let routes = warp::post().and(embeddings.or(query).or(completions));
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        (addr, hits)
    }
}

pub fn config_for(addr: SocketAddr, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("PINECONE_API_KEY".to_string(), "pc-key".to_string()),
        ("PINECONE_HOST".to_string(), format!("http://{}", addr)),
        ("PINECONE_INDEX".to_string(), "aace-test".to_string()),
        ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        ("OPENAI_BASE_URL".to_string(), format!("http://{}/v1", addr)),
        ("EMBEDDING_DIMENSIONS".to_string(), DIMENSIONS.to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config is valid")
}
