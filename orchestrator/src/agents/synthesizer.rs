// Synthesizer Agent: grounded answer generation over retrieved context

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{build_client, post_json};
use super::AnswerSynthesizer;
use crate::error::{HttpFailure, SynthesisError};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions using only the \
provided context. If the answer is not contained in the context, say that you don't know. \
Do not make up information.";

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct SynthesizerAgent {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl SynthesizerAgent {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
            temperature,
        })
    }
}

fn user_prompt(question: &str, context: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context, question)
}

#[async_trait]
impl AnswerSynthesizer for SynthesizerAgent {
    async fn synthesize(&self, question: &str, context: &str) -> Result<String, SynthesisError> {
        debug!(
            "Synthesizer: {} context chars with {}",
            context.len(),
            self.model
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(user_prompt(question, context)),
                },
            ],
            temperature: self.temperature,
        };
        let response: ChatResponse = post_json(
            self.client.post(&self.endpoint).bearer_auth(&self.api_key),
            &request,
        )
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                HttpFailure::Malformed {
                    message: "completion has no message content".to_string(),
                }
                .into()
            })
    }
}
