//! Replaying adapter for the `LlmClient` port.

use std::error::Error;
use std::sync::{Arc, Mutex};

use super::{next_output, split_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient};

/// Serves recorded LLM completions from a cassette.
pub struct ReplayingLlmClient {
    replayer: Option<Arc<Mutex<CassetteReplayer>>>,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer: Some(replayer) }
    }

    /// Create a replaying LLM client with no cassette. Panics when called.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { replayer: None }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        let output = next_output(self.replayer.as_ref(), "llm", "complete");
        let result: Result<CompletionResponse, Box<dyn Error + Send + Sync>> =
            match split_result(output) {
                Ok(value) => serde_json::from_value(value)
                    .map_err(|e| format!("llm::complete: failed to deserialize: {e}").into()),
                Err(err) => Err(err.as_str().unwrap_or("unknown error").into()),
            };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn client(outputs: Vec<serde_json::Value>) -> ReplayingLlmClient {
        let interactions = outputs
            .into_iter()
            .enumerate()
            .map(|(i, output)| Interaction {
                seq: i as u64,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette = Cassette { name: "llm".into(), recorded_at: Utc::now(), interactions };
        ReplayingLlmClient::new(Arc::new(Mutex::new(CassetteReplayer::new(&cassette))))
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "m".into(),
            system: None,
            prompt: "p".into(),
            max_tokens: 10,
            temperature: 0.0,
            json_mode: false,
        }
    }

    #[tokio::test]
    async fn replays_success_then_error() {
        let llm = client(vec![
            json!({"Ok": {"text": "hello", "prompt_tokens": 3, "completion_tokens": 1}}),
            json!({"Err": "rate limited"}),
        ]);

        let first = llm.complete(&request()).await.unwrap();
        assert_eq!(first.text, "hello");
        assert_eq!(first.prompt_tokens, 3);

        let second = llm.complete(&request()).await.unwrap_err();
        assert_eq!(second.to_string(), "rate limited");
    }

    #[tokio::test]
    async fn malformed_recording_is_an_error() {
        let llm = client(vec![json!({"Ok": {"unexpected": true}})]);
        let err = llm.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("failed to deserialize"));
    }
}
