//! OpenAI chat completion implementation.

use super::CompletionModel;
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument};

/// OpenAI-backed completion model.
///
/// Streamed and non-streamed delivery both assemble the full answer text;
/// streaming trades a single large response for incremental chunks on long
/// answers.
pub struct OpenAICompletion {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    streaming: bool,
}

impl OpenAICompletion {
    /// Create a completion model handle.
    pub fn new(model: &str, temperature: f32, streaming: bool) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
            streaming,
        }
    }

    fn build_request(
        &self,
        prompt: &str,
        stream: bool,
    ) -> Result<async_openai::types::CreateChatCompletionRequest> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| SvarError::Synthesis(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .stream(stream)
            .build()
            .map_err(|e| SvarError::Synthesis(e.to_string()))
    }
}

#[async_trait]
impl CompletionModel for OpenAICompletion {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.streaming {
            let request = self.build_request(prompt, true)?;
            let mut stream = self
                .client
                .chat()
                .create_stream(request)
                .await
                .map_err(|e| SvarError::OpenAI(format!("Completion API error: {}", e)))?;

            let mut answer = String::new();
            while let Some(chunk) = stream.next().await {
                let chunk =
                    chunk.map_err(|e| SvarError::OpenAI(format!("Stream error: {}", e)))?;
                if let Some(delta) = chunk
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.as_deref())
                {
                    answer.push_str(delta);
                }
            }

            if answer.is_empty() {
                return Err(SvarError::Synthesis("Empty response from LLM".to_string()));
            }
            debug!("Streamed completion of {} chars", answer.len());
            Ok(answer)
        } else {
            let request = self.build_request(prompt, false)?;
            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| SvarError::OpenAI(format!("Completion API error: {}", e)))?;

            response
                .choices
                .first()
                .and_then(|c| c.message.content.clone())
                .ok_or_else(|| SvarError::Synthesis("Empty response from LLM".to_string()))
        }
    }
}
