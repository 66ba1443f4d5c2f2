//! Модуль интеграции с chat-completions API
//!
//! Этот модуль содержит реализацию генератора текста комментария поверх
//! OpenAI-совместимого chat-completions API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::{Result, SportcastError};
use crate::generation::{parse_generation_reply, GenerationRequest, TextGenerator};

// Chat message structure for the completions API
#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

const SYSTEM_PROMPT: &str = "\
You are a seasoned, passionate play-by-play commentator with tactical insight. \
Turn the scheduled event chain into vivid spoken commentary. Style rules: \
be a storyteller, not an announcer; connect actions by cause and effect; use \
short TTS-friendly sentences. Special markers: on [Summary] give one sentence \
summing up the exchange instead of listing every shot; on [Intro] open the \
broadcast briefly; on [Gap] talk about the players' state, never invent new \
shots; on [Outro] wrap up the rally and its result; on [Replay] analyze the \
technique in a professional, admiring tone. Hard prohibitions: never announce \
a score before a [Score] entry appears; never chain actions with bare \
'then... then...'; the constraint of each item is a physical speech budget, \
prefer saying less over overrunning it. Reply with a pure JSON array of \
objects with exactly two fields: id and text. No markdown, no explanations.";

/// Клиент генерации комментария поверх chat-completions API
pub struct OpenAiGenerator {
    client: Client,
    config: GenerationConfig,
}

impl OpenAiGenerator {
    /// Создать генератор с указанной конфигурацией
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Собрать пользовательское сообщение запроса
    fn build_user_message(&self, request: &GenerationRequest) -> Result<String> {
        let items_json = serde_json::to_string_pretty(&request.items)?;

        let history = request
            .history_context
            .as_deref()
            .unwrap_or("This is the first segment of the match; start fresh.");

        Ok(format!(
            "Match background (use it to name the players correctly):\n{}\n\n\
             Previous segments (inherit their tone and momentum):\n{}\n\n\
             Video segment locator: {}\n\n\
             Scheduled commentary slots:\n{}\n\n\
             Return the JSON array:",
            request.intro, history, request.video_uri, items_json
        ))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<HashMap<String, String>> {
        if self.config.api_key.trim().is_empty() {
            return Err(SportcastError::Configuration(
                "API key is required for text generation".to_string(),
            ));
        }

        if request.items.is_empty() {
            return Ok(HashMap::new());
        }

        info!(
            "Requesting commentary for {} slots from {}",
            request.items.len(),
            self.config.model.as_str()
        );

        let chat_request = ChatRequest {
            model: self.config.model.as_str().to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: self.build_user_message(request)?,
                },
            ],
            temperature: self.config.temperature,
        };

        debug!("Sending generation request to {}", self.config.endpoint);
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Generation API error: HTTP {}, body: {}", status, error_text);
            return Err(SportcastError::Generation(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletion = response.json().await?;
        let reply = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| SportcastError::Generation("empty choices in reply".to_string()))?;

        debug!("Received generation reply ({} bytes)", reply.len());
        parse_generation_reply(reply)
    }
}
