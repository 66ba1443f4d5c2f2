//! Модуль генерации текста комментария
//!
//! Сервис генерации — внешний сотрудник с узким контрактом: на вход
//! упорядоченный список `{id, constraint, content}` плюс свободный
//! контекст (история, фон матча, локатор видео), на выход список
//! `{id, text}`. Ответы моделей бывают обернуты в markdown-ограждения,
//! которые нужно снять до разбора JSON.

pub mod openai;

pub use openai::OpenAiGenerator;

use std::collections::HashMap;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SportcastError};

lazy_static! {
    static ref JSON_ARRAY: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
}

/// Один слот в запросе генерации
#[derive(Debug, Clone, Serialize)]
pub struct GenerationItem {
    /// Идентификатор слота, по которому сопоставляется ответ
    pub id: String,
    /// Человекочитаемое ограничение бюджета слогов
    pub constraint: String,
    /// Описание событий либо директива особого слота
    pub content: String,
}

/// Запрос генерации текста для всех слотов одного сегмента
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Локатор видео сегмента
    pub video_uri: String,
    /// Фоновое описание матча
    pub intro: String,
    /// Контекст из истории предыдущих сегментов
    pub history_context: Option<String>,
    /// Упорядоченные слоты
    pub items: Vec<GenerationItem>,
}

/// Сервис генерации текста комментария
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Сгенерировать текст для слотов запроса
    ///
    /// Возвращает отображение id слота в текст. Отсутствующие id не
    /// считаются ошибкой: соответствующие слоты будут пропущены сборкой.
    async fn generate(&self, request: &GenerationRequest) -> Result<HashMap<String, String>>;
}

/// Строка ответа модели; id приходит то числом, то строкой
#[derive(Debug, Deserialize)]
struct ReplyLine {
    id: serde_json::Value,
    text: String,
}

/// Нормализация id ответа к строковой форме
fn normalize_id(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Разбор ответа модели в отображение id -> текст
///
/// Markdown-ограждения и пояснения вокруг JSON снимаются выделением
/// первого массива в ответе. Ответ без валидного JSON-массива — ошибка
/// уровня сегмента: сегмент пропускается, пакет продолжается.
pub fn parse_generation_reply(reply: &str) -> Result<HashMap<String, String>> {
    let trimmed = reply.trim();

    let payload = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        trimmed
    } else {
        JSON_ARRAY
            .find(trimmed)
            .map(|m| m.as_str())
            .ok_or_else(|| {
                SportcastError::Generation("reply contains no JSON array".to_string())
            })?
    };

    let lines: Vec<ReplyLine> = serde_json::from_str(payload)
        .map_err(|e| SportcastError::Generation(format!("invalid reply JSON: {}", e)))?;

    Ok(lines
        .into_iter()
        .map(|line| (normalize_id(&line.id), line.text))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json_array() {
        let reply = r#"[{"id": 0, "text": "первая"}, {"id": "outro", "text": "вторая"}]"#;
        let map = parse_generation_reply(reply).unwrap();
        assert_eq!(map.get("0").unwrap(), "первая");
        assert_eq!(map.get("outro").unwrap(), "вторая");
    }

    #[test]
    fn test_parse_strips_markdown_fencing() {
        let reply = "Here is the commentary:\n```json\n[{\"id\": 1, \"text\": \"好球\"}]\n```\n";
        let map = parse_generation_reply(reply).unwrap();
        assert_eq!(map.get("1").unwrap(), "好球");
    }

    #[test]
    fn test_parse_rejects_non_json_reply() {
        assert!(parse_generation_reply("I cannot help with that.").is_err());
        assert!(parse_generation_reply("```json\nnot an array\n```").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_array() {
        assert!(parse_generation_reply(r#"[{"id": 0}]"#).is_err());
    }
}
