//! Модуль обработки ошибок библиотеки sportcast
//!
//! Этот модуль содержит типы ошибок, которые могут возникнуть при работе библиотеки.

use thiserror::Error;

/// Ошибки библиотеки sportcast
#[derive(Debug, Error)]
pub enum SportcastError {
    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ошибка чтения документа событий
    #[error("Event document error: {0}")]
    EventDocument(String),

    /// Ошибка планирования слотов комментария
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// Ошибка генерации текста
    #[error("Text generation error: {0}")]
    Generation(String),

    /// Ошибка обработки видео
    #[error("Video processing error: {0}")]
    VideoProcessing(String),

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Файл не найден
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Неверный формат
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Другая ошибка
    #[error("Other error: {0}")]
    Other(String),
}

impl From<&str> for SportcastError {
    fn from(s: &str) -> Self {
        SportcastError::Other(s.to_string())
    }
}

impl From<String> for SportcastError {
    fn from(s: String) -> Self {
        SportcastError::Other(s)
    }
}

/// Тип Result для библиотеки sportcast
pub type Result<T> = std::result::Result<T, SportcastError>;
