//! Модуль разбора документов событий
//!
//! Этап анализа видео выдает по одному JSON-документу на сегмент: локатор
//! видео, опциональное фоновое описание матча и упорядоченный массив
//! записей событий. В зависимости от версии восходящего конвейера массив
//! бывает плоским либо с одним уровнем вложенности (временной фрагмент,
//! содержащий внутренний массив `events`) — принимаются обе формы.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SportcastError};
use crate::timecode;

/// Категория обнаруженного действия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Подача (начало розыгрыша)
    Serve,
    /// Подготовительное действие
    Setup,
    /// Нейтральный обмен ударами
    Exchange,
    /// Атакующий удар
    Offense,
    /// Защитное действие
    Defense,
    /// Выигрыш очка
    Score,
    /// Нарушение правил
    Foul,
    /// Начало эпизода
    Start,
    /// Конец эпизода
    End,
    /// Неопознанная категория
    General,
}

impl EventCategory {
    /// Сопоставление текстовой метки категории из восходящего потока
    ///
    /// Имена меток различаются между версиями конвейера (Attack/Smash,
    /// Defend), неизвестные метки не считаются ошибкой.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "serve" => Self::Serve,
            "setup" => Self::Setup,
            "exchange" | "rally" => Self::Exchange,
            "offense" | "attack" | "smash" => Self::Offense,
            "defense" | "defend" => Self::Defense,
            "score" => Self::Score,
            "foul" => Self::Foul,
            "start" => Self::Start,
            "end" => Self::End,
            _ => Self::General,
        }
    }

    /// Получить строковое представление категории
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serve => "Serve",
            Self::Setup => "Setup",
            Self::Exchange => "Exchange",
            Self::Offense => "Offense",
            Self::Defense => "Defense",
            Self::Score => "Score",
            Self::Foul => "Foul",
            Self::Start => "Start",
            Self::End => "End",
            Self::General => "General",
        }
    }

    /// Категория нейтрального обмена (учитывается при сворачивании в сводку)
    pub fn is_exchange(&self) -> bool {
        matches!(self, Self::Exchange)
    }
}

/// Одно атомарное обнаруженное действие
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Начало действия (сек от начала сегмента)
    pub start: f64,
    /// Конец действия, если восходящий поток его дал
    pub end: Option<f64>,
    /// Исполнитель действия
    pub player: String,
    /// Описание действия
    pub action: String,
    /// Дополнительная деталь
    pub detail: Option<String>,
    /// Категория действия
    pub category: EventCategory,
    /// Обязательное для озвучивания событие
    pub is_crucial: bool,
}

impl RawEvent {
    /// Текстовое описание события для промпта генерации
    pub fn description(&self) -> String {
        match &self.detail {
            Some(detail) if !detail.is_empty() => format!(
                "[{}] {} - {} ({})",
                self.category.as_str(),
                self.player,
                self.action,
                detail
            ),
            _ => format!("[{}] {} - {}", self.category.as_str(), self.player, self.action),
        }
    }
}

/// Документ событий одного сегмента
#[derive(Debug, Clone)]
pub struct EventDocument {
    /// Локатор видео сегмента (непрозрачный для библиотеки)
    pub video_uri: String,
    /// Фоновое описание матча (состав, счет, контекст)
    pub intro: Option<String>,
    /// Упорядоченные события сегмента
    pub events: Vec<RawEvent>,
}

/// Сырая запись события; поле `events` покрывает вложенную форму
#[derive(Debug, Deserialize)]
struct RawEventRecord {
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(alias = "subject")]
    player: Option<String>,
    action: Option<String>,
    detail: Option<String>,
    category: Option<String>,
    #[serde(default)]
    is_crucial: bool,
    #[serde(default)]
    events: Vec<RawEventRecord>,
}

#[derive(Debug, Deserialize)]
struct EventDocumentRecord {
    #[serde(alias = "video_uri")]
    segment_video_uri: Option<String>,
    intro: Option<String>,
    #[serde(default)]
    events: Vec<RawEventRecord>,
}

/// Преобразование сырой записи в типизированное событие
fn convert_record(record: &RawEventRecord) -> RawEvent {
    let start = record
        .start_time
        .as_deref()
        .map(timecode::parse)
        .unwrap_or(0.0);

    // Нулевая метка конца означает отсутствие данных
    let end = record
        .end_time
        .as_deref()
        .map(timecode::parse)
        .filter(|&sec| sec > 0.0);

    let category = record
        .category
        .as_deref()
        .map(EventCategory::from_label)
        .unwrap_or(EventCategory::General);

    RawEvent {
        start,
        end,
        player: record.player.clone().unwrap_or_else(|| "player".to_string()),
        action: record.action.clone().unwrap_or_default(),
        detail: record.detail.clone().filter(|d| !d.is_empty()),
        category,
        is_crucial: record.is_crucial,
    }
}

/// Разворачивание записей: плоская запись дает одно событие, запись
/// фрагмента — события из внутреннего массива
fn flatten_records(records: &[RawEventRecord], out: &mut Vec<RawEvent>) {
    for record in records {
        if record.events.is_empty() {
            out.push(convert_record(record));
        } else {
            for inner in &record.events {
                out.push(convert_record(inner));
            }
        }
    }
}

/// Разбор документа событий из строки JSON
pub fn parse_document(json: &str) -> Result<EventDocument> {
    let record: EventDocumentRecord = serde_json::from_str(json)
        .map_err(|e| SportcastError::EventDocument(format!("invalid event JSON: {}", e)))?;

    let mut events = Vec::new();
    flatten_records(&record.events, &mut events);

    Ok(EventDocument {
        video_uri: record.segment_video_uri.unwrap_or_default(),
        intro: record.intro.filter(|i| !i.trim().is_empty()),
        events,
    })
}

/// Загрузка документа событий из файла
pub async fn load_document(path: &Path) -> Result<EventDocument> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        SportcastError::EventDocument(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_document(&json)
}
