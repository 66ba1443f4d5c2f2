//! Модуль конфигурации библиотеки sportcast
//!
//! Этот модуль содержит структуры и перечисления для настройки библиотеки.
//! Все пороговые значения конвейера собраны здесь, в одном месте.

use serde::{Deserialize, Serialize};

/// Модель генерации текста для использования с chat-completions API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GenerationModel {
    /// Быстрая и дешевая модель
    Mini,
    /// Полная модель
    Full,
}

impl Default for GenerationModel {
    fn default() -> Self {
        Self::Mini
    }
}

impl GenerationModel {
    /// Получить строковое представление модели
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mini => "gpt-4o-mini",
            Self::Full => "gpt-4o",
        }
    }
}

/// Стратегия обработки текста, не помещающегося в отведенный слот
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OverflowStrategy {
    /// Только ускорение воспроизведения (в пределах допустимого диапазона)
    SpeedUp,
    /// Только усечение текста по границе пунктуации
    Truncate,
    /// Сначала ускорение, усечение только если максимальной скорости не хватает
    Auto,
}

impl Default for OverflowStrategy {
    fn default() -> Self {
        Self::Auto
    }
}

/// Настройки агрегации событий в нарративные блоки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Разрыв между событиями (сек), после которого начинается новый блок
    pub gap_split: f64,
    /// Максимальная длительность блока (сек) до мягкого разделения
    pub max_block_duration: f64,
    /// Максимальное количество событий в блоке до мягкого разделения
    pub max_block_events: usize,
    /// Минимальное количество событий для сворачивания блока в сводку
    pub summary_min_events: usize,
    /// Доля событий типа Exchange, при которой блок сворачивается в сводку
    pub summary_ratio: f64,
    /// События, начинающиеся ближе к концу сегмента (сек), отбрасываются
    pub end_margin: f64,
    /// Длительность события по умолчанию, если end_time отсутствует (сек)
    pub default_event_duration: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            gap_split: 2.0,
            max_block_duration: 4.5,
            max_block_events: 5,
            summary_min_events: 3,
            summary_ratio: 0.7,
            end_margin: 0.5,
            default_event_duration: 1.0,
        }
    }
}

/// Задержки реакции комментатора по категориям действий (сек)
///
/// Комментатор не может описать действие раньше, чем оно станет видимым.
/// Медленные подготовительные действия дают больше времени на подводку,
/// чем решающие удары.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionDelays {
    /// Подача и подготовительные действия
    pub serve: f64,
    /// Атакующие удары (смэш, добивание)
    pub offense: f64,
    /// Защитные действия
    pub defense: f64,
    /// Момент выигрыша очка (почти мгновенная реакция)
    pub score: f64,
    /// Все остальные категории
    pub default: f64,
}

impl Default for ReactionDelays {
    fn default() -> Self {
        Self {
            serve: 2.0,
            offense: 0.55,
            defense: 0.7,
            score: 0.1,
            default: 0.8,
        }
    }
}

/// Настройки планирования слотов комментария
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Если первый блок начинается позже этого порога (сек), вставляется интро
    pub intro_threshold: f64,
    /// Максимальная длительность интро (сек)
    pub intro_max_duration: f64,
    /// Отступ интро от начала первого блока (сек)
    pub intro_lead: f64,
    /// Минимальный зазор между соседними слотами (сек)
    pub min_slot_gap: f64,
    /// Тишина длиннее этого порога (сек) заполняется Gap-слотом
    pub gap_fill_threshold: f64,
    /// Максимальная длительность Gap-слота (сек)
    pub gap_fill_max: f64,
    /// Запас, добавляемый к длительности событий блока (сек)
    pub slot_padding: f64,
    /// Минимальная целевая длительность слота (сек)
    pub slot_min_duration: f64,
    /// Максимальная целевая длительность слота (сек)
    pub slot_max_duration: f64,
    /// Нижняя граница длительности при сжатии под следующий блок (сек)
    pub lookahead_floor: f64,
    /// Слоты короче этого значения (сек) отбрасываются
    pub discard_below: f64,
    /// Остаток времени (сек), при котором хвост делится на Outro + Replay
    pub outro_split_threshold: f64,
    /// Длительность Outro при разделенном хвосте (сек)
    pub outro_duration: f64,
    /// Максимальная длительность одиночного Outro (сек)
    pub outro_max_duration: f64,
    /// Максимальная длительность Replay-слота (сек)
    pub replay_max_duration: f64,
    /// Минимальный остаток времени (сек) для одиночного Outro
    pub outro_threshold: f64,
    /// Нижняя граница бюджета слогов для ключевых и сводных слотов
    pub crucial_syllable_floor: u32,
    /// Нижняя граница бюджета слогов для обычных слотов
    pub syllable_floor: u32,
    /// Нижняя граница бюджета слогов для интро и разбора повтора
    pub intro_syllable_floor: u32,
    /// Нижняя граница бюджета слогов для заполняющих слотов (Gap/Outro)
    pub filler_syllable_floor: u32,
    /// Задержки реакции по категориям
    pub delays: ReactionDelays,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            intro_threshold: 3.0,
            intro_max_duration: 6.0,
            intro_lead: 0.5,
            min_slot_gap: 0.2,
            gap_fill_threshold: 4.0,
            gap_fill_max: 5.0,
            slot_padding: 2.0,
            slot_min_duration: 3.5,
            slot_max_duration: 6.0,
            lookahead_floor: 1.5,
            discard_below: 0.8,
            outro_split_threshold: 12.0,
            outro_duration: 5.0,
            outro_max_duration: 6.0,
            replay_max_duration: 8.0,
            outro_threshold: 3.0,
            crucial_syllable_floor: 12,
            syllable_floor: 5,
            intro_syllable_floor: 10,
            filler_syllable_floor: 8,
            delays: ReactionDelays::default(),
        }
    }
}

/// Настройки сборки финальных строк комментария
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Буфер перед началом следующего слота (сек)
    pub deadline_buffer: f64,
    /// Минимальная длительность строки (сек)
    pub min_line_duration: f64,
    /// Минимальный множитель скорости речи
    pub min_speed: f64,
    /// Максимальный множитель скорости речи
    pub max_speed: f64,
    /// Стратегия обработки переполнения
    pub overflow_strategy: OverflowStrategy,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            deadline_buffer: 0.2,
            min_line_duration: 0.5,
            min_speed: 1.0,
            max_speed: 2.0,
            overflow_strategy: OverflowStrategy::default(),
        }
    }
}

/// Настройки сервиса генерации текста
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API ключ
    pub api_key: String,
    /// Модель генерации
    pub model: GenerationModel,
    /// Адрес chat-completions API
    pub endpoint: String,
    /// Температура генерации
    pub temperature: f32,
    /// Таймаут запроса (сек)
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: GenerationModel::default(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            temperature: 0.3,
            request_timeout_secs: 120,
        }
    }
}

/// Конфигурация библиотеки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportcastConfig {
    /// Скорость речи в слогах в секунду (наблюдаемый диапазон 4.0 - 4.8)
    pub syllables_per_sec: f64,
    /// Длительность сегмента по умолчанию, если видео недоступно (сек)
    pub fallback_segment_duration: f64,
    /// Количество последних сегментов, подаваемых как контекст генерации
    pub history_window: usize,
    /// Жесткий верхний предел размера истории
    pub history_max: usize,
    /// Фоновое описание матча по умолчанию, если документ событий его не несет
    pub default_intro: String,
    /// Глубина очереди между этапом извлечения и этапом генерации
    pub queue_depth: usize,
    /// Настройки агрегации
    pub aggregation: AggregationConfig,
    /// Настройки планирования
    pub scheduling: SchedulingConfig,
    /// Настройки сборки
    pub assembly: AssemblyConfig,
    /// Настройки генерации текста
    pub generation: GenerationConfig,
}

impl Default for SportcastConfig {
    fn default() -> Self {
        Self {
            syllables_per_sec: 4.2,
            fallback_segment_duration: 30.0,
            history_window: 3,
            history_max: 10,
            default_intro: "An exciting match is underway; describe what the footage shows."
                .to_string(),
            queue_depth: 4,
            aggregation: AggregationConfig::default(),
            scheduling: SchedulingConfig::default(),
            assembly: AssemblyConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}
