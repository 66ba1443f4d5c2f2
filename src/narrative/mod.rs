//! Модуль финальной сборки комментария
//!
//! Содержит сведение сгенерированного текста с жесткими временными
//! границами слотов, назначение эмоций и скользящую историю повествования.

pub mod assembler;
pub mod history;

pub use assembler::{assemble_lines, CommentaryLine};
pub use history::NarrativeHistory;

use serde::{Deserialize, Serialize};

/// Дискретная эмоциональная окраска строки комментария
///
/// Метка управляет просодией на стороне синтеза речи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// Нейтральная подача
    Calm,
    /// Кульминационный момент (очко, смэш)
    Excited,
    /// Напряженный эпизод (защита, нарушение)
    Tense,
    /// Спокойная подводка (подача, пауза)
    Soothing,
    /// Аналитический тон (повтор, разбор)
    Professional,
    /// Досада (ошибка, промах)
    Regretful,
}

impl Emotion {
    /// Получить строковое представление эмоции
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Excited => "excited",
            Self::Tense => "tense",
            Self::Soothing => "soothing",
            Self::Professional => "professional",
            Self::Regretful => "regretful",
        }
    }
}
