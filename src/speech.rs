//! Модуль оценки длительности речи
//!
//! Этот модуль содержит эвристическую оценку того, сколько секунд займет
//! произнесение строки смешанного китайско-латинского текста. Оценка
//! дешевая и синхронная, чтобы планировщик и сборщик могли рассуждать о
//! вместимости слота задолго до реального синтеза речи.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Вес латинского слова в слогах
const LATIN_WORD_UNITS: f64 = 1.3;
/// Вес знака препинания уровня предложения (пауза)
const PUNCTUATION_UNITS: f64 = 0.4;

/// Знак препинания, создающий паузу в речи
fn is_sentence_punctuation(c: char) -> bool {
    matches!(c, '，' | '。' | '！' | '？' | ',' | '.' | '!' | '?')
}

/// Иероглиф CJK (один слог на символ)
fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Оценщик длительности речи
#[derive(Debug, Clone)]
pub struct SpeechEstimator {
    /// Скорость речи в слогах в секунду
    syllables_per_sec: f64,
}

impl SpeechEstimator {
    /// Создать оценщик с указанной скоростью речи
    pub fn new(syllables_per_sec: f64) -> Self {
        Self { syllables_per_sec }
    }

    /// Подсчет речевых единиц в тексте
    ///
    /// Иероглифы CJK считаются по одной единице, латинские слова (после
    /// удаления пунктуации) по 1.3, знаки препинания по 0.4.
    pub fn units(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }

        let cjk_count = text.chars().filter(|c| is_cjk(*c)).count();
        let punctuation_count = text.chars().filter(|c| is_sentence_punctuation(*c)).count();

        let without_cjk: String = text
            .chars()
            .map(|c| if is_cjk(c) { ' ' } else { c })
            .collect();
        let latin_only = NON_WORD.replace_all(&without_cjk, "");
        let word_count = latin_only.split_whitespace().count();

        cjk_count as f64
            + word_count as f64 * LATIN_WORD_UNITS
            + punctuation_count as f64 * PUNCTUATION_UNITS
    }

    /// Оценка длительности произнесения текста в секундах
    pub fn estimate(&self, text: &str) -> f64 {
        self.units(text) / self.syllables_per_sec
    }
}
