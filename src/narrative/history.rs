//! Модуль скользящей истории повествования
//!
//! История хранит текст озвученных сегментов и подается как контекст в
//! генерацию следующего сегмента, чтобы тон и сюжет не рвались на стыках.
//! Это явный объект контекста: он принадлежит последовательному
//! потребителю этапа генерации и передается в обработку сегмента по
//! изменяемой ссылке, а не живет глобальным состоянием.

use std::collections::VecDeque;

/// Скользящее окно текста последних озвученных сегментов
#[derive(Debug, Clone)]
pub struct NarrativeHistory {
    entries: VecDeque<String>,
    /// Сколько последних записей подается в контекст генерации
    window: usize,
    /// Жесткий предел хранимых записей
    max_entries: usize,
}

impl NarrativeHistory {
    /// Создать историю с окном контекста и жестким пределом размера
    pub fn new(window: usize, max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            window,
            max_entries: max_entries.max(window),
        }
    }

    /// Добавить текст успешно обработанного сегмента
    ///
    /// Самые старые записи вытесняются первыми.
    pub fn push(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.entries.push_back(text);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Контекстная строка для генерации следующего сегмента
    ///
    /// Возвращает `None`, если истории еще нет (первый сегмент).
    pub fn context_string(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let start = self.entries.len().saturating_sub(self.window);
        let lines: Vec<String> = self
            .entries
            .iter()
            .skip(start)
            .map(|entry| format!("- {}", entry))
            .collect();
        Some(lines.join("\n"))
    }

    /// Количество хранимых записей
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// История пуста
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Сброс перед началом нового пакетного прогона
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_has_no_context() {
        let history = NarrativeHistory::new(3, 10);
        assert!(history.context_string().is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_context_uses_last_window_entries() {
        let mut history = NarrativeHistory::new(2, 10);
        history.push("first".to_string());
        history.push("second".to_string());
        history.push("third".to_string());

        let context = history.context_string().unwrap();
        assert!(!context.contains("first"));
        assert!(context.contains("second"));
        assert!(context.contains("third"));
    }

    #[test]
    fn test_hard_cap_evicts_oldest() {
        let mut history = NarrativeHistory::new(3, 5);
        for i in 0..8 {
            history.push(format!("segment {}", i));
        }
        assert_eq!(history.len(), 5);

        let context = history.context_string().unwrap();
        assert!(context.contains("segment 7"));
        assert!(!context.contains("segment 2"));
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut history = NarrativeHistory::new(3, 10);
        history.push(String::new());
        assert!(history.is_empty());
    }

    #[test]
    fn test_reset_clears_entries() {
        let mut history = NarrativeHistory::new(3, 10);
        history.push("text".to_string());
        history.reset();
        assert!(history.is_empty());
    }
}
