//! Модуль агрегации событий в нарративные блоки
//!
//! Превращает упорядоченный по времени поток атомарных событий одного
//! сегмента в список блоков, каждый из которых можно рассказать на одном
//! дыхании. Решения о разделении принимаются в порядке приоритета: подача
//! всегда открывает новый блок, блок не продолжается после выигрыша очка,
//! длинный разрыв трактуется как смена сцены, и лишь затем действуют
//! мягкие пределы длительности и числа событий.

use log::debug;

use crate::config::AggregationConfig;
use crate::event::parser::{EventCategory, RawEvent};
use crate::narrative::Emotion;

/// Тип блока повествования
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Блок, собранный из событий розыгрыша
    Rally,
    /// Синтетическое вступление
    Intro,
    /// Синтетическое заполнение паузы
    Gap,
    /// Синтетическое завершение
    Outro,
    /// Синтетический разбор повтора
    Replay,
}

impl BlockKind {
    /// Получить строковое представление типа блока
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rally => "RALLY",
            Self::Intro => "INTRO",
            Self::Gap => "GAP",
            Self::Outro => "OUTRO",
            Self::Replay => "REPLAY",
        }
    }
}

/// Группа событий, рассказываемая как один бит повествования
#[derive(Debug, Clone)]
pub struct NarrativeBlock {
    /// Тип блока (агрегатор порождает только Rally)
    pub kind: BlockKind,
    /// Начало первого события блока (сек)
    pub raw_start: f64,
    /// Конец последнего события блока (сек)
    pub raw_end: f64,
    /// Сцепленное описание событий либо сводная заглушка
    pub content: String,
    /// Категория открывающего события (определяет задержку реакции)
    pub lead_category: EventCategory,
    /// Блок содержит обязательное для озвучивания событие
    pub crucial: bool,
    /// Блок свернут в сводку вместо поименного перечисления
    pub summary: bool,
    /// Эмоциональная подсказка, вычисленная из типизированных событий
    pub emotion_hint: Option<Emotion>,
    /// Количество событий, вошедших в блок
    pub event_count: usize,
}

/// Маркер неудачного исхода в свободном тексте события
fn is_mishap_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["miss", "error", "fail", "mistake"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Накопитель текущего блока
struct BlockBuilder {
    descriptions: Vec<String>,
    categories: Vec<EventCategory>,
    start: f64,
    end: f64,
    crucial: bool,
    mishap: bool,
    combo_waiver_used: bool,
}

impl BlockBuilder {
    fn new(event: &RawEvent, end: f64) -> Self {
        Self {
            descriptions: vec![event.description()],
            categories: vec![event.category],
            start: event.start,
            end,
            crucial: event.is_crucial,
            mishap: event_has_mishap(event),
            combo_waiver_used: false,
        }
    }

    fn add(&mut self, event: &RawEvent, end: f64) {
        self.descriptions.push(event.description());
        self.categories.push(event.category);
        self.end = self.end.max(end);
        self.crucial |= event.is_crucial;
        self.mishap |= event_has_mishap(event);
    }

    fn len(&self) -> usize {
        self.descriptions.len()
    }

    fn has_score(&self) -> bool {
        self.categories.contains(&EventCategory::Score)
    }

    fn last_category(&self) -> EventCategory {
        *self.categories.last().expect("builder is never empty")
    }

    /// Эмоциональная подсказка блока по приоритету категорий
    fn emotion_hint(&self) -> Option<Emotion> {
        let has = |c: EventCategory| self.categories.contains(&c);
        if has(EventCategory::Score) || has(EventCategory::Offense) {
            Some(Emotion::Excited)
        } else if has(EventCategory::Defense) || has(EventCategory::Foul) {
            Some(Emotion::Tense)
        } else if has(EventCategory::Serve) || has(EventCategory::Setup) {
            Some(Emotion::Soothing)
        } else if self.mishap {
            Some(Emotion::Regretful)
        } else {
            None
        }
    }

    fn build(self, config: &AggregationConfig) -> NarrativeBlock {
        let exchange_count = self
            .categories
            .iter()
            .filter(|c| c.is_exchange())
            .count();

        // Длинный однородный розыгрыш сворачивается в одну сводную фразу,
        // иначе промпт раздувается перечислением каждого касания
        let summary = self.len() >= config.summary_min_events
            && exchange_count as f64 >= self.len() as f64 * config.summary_ratio;

        let content = if summary {
            format!("[Summary] {}-shot rapid exchange at the net", self.len())
        } else {
            self.descriptions.join(" -> ")
        };

        NarrativeBlock {
            kind: BlockKind::Rally,
            raw_start: self.start,
            raw_end: self.end.max(self.start),
            content,
            lead_category: self.categories[0],
            crucial: self.crucial,
            summary,
            emotion_hint: self.emotion_hint(),
            event_count: self.len(),
        }
    }
}

fn event_has_mishap(event: &RawEvent) -> bool {
    is_mishap_text(&event.action)
        || event.detail.as_deref().map(is_mishap_text).unwrap_or(false)
}

/// Агрегация событий сегмента в нарративные блоки
///
/// Пустой список событий дает пустой список блоков: сегменту просто нечего
/// комментировать, это не ошибка.
pub fn aggregate_events(
    events: &[RawEvent],
    total_duration: f64,
    config: &AggregationConfig,
) -> Vec<NarrativeBlock> {
    // Восходящий поток обещает сортировку, но доверять ей нельзя
    let mut sorted: Vec<&RawEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    let mut blocks = Vec::new();
    let mut builder: Option<BlockBuilder> = None;
    let mut last_end = 0.0_f64;

    for event in sorted {
        // Событие у самого конца сегмента не успеть озвучить
        if event.start > total_duration - config.end_margin {
            debug!(
                "dropping event at {:.1}s: too close to segment end ({:.1}s)",
                event.start, total_duration
            );
            continue;
        }

        let end = event
            .end
            .unwrap_or(event.start + config.default_event_duration);

        let should_split = match &mut builder {
            None => false,
            Some(current) => {
                if matches!(event.category, EventCategory::Serve | EventCategory::Start) {
                    // Подача нарративно перезапускает розыгрыш
                    true
                } else if event.category == EventCategory::Score {
                    // Очко объявляется отдельным битом с почти мгновенной реакцией
                    true
                } else if current.has_score() {
                    // Блок никогда не продолжается после выигрыша очка
                    true
                } else if event.start - last_end > config.gap_split {
                    // Длинный разрыв: пропущенное действие или смена сцены
                    true
                } else {
                    let is_combo = current.last_category() == EventCategory::Offense
                        && event.category == EventCategory::Defense;
                    let span = end - current.start;

                    if span > config.max_block_duration {
                        if is_combo && !current.combo_waiver_used {
                            current.combo_waiver_used = true;
                            false
                        } else {
                            true
                        }
                    } else {
                        current.len() >= config.max_block_events
                    }
                }
            }
        };

        if should_split {
            if let Some(done) = builder.take() {
                blocks.push(done.build(config));
            }
        }

        if let Some(current) = builder.as_mut() {
            current.add(event, end);
        } else {
            builder = Some(BlockBuilder::new(event, end));
        }

        last_end = last_end.max(end);
    }

    if let Some(done) = builder.take() {
        blocks.push(done.build(config));
    }

    debug!("aggregated {} events into {} blocks", events.len(), blocks.len());
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(start: f64, end: f64, category: EventCategory, player: &str) -> RawEvent {
        RawEvent {
            start,
            end: Some(end),
            player: player.to_string(),
            action: "action".to_string(),
            detail: None,
            category,
            is_crucial: matches!(category, EventCategory::Serve | EventCategory::Score),
        }
    }

    fn config() -> AggregationConfig {
        AggregationConfig::default()
    }

    #[test]
    fn test_empty_event_list_yields_no_blocks() {
        let blocks = aggregate_events(&[], 30.0, &config());
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_serve_then_score_yields_two_blocks() {
        // Сценарий: подача закрывается, очко идет отдельным блоком
        let events = vec![
            make_event(0.0, 2.0, EventCategory::Serve, "A"),
            make_event(2.1, 3.0, EventCategory::Score, "B"),
        ];

        let blocks = aggregate_events(&events, 10.0, &config());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lead_category, EventCategory::Serve);
        assert_eq!(blocks[1].lead_category, EventCategory::Score);
        assert!(blocks[0].crucial);
        assert!(blocks[1].crucial);
    }

    #[test]
    fn test_block_never_continues_past_score() {
        let events = vec![
            make_event(0.0, 0.8, EventCategory::Exchange, "A"),
            make_event(0.9, 1.6, EventCategory::Score, "B"),
            make_event(1.7, 2.4, EventCategory::Exchange, "A"),
        ];

        let blocks = aggregate_events(&events, 10.0, &config());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].lead_category, EventCategory::Score);
        assert_eq!(blocks[2].event_count, 1);
    }

    #[test]
    fn test_long_gap_forces_new_block() {
        let events = vec![
            make_event(0.0, 1.0, EventCategory::Exchange, "A"),
            make_event(4.0, 5.0, EventCategory::Exchange, "B"),
        ];

        let blocks = aggregate_events(&events, 10.0, &config());
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_homogeneous_rally_collapses_into_summary() {
        // Десять подряд идущих обменов без заметных разрывов
        let mut events = Vec::new();
        for i in 0..10 {
            let start = i as f64 * 0.8;
            events.push(make_event(start, start + 0.7, EventCategory::Exchange, "A"));
        }

        let blocks = aggregate_events(&events, 20.0, &config());
        assert!(!blocks.is_empty());
        // Каждый достаточно длинный блок свернут в сводку, а не в перечисление
        for block in blocks.iter().filter(|b| b.event_count >= 3) {
            assert!(block.summary, "block content: {}", block.content);
            assert!(block.content.starts_with("[Summary]"));
            assert!(!block.content.contains("->"));
        }
    }

    #[test]
    fn test_no_event_loss_except_end_margin() {
        let events = vec![
            make_event(0.0, 2.0, EventCategory::Serve, "A"),
            make_event(2.1, 3.0, EventCategory::Exchange, "B"),
            make_event(3.2, 4.0, EventCategory::Offense, "A"),
            // Это событие начинается в пределах 0.5с от конца сегмента
            make_event(9.8, 10.0, EventCategory::Exchange, "B"),
        ];

        let blocks = aggregate_events(&events, 10.0, &config());
        let represented: usize = blocks.iter().map(|b| b.event_count).sum();
        assert_eq!(represented, 3);
    }

    #[test]
    fn test_offense_defense_combo_waives_duration_cap_once() {
        let events = vec![
            make_event(0.0, 2.0, EventCategory::Setup, "A"),
            make_event(2.1, 4.4, EventCategory::Offense, "A"),
            // Продолжение комбинации атака -> защита при уже превышенной длительности
            make_event(4.5, 5.4, EventCategory::Defense, "B"),
        ];

        let blocks = aggregate_events(&events, 20.0, &config());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].event_count, 3);
    }

    #[test]
    fn test_unsorted_input_is_reordered() {
        let events = vec![
            make_event(3.0, 3.8, EventCategory::Exchange, "B"),
            make_event(0.0, 1.0, EventCategory::Serve, "A"),
        ];

        let blocks = aggregate_events(&events, 10.0, &config());
        assert!(!blocks.is_empty());
        assert_eq!(blocks[0].lead_category, EventCategory::Serve);
        assert!(blocks[0].raw_start < 1.0);
    }

    #[test]
    fn test_emotion_hint_priority() {
        let score = vec![make_event(0.0, 1.0, EventCategory::Score, "A")];
        assert_eq!(
            aggregate_events(&score, 10.0, &config())[0].emotion_hint,
            Some(Emotion::Excited)
        );

        let defense = vec![make_event(0.0, 1.0, EventCategory::Defense, "A")];
        assert_eq!(
            aggregate_events(&defense, 10.0, &config())[0].emotion_hint,
            Some(Emotion::Tense)
        );

        let mut mishap = make_event(0.0, 1.0, EventCategory::Exchange, "A");
        mishap.action = "net error".to_string();
        assert_eq!(
            aggregate_events(&[mishap], 10.0, &config())[0].emotion_hint,
            Some(Emotion::Regretful)
        );

        let plain = vec![make_event(0.0, 1.0, EventCategory::General, "A")];
        assert_eq!(aggregate_events(&plain, 10.0, &config())[0].emotion_hint, None);
    }

    #[test]
    fn test_invariant_end_not_before_start() {
        let events = vec![
            make_event(0.0, 2.0, EventCategory::Serve, "A"),
            make_event(2.1, 3.0, EventCategory::Score, "B"),
        ];
        for block in aggregate_events(&events, 10.0, &config()) {
            assert!(block.raw_end >= block.raw_start);
        }
    }
}
