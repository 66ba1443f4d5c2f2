//! Модуль планировщика слотов комментария
//!
//! Назначает каждому нарративному блоку (плюс синтетическим Intro/Gap/
//! Outro/Replay) неперекрывающееся временное окно с бюджетом длительности
//! речи. Учитывает задержку реакции по категории действия, заполняет
//! длинные паузы и никогда не выходит за пределы длительности сегмента.

use log::debug;

use crate::config::{ReactionDelays, SchedulingConfig};
use crate::event::aggregator::{BlockKind, NarrativeBlock};
use crate::event::parser::EventCategory;
use crate::narrative::Emotion;

/// Запланированное окно комментария, единица работы генерации текста
#[derive(Debug, Clone)]
pub struct CommentarySlot {
    /// Уникальный в пределах сегмента идентификатор слота
    pub id: String,
    /// Тип слота
    pub kind: BlockKind,
    /// Начало окна (сек)
    pub final_start: f64,
    /// Конец окна (сек)
    pub final_end: f64,
    /// Физический бюджет длительности речи (сек)
    pub duration: f64,
    /// Потолок количества слогов, выведенный из длительности
    pub syllable_budget: u32,
    /// Исходное описание либо директива для особых слотов
    pub content: String,
    /// Слот несет ключевое событие
    pub crucial: bool,
    /// Эмоциональная подсказка из агрегации
    pub emotion_hint: Option<Emotion>,
}

impl CommentarySlot {
    /// Человекочитаемое ограничение для промпта генерации
    pub fn constraint_text(&self) -> String {
        format!("at most {} syllables", self.syllable_budget)
    }
}

/// Задержка реакции комментатора на открывающее действие блока
fn reaction_delay(delays: &ReactionDelays, category: EventCategory) -> f64 {
    match category {
        EventCategory::Serve | EventCategory::Setup | EventCategory::Start => delays.serve,
        EventCategory::Offense => delays.offense,
        EventCategory::Defense => delays.defense,
        EventCategory::Score => delays.score,
        _ => delays.default,
    }
}

/// Планирование слотов комментария для одного сегмента
///
/// Пустой список блоков дает пустой список слотов. Слоты выдаются в
/// порядке возрастания начала и не перекрываются: начало каждого слота
/// не раньше конца предыдущего плюс минимальный зазор.
pub fn schedule_blocks(
    blocks: &[NarrativeBlock],
    total_duration: f64,
    config: &SchedulingConfig,
    syllables_per_sec: f64,
) -> Vec<CommentarySlot> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut cursor = 0.0_f64;

    // 1. Интро, если до первого действия достаточно тишины
    let first_start = blocks[0].raw_start;
    if first_start > config.intro_threshold {
        let intro_dur = (first_start - config.intro_lead).min(config.intro_max_duration);
        let budget = ((intro_dur * syllables_per_sec) as u32).max(config.intro_syllable_floor);

        slots.push(CommentarySlot {
            id: "intro".to_string(),
            kind: BlockKind::Intro,
            final_start: 0.0,
            final_end: intro_dur,
            duration: intro_dur,
            syllable_budget: budget,
            content: "[Intro] The broadcast is just starting; give a brief opening."
                .to_string(),
            crucial: false,
            emotion_hint: None,
        });
        cursor = intro_dur;
    }

    // 2. Основной цикл по блокам
    for (idx, block) in blocks.iter().enumerate() {
        let delay = reaction_delay(&config.delays, block.lead_category);
        let ideal_start = block.raw_start + delay;

        // Заполнение длинной паузы, чтобы эфир не молчал
        let lull = ideal_start - cursor;
        if lull > config.gap_fill_threshold {
            let fill_dur = (lull - 0.5).min(config.gap_fill_max);
            let gap_start = cursor + config.min_slot_gap;
            let budget =
                ((fill_dur * syllables_per_sec) as u32).max(config.filler_syllable_floor);

            slots.push(CommentarySlot {
                id: format!("gap_{}", idx),
                kind: BlockKind::Gap,
                final_start: gap_start,
                final_end: gap_start + fill_dur,
                duration: fill_dur,
                syllable_budget: budget,
                content: "[Gap] A lull in play; describe the players' state or routine."
                    .to_string(),
                crucial: false,
                emotion_hint: None,
            });
            cursor = gap_start + fill_dur;
        }

        // Начало не раньше конца предыдущего слота плюс зазор
        let start = ideal_start.max(cursor + config.min_slot_gap);

        let raw_span = block.raw_end - block.raw_start;
        let mut target = (raw_span + config.slot_padding)
            .min(config.slot_max_duration)
            .max(config.slot_min_duration);

        // Сжатие с оглядкой на следующий блок: не наезжать на его начало
        if idx < blocks.len() - 1 {
            let deadline = blocks[idx + 1].raw_start + 1.0;
            let max_allowed = (deadline - start).max(config.lookahead_floor);
            target = target.min(max_allowed);
        }

        let end = (start + target).min(total_duration);
        let final_duration = end - start;
        if final_duration < config.discard_below {
            debug!(
                "discarding slot for block {}: only {:.2}s available",
                idx, final_duration
            );
            continue;
        }

        let floor = if block.crucial || block.summary {
            config.crucial_syllable_floor
        } else {
            config.syllable_floor
        };
        let budget = ((final_duration * syllables_per_sec) as u32).max(floor);

        slots.push(CommentarySlot {
            id: idx.to_string(),
            kind: block.kind,
            final_start: start,
            final_end: end,
            duration: final_duration,
            syllable_budget: budget,
            content: block.content.clone(),
            crucial: block.crucial,
            emotion_hint: block.emotion_hint,
        });
        cursor = end;
    }

    // 3. Хвост сегмента: Outro, при изобилии времени еще и Replay
    let remaining = total_duration - cursor;
    if remaining > config.outro_split_threshold {
        let outro_start = cursor + config.min_slot_gap;
        let outro_dur = config.outro_duration;
        slots.push(CommentarySlot {
            id: "outro_summary".to_string(),
            kind: BlockKind::Outro,
            final_start: outro_start,
            final_end: outro_start + outro_dur,
            duration: outro_dur,
            syllable_budget: ((outro_dur * syllables_per_sec) as u32)
                .max(config.filler_syllable_floor),
            content: "[Outro] The rally is over; quickly sum up the decisive point."
                .to_string(),
            crucial: false,
            emotion_hint: None,
        });
        cursor = outro_start + outro_dur;

        let replay_dur = (remaining - config.outro_duration - 1.0).min(config.replay_max_duration);
        if replay_dur > 3.0 {
            let replay_start = cursor + 0.5;
            slots.push(CommentarySlot {
                id: "outro_replay".to_string(),
                kind: BlockKind::Replay,
                final_start: replay_start,
                final_end: replay_start + replay_dur,
                duration: replay_dur,
                syllable_budget: ((replay_dur * syllables_per_sec) as u32)
                    .max(config.intro_syllable_floor),
                content: "[Replay] Slow-motion replay; analyze the technique in depth."
                    .to_string(),
                crucial: false,
                emotion_hint: Some(Emotion::Professional),
            });
        }
    } else if remaining > config.outro_threshold {
        let outro_dur = (remaining - 0.5).min(config.outro_max_duration);
        let outro_start = cursor + config.min_slot_gap;
        slots.push(CommentarySlot {
            id: "outro".to_string(),
            kind: BlockKind::Outro,
            final_start: outro_start,
            final_end: outro_start + outro_dur,
            duration: outro_dur,
            syllable_budget: ((outro_dur * syllables_per_sec) as u32)
                .max(config.filler_syllable_floor),
            content: "[Outro] The rally is over; sum up what just happened.".to_string(),
            crucial: false,
            emotion_hint: None,
        });
    }
    // Хвост короче порога остается тихим: обрезанные на полуслове фразы
    // хуже тишины

    debug!(
        "scheduled {} slots for {} blocks over {:.1}s",
        slots.len(),
        blocks.len(),
        total_duration
    );
    slots
}
