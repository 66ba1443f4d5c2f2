//! Модуль сборки финальных строк комментария
//!
//! Сводит сгенерированный текст с жестким временным бюджетом каждого
//! слота. Строка ни при каких условиях не выходит за свой дедлайн: либо
//! речь ускоряется в допустимых пределах, либо текст усекается по
//! безопасной границе. Здесь же назначается эмоциональная метка строки.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{AssemblyConfig, OverflowStrategy};
use crate::event::aggregator::BlockKind;
use crate::narrative::Emotion;
use crate::schedule::CommentarySlot;
use crate::speech::SpeechEstimator;
use crate::timecode;

/// Финальная строка комментария, записываемая в выходной документ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryLine {
    /// Таймкод начала
    pub start_time: String,
    /// Таймкод конца
    pub end_time: String,
    /// Длительность строки в текстовой форме
    pub time_range: String,
    /// Эмоциональная метка для синтеза речи
    pub emotion: Emotion,
    /// Множитель скорости воспроизведения
    pub speed: f64,
    /// Текст строки
    pub text: String,
}

/// Граница, по которой можно безопасно усечь текст
fn is_cut_boundary(c: char) -> bool {
    matches!(c, '，' | '。' | '！' | '？' | ',' | '.' | '!' | '?' | ' ')
}

/// Усечение текста до заданного речевого бюджета
///
/// Ищется самый длинный префикс, укладывающийся в бюджет, затем срез
/// отводится назад к последней границе предложения или пробелу, чтобы не
/// рвать слово посередине. Иероглифы можно резать между символами.
fn truncate_to_fit(text: &str, budget_secs: f64, estimator: &SpeechEstimator) -> String {
    if estimator.estimate(text) <= budget_secs {
        return text.to_string();
    }

    let mut fit_end = 0;
    for (offset, c) in text.char_indices() {
        let next_end = offset + c.len_utf8();
        if estimator.estimate(&text[..next_end]) > budget_secs {
            break;
        }
        fit_end = next_end;
    }

    let prefix = &text[..fit_end];
    let boundary = prefix
        .char_indices()
        .filter(|(_, c)| is_cut_boundary(*c))
        .map(|(offset, c)| offset + c.len_utf8())
        .last();

    // Граница слишком близко к началу не годится: лучше ровный срез
    let cut = match boundary {
        Some(pos) if pos * 2 >= fit_end => pos,
        _ => fit_end,
    };

    text[..cut].trim_end().to_string()
}

/// Эмоция строки: тип слота решает первым, затем подсказка агрегации
fn resolve_emotion(slot: &CommentarySlot) -> Emotion {
    match slot.kind {
        BlockKind::Intro | BlockKind::Gap => Emotion::Soothing,
        BlockKind::Outro => Emotion::Excited,
        BlockKind::Replay => Emotion::Professional,
        BlockKind::Rally => slot.emotion_hint.unwrap_or(Emotion::Calm),
    }
}

/// Сборка строк комментария из слотов и сгенерированного текста
///
/// Слоты без текста пропускаются молча: отсутствие одной реплики не
/// должно ронять остальные. Пустой результат означает, что сегменту
/// нечего сказать, и это не ошибка.
pub fn assemble_lines(
    slots: &[CommentarySlot],
    generated: &HashMap<String, String>,
    total_duration: f64,
    config: &AssemblyConfig,
    estimator: &SpeechEstimator,
) -> Vec<CommentaryLine> {
    let mut lines = Vec::new();

    for (i, slot) in slots.iter().enumerate() {
        let text = match generated.get(&slot.id) {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => {
                debug!("slot {} produced no text, skipping", slot.id);
                continue;
            }
        };

        let final_start = slot.final_start;
        // Жесткий дедлайн: начало следующего слота минус буфер,
        // для последнего слота — конец сегмента
        let hard_deadline = if i < slots.len() - 1 {
            slots[i + 1].final_start - config.deadline_buffer
        } else {
            total_duration
        };

        let estimated = estimator.estimate(&text);
        let mut final_end = (final_start + estimated).min(hard_deadline);
        if final_end <= final_start {
            final_end = final_start + config.min_line_duration;
        }
        let allotted = final_end - final_start;

        let raw_speed = if allotted > 0.1 { estimated / allotted } else { 1.0 };

        let (final_text, speed) = match config.overflow_strategy {
            OverflowStrategy::SpeedUp => {
                if raw_speed > config.max_speed {
                    warn!(
                        "slot {}: text needs {:.2}x speed, clamping to {:.1}x",
                        slot.id, raw_speed, config.max_speed
                    );
                }
                (text, raw_speed.clamp(config.min_speed, config.max_speed))
            }
            OverflowStrategy::Truncate => {
                let fitted = truncate_to_fit(&text, allotted, estimator);
                let speed = (estimator.estimate(&fitted) / allotted)
                    .clamp(config.min_speed, config.max_speed);
                (fitted, speed)
            }
            OverflowStrategy::Auto => {
                if raw_speed > config.max_speed {
                    // Даже максимальное ускорение не вмещает текст
                    let fitted =
                        truncate_to_fit(&text, allotted * config.max_speed, estimator);
                    (fitted, config.max_speed)
                } else {
                    (text, raw_speed.clamp(config.min_speed, config.max_speed))
                }
            }
        };

        if final_text.is_empty() {
            continue;
        }

        lines.push(CommentaryLine {
            start_time: timecode::format(final_start),
            end_time: timecode::format(final_end),
            time_range: timecode::format_duration(allotted),
            emotion: resolve_emotion(slot),
            speed: (speed * 100.0).round() / 100.0,
            text: final_text,
        });
    }

    debug!("assembled {} lines from {} slots", lines.len(), slots.len());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssemblyConfig;

    fn estimator() -> SpeechEstimator {
        SpeechEstimator::new(4.0)
    }

    fn slot(id: &str, kind: BlockKind, start: f64, end: f64) -> CommentarySlot {
        CommentarySlot {
            id: id.to_string(),
            kind,
            final_start: start,
            final_end: end,
            duration: end - start,
            syllable_budget: 12,
            content: String::new(),
            crucial: false,
            emotion_hint: None,
        }
    }

    fn generated(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn test_overlong_text_is_speed_clamped_at_deadline() {
        // Шесть секунд речи против трехсекундного дедлайна
        let slots = vec![
            slot("0", BlockKind::Rally, 0.0, 3.0),
            slot("1", BlockKind::Rally, 3.2, 6.0),
        ];
        // 24 иероглифа при 4 слогах/сек = 6 секунд
        let long_text: String = std::iter::repeat('球').take(24).collect();
        let map = generated(&[("0", long_text.as_str()), ("1", "好球")]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());

        let first = &lines[0];
        assert!((first.speed - 2.0).abs() < 1e-9);
        // Строка не выходит за жесткий дедлайн (3.2 - 0.2 = 3.0)
        assert!(timecode::parse(&first.end_time) <= 3.0 + 1e-9);
    }

    #[test]
    fn test_truncation_when_max_speed_is_not_enough() {
        let slots = vec![
            slot("0", BlockKind::Rally, 0.0, 2.0),
            slot("1", BlockKind::Rally, 2.2, 6.0),
        ];
        // 40 иероглифов = 10 секунд речи против двухсекундного окна
        let very_long: String = std::iter::repeat('球').take(40).collect();
        let map = generated(&[("0", very_long.as_str())]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());

        let line = &lines[0];
        assert!((line.speed - 2.0).abs() < 1e-9);
        // Усеченный текст помещается в окно даже на максимальной скорости
        let fitted = estimator().estimate(&line.text);
        let allotted = timecode::parse(&line.end_time) - timecode::parse(&line.start_time);
        assert!(fitted <= allotted * 2.0 + 1e-9);
        assert!(line.text.chars().count() < 40);
    }

    #[test]
    fn test_truncate_strategy_keeps_natural_speed() {
        let mut config = AssemblyConfig::default();
        config.overflow_strategy = OverflowStrategy::Truncate;

        let slots = vec![
            slot("0", BlockKind::Rally, 0.0, 2.0),
            slot("1", BlockKind::Rally, 2.2, 6.0),
        ];
        let very_long: String = std::iter::repeat('球').take(40).collect();
        let map = generated(&[("0", very_long.as_str())]);

        let lines = assemble_lines(&slots, &map, 10.0, &config, &estimator());
        // Текст урезан до естественной скорости, без ускорения
        assert!((lines[0].speed - 1.0).abs() < 1e-9);
        assert!(lines[0].text.chars().count() <= 8);
    }

    #[test]
    fn test_missing_id_is_skipped_softly() {
        let slots = vec![
            slot("0", BlockKind::Rally, 0.0, 3.0),
            slot("1", BlockKind::Rally, 3.2, 6.0),
        ];
        let map = generated(&[("1", "好球")]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "好球");
    }

    #[test]
    fn test_empty_inputs_yield_no_lines() {
        let lines = assemble_lines(
            &[],
            &HashMap::new(),
            10.0,
            &AssemblyConfig::default(),
            &estimator(),
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn test_emotion_resolution() {
        let mut intro = slot("intro", BlockKind::Intro, 0.0, 3.0);
        intro.emotion_hint = None;
        let mut rally = slot("0", BlockKind::Rally, 3.2, 6.0);
        rally.emotion_hint = Some(Emotion::Excited);
        let outro = slot("outro", BlockKind::Outro, 6.2, 9.0);

        let slots = vec![intro, rally, outro];
        let map = generated(&[("intro", "开场"), ("0", "得分"), ("outro", "总结")]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());
        assert_eq!(lines[0].emotion, Emotion::Soothing);
        assert_eq!(lines[1].emotion, Emotion::Excited);
        assert_eq!(lines[2].emotion, Emotion::Excited);
    }

    #[test]
    fn test_rally_without_hint_defaults_to_calm() {
        let slots = vec![slot("0", BlockKind::Rally, 0.0, 3.0)];
        let map = generated(&[("0", "平稳的回合")]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());
        assert_eq!(lines[0].emotion, Emotion::Calm);
    }

    #[test]
    fn test_lines_never_exceed_segment_duration() {
        let slots = vec![slot("0", BlockKind::Rally, 8.0, 9.8)];
        let long_text: String = std::iter::repeat('球').take(30).collect();
        let map = generated(&[("0", long_text.as_str())]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());
        assert!(timecode::parse(&lines[0].end_time) <= 10.0 + 1e-9);
    }

    #[test]
    fn test_short_text_keeps_natural_speed() {
        let slots = vec![slot("0", BlockKind::Rally, 0.0, 5.0)];
        let map = generated(&[("0", "好球")]);

        let lines = assemble_lines(&slots, &map, 10.0, &AssemblyConfig::default(), &estimator());
        assert!((lines[0].speed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_truncate_prefers_punctuation_boundary() {
        let estimator = estimator();
        // Бюджет в две секунды = восемь слогов
        let text = "前四个字收尾。后面还有很长的一段描述完全放不下";
        let fitted = truncate_to_fit(text, 2.0, &estimator);
        assert!(fitted.ends_with('。'), "got: {}", fitted);
    }
}
