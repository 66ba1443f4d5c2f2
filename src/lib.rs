//! Основной файл библиотеки sportcast
//!
//! Эта библиотека превращает поток обнаруженных событий спортивного матча
//! в план озвученного комментария: события агрегируются в нарративные
//! блоки, блоки раскладываются по неперекрывающимся временным слотам с
//! бюджетом речи, внешний сервис генерирует текст, и сборка приводит его
//! к жестким временным границам. Результат — JSON-документ на сегмент,
//! который дальше читают синтез речи и склейка звука с видео.

pub mod config;
pub mod error;
pub mod event;
pub mod generation;
pub mod media;
pub mod narrative;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod schedule;
pub mod speech;
pub mod timecode;

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::SportcastConfig;
use crate::error::Result;
use crate::event::{aggregate_events, EventDocument};
use crate::generation::{GenerationItem, GenerationRequest, OpenAiGenerator, TextGenerator};
use crate::narrative::{assemble_lines, NarrativeHistory};
use crate::output::SegmentCommentary;
use crate::progress::{ProcessStep, ProgressReporter, ProgressTracker};
use crate::schedule::schedule_blocks;
use crate::speech::SpeechEstimator;

/// Основная структура для работы с библиотекой
pub struct Sportcast {
    /// Конфигурация библиотеки
    config: SportcastConfig,
    /// Сервис генерации текста
    generator: Box<dyn TextGenerator>,
    /// Трекер прогресса
    progress_tracker: Option<ProgressTracker>,
}

impl Sportcast {
    /// Создать новый экземпляр Sportcast с указанной конфигурацией
    ///
    /// Генерация текста идет через chat-completions API из конфигурации.
    pub fn new(config: SportcastConfig) -> Self {
        let generator = Box::new(OpenAiGenerator::new(config.generation.clone()));
        Self {
            config,
            generator,
            progress_tracker: None,
        }
    }

    /// Создать экземпляр с подмененным сервисом генерации
    pub fn with_generator(config: SportcastConfig, generator: Box<dyn TextGenerator>) -> Self {
        Self {
            config,
            generator,
            progress_tracker: None,
        }
    }

    /// Установить репортер прогресса
    pub fn set_progress_reporter(&mut self, reporter: Box<dyn ProgressReporter>) {
        let mut tracker = ProgressTracker::new();
        tracker.set_reporter(reporter);
        self.progress_tracker = Some(tracker);
    }

    /// Конфигурация экземпляра
    pub fn config(&self) -> &SportcastConfig {
        &self.config
    }

    /// Создать свежую историю повествования под настройки экземпляра
    pub fn new_history(&self) -> NarrativeHistory {
        NarrativeHistory::new(self.config.history_window, self.config.history_max)
    }

    /// Обработать один сегмент: агрегация -> планирование -> генерация -> сборка
    ///
    /// История повествования обновляется только при успехе, чтобы сбой
    /// генерации не протаскивал испорченный контекст в следующие сегменты.
    /// `Ok(None)` означает, что сегменту нечего сказать; это не ошибка.
    pub async fn process_segment(
        &self,
        segment_name: &str,
        document: &EventDocument,
        total_duration: f64,
        history: &mut NarrativeHistory,
    ) -> Result<Option<SegmentCommentary>> {
        let tracker = self.progress_tracker.as_ref();

        if let Some(t) = tracker {
            t.set_step(ProcessStep::Aggregation);
        }

        let blocks = aggregate_events(&document.events, total_duration, &self.config.aggregation);
        if blocks.is_empty() {
            debug!("segment {}: no narrative blocks, nothing to narrate", segment_name);
            return Ok(None);
        }

        if let Some(t) = tracker {
            t.set_step(ProcessStep::Scheduling);
        }

        let slots = schedule_blocks(
            &blocks,
            total_duration,
            &self.config.scheduling,
            self.config.syllables_per_sec,
        );
        if slots.is_empty() {
            debug!("segment {}: no commentary slots scheduled", segment_name);
            return Ok(None);
        }

        if let Some(t) = tracker {
            t.set_step(ProcessStep::TextGeneration);
            t.update_step_progress(0.0, Some(format!("{} slots", slots.len())));
        }

        let request = GenerationRequest {
            video_uri: document.video_uri.clone(),
            intro: document
                .intro
                .clone()
                .unwrap_or_else(|| self.config.default_intro.clone()),
            history_context: history.context_string(),
            items: slots
                .iter()
                .map(|slot| GenerationItem {
                    id: slot.id.clone(),
                    constraint: slot.constraint_text(),
                    content: slot.content.clone(),
                })
                .collect(),
        };

        let generated = self.generator.generate(&request).await?;

        if let Some(t) = tracker {
            t.set_step(ProcessStep::Assembly);
        }

        let estimator = SpeechEstimator::new(self.config.syllables_per_sec);
        let lines = assemble_lines(
            &slots,
            &generated,
            total_duration,
            &self.config.assembly,
            &estimator,
        );

        if lines.is_empty() {
            info!("segment {}: generation returned no usable lines", segment_name);
            return Ok(None);
        }

        let joined: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        history.push(joined.join(" "));

        if let Some(t) = tracker {
            t.complete();
        }

        info!("segment {}: {} commentary lines", segment_name, lines.len());
        Ok(Some(SegmentCommentary {
            segment: segment_name.to_string(),
            commentary: lines,
        }))
    }
}

/// Публичный API для обработки одного сегмента с настройками по умолчанию
pub async fn narrate_segment(
    video_path: &str,
    event_json_path: &str,
    output_dir: &str,
    api_key: &str,
) -> Result<Option<PathBuf>> {
    let mut config = SportcastConfig::default();
    config.generation.api_key = api_key.to_string();

    let sportcast = Sportcast::new(config.clone());
    let document = event::load_document(Path::new(event_json_path)).await?;
    let total_duration =
        media::probe_duration(Path::new(video_path), config.fallback_segment_duration);

    let segment_name = Path::new(video_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "segment".to_string());

    let mut history = sportcast.new_history();
    match sportcast
        .process_segment(&segment_name, &document, total_duration, &mut history)
        .await?
    {
        Some(commentary) => {
            let path = output::write_commentary(Path::new(output_dir), &commentary).await?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}
