//! Модуль пакетного конвейера
//!
//! Обработка пакета сегментов идет в два этапа. Этап A (чтение документов
//! событий и длительностей видео) независим по сегментам и работает в
//! отдельной задаче. Этап B (планирование и генерация) строго
//! последователен: генерация каждого сегмента зависит от истории
//! предыдущего. Этапы связаны ограниченным каналом; закрытие канала
//! служит сигналом конца потока. Сбой одного сегмента логируется и не
//! прерывает пакет.

use std::path::{Path, PathBuf};

use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::error::{Result, SportcastError};
use crate::event::{load_document, EventDocument};
use crate::media::probe_duration;
use crate::output::write_commentary;
use crate::Sportcast;

/// Задание на обработку одного сегмента, передаваемое между этапами
#[derive(Debug)]
pub struct SegmentJob {
    /// Имя сегмента
    pub name: String,
    /// Документ событий
    pub document: EventDocument,
    /// Длительность сегмента (сек)
    pub total_duration: f64,
}

/// Итог пакетного прогона
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Записанные документы комментария
    pub written: Vec<PathBuf>,
    /// Сегменты без пригодного комментария (не ошибка)
    pub empty: usize,
    /// Сегменты, пропущенные из-за ошибок
    pub failed: usize,
}

/// Имя сегмента из имени файла документа событий
fn segment_name(file_name: &str) -> Option<String> {
    if let Some(base) = file_name.strip_suffix("_event.json") {
        Some(base.to_string())
    } else {
        file_name.strip_suffix(".json").map(|base| base.to_string())
    }
}

/// Поиск документов событий в каталоге, отсортированных по имени
async fn discover_event_files(events_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(events_dir).await.map_err(|e| {
        SportcastError::EventDocument(format!("cannot read {}: {}", events_dir.display(), e))
    })?;

    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if let Some(name) = segment_name(&file_name) {
            entries.push((name, path));
        }
    }

    entries.sort();
    Ok(entries)
}

/// Пакетная обработка каталога сегментов
///
/// Для каждого `<имя>_event.json` из `events_dir` берется видео
/// `<имя>.mp4` из `video_dir` (длительность деградирует к запасному
/// значению, если видео недоступно), и в `output_dir` пишется документ
/// комментария. История повествования создается заново на каждый прогон.
pub async fn run_batch(
    sportcast: &Sportcast,
    video_dir: &Path,
    events_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport> {
    let entries = discover_event_files(events_dir).await?;
    let total = entries.len();
    if total == 0 {
        warn!("no event documents found in {}", events_dir.display());
        return Ok(BatchReport::default());
    }
    info!("starting batch over {} segments", total);

    let fallback = sportcast.config().fallback_segment_duration;
    let queue_depth = sportcast.config().queue_depth.max(1);
    let video_dir = video_dir.to_path_buf();

    // Этап A: чтение документов и длительностей, независимое по сегментам.
    // Передатчик уходит в задачу; его закрытие завершает поток заданий.
    let (tx, mut rx) = mpsc::channel::<SegmentJob>(queue_depth);
    let loader = tokio::spawn(async move {
        let mut load_failures = 0usize;
        for (name, json_path) in entries {
            match load_document(&json_path).await {
                Ok(document) => {
                    let video_path = video_dir.join(format!("{}.mp4", name));
                    let total_duration = probe_duration(&video_path, fallback);
                    let job = SegmentJob {
                        name,
                        document,
                        total_duration,
                    };
                    if tx.send(job).await.is_err() {
                        // Потребитель ушел; досрочно заканчиваем
                        break;
                    }
                }
                Err(e) => {
                    error!("skipping segment {}: {}", name, e);
                    load_failures += 1;
                }
            }
        }
        load_failures
    });

    // Этап B: строго последовательная генерация с общей историей
    let mut history = sportcast.new_history();
    let mut report = BatchReport::default();
    let mut index = 0usize;

    while let Some(job) = rx.recv().await {
        index += 1;
        info!(
            "processing segment {} ({}/{}), duration {:.1}s",
            job.name, index, total, job.total_duration
        );

        match sportcast
            .process_segment(&job.name, &job.document, job.total_duration, &mut history)
            .await
        {
            Ok(Some(commentary)) => match write_commentary(output_dir, &commentary).await {
                Ok(path) => {
                    info!("saved {}", path.display());
                    report.written.push(path);
                }
                Err(e) => {
                    error!("failed to write commentary for {}: {}", job.name, e);
                    report.failed += 1;
                }
            },
            Ok(None) => {
                info!("segment {} has nothing to narrate", job.name);
                report.empty += 1;
            }
            Err(e) => {
                // Сегмент пропускается, история остается нетронутой
                error!("segment {} failed: {}", job.name, e);
                report.failed += 1;
            }
        }
    }

    report.failed += loader.await.unwrap_or(0);

    info!(
        "batch finished: {} written, {} empty, {} failed",
        report.written.len(),
        report.empty,
        report.failed
    );
    Ok(report)
}
