//! Модуль для работы с видео
//!
//! Этот модуль содержит получение длительности видеофайла через ffprobe.
//! Недоступное видео не ошибка: планирование продолжается с длительностью
//! по умолчанию, чтобы пакетная обработка не останавливалась.

use std::path::Path;

use log::warn;

use crate::error::{Result, SportcastError};

/// Получение длительности видео (сек)
fn run_ffprobe(video_path: &Path) -> Result<f64> {
    let output = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(video_path)
        .output()?;

    if !output.status.success() {
        return Err(SportcastError::VideoProcessing(format!(
            "ffprobe failed with status: {}",
            output.status
        )));
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    let duration = duration_str.trim().parse::<f64>().map_err(|_| {
        SportcastError::VideoProcessing(format!(
            "failed to parse video duration: {}",
            duration_str
        ))
    })?;

    Ok(duration)
}

/// Длительность сегмента с мягкой деградацией
///
/// При любой неудаче (нет файла, нет ffprobe, нечитаемый вывод)
/// возвращается запасное значение из конфигурации.
pub fn probe_duration(video_path: &Path, fallback: f64) -> f64 {
    match run_ffprobe(video_path) {
        Ok(duration) if duration > 0.0 => duration,
        Ok(duration) => {
            warn!(
                "ffprobe reported non-positive duration {} for {}, using fallback {:.1}s",
                duration,
                video_path.display(),
                fallback
            );
            fallback
        }
        Err(e) => {
            warn!(
                "cannot probe duration of {} ({}), using fallback {:.1}s",
                video_path.display(),
                e,
                fallback
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_video_degrades_to_fallback() {
        let duration = probe_duration(Path::new("/nonexistent/segment.mp4"), 30.0);
        assert_eq!(duration, 30.0);
    }
}
