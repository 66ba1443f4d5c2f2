//! Модуль записи выходных документов комментария
//!
//! На каждый сегмент пишется один JSON-документ с именем сегмента и
//! массивом строк комментария. Не-ASCII символы сохраняются литерально:
//! документ читают синтез речи и склейка, которым нужен исходный текст.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::narrative::CommentaryLine;

/// Итоговый документ комментария одного сегмента
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCommentary {
    /// Имя сегмента (без расширения)
    pub segment: String,
    /// Строки комментария в порядке времени
    pub commentary: Vec<CommentaryLine>,
}

/// Запись документа комментария в файл `<segment>.json`
pub async fn write_commentary(
    output_dir: &Path,
    document: &SegmentCommentary,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;

    let path = output_dir.join(format!("{}.json", document.segment));
    let json = serde_json::to_string_pretty(document)?;
    tokio::fs::write(&path, json.as_bytes()).await?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::Emotion;

    fn sample_document() -> SegmentCommentary {
        SegmentCommentary {
            segment: "segment_001".to_string(),
            commentary: vec![CommentaryLine {
                start_time: "0:02.0".to_string(),
                end_time: "0:03.5".to_string(),
                time_range: "0:01.5".to_string(),
                emotion: Emotion::Excited,
                speed: 1.25,
                text: "落地得分！这球抓得太准了！".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_write_preserves_non_ascii_literally() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_commentary(dir.path(), &sample_document()).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("落地得分"));
        assert!(!written.contains("\\u"));
        assert!(written.contains("\"emotion\": \"excited\""));
    }

    #[tokio::test]
    async fn test_written_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let document = sample_document();
        let path = write_commentary(dir.path(), &document).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: SegmentCommentary = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.segment, document.segment);
        assert_eq!(parsed.commentary.len(), 1);
        assert_eq!(parsed.commentary[0].speed, 1.25);
    }
}
