//! Модуль работы с потоком обнаруженных событий
//!
//! Содержит разбор документов событий, поступающих от этапа анализа видео,
//! и агрегацию атомарных событий в нарративные блоки.

pub mod aggregator;
pub mod parser;

pub use aggregator::{aggregate_events, BlockKind, NarrativeBlock};
pub use parser::{load_document, parse_document, EventCategory, EventDocument, RawEvent};
