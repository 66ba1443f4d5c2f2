//! Модуль планирования слотов комментария
//!
//! Преобразует нарративные блоки в неперекрывающуюся последовательность
//! временных окон с бюджетом на речь.

pub mod scheduler;

pub use scheduler::{schedule_blocks, CommentarySlot};
