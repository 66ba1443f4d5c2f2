//! Модуль работы с медиафайлами
//!
//! Библиотеке от видео нужна только длительность сегмента; все остальное
//! (кодеки, склейка, наложение звука) живет во внешних инструментах.

pub mod video;

pub use video::probe_duration;
