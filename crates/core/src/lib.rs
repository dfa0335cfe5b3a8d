//! Core library for translating SubRip subtitles into Arabic.

pub mod error;
pub mod output;
pub mod rtl;
pub mod srt;
pub mod translate;
