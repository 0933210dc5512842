//! Data models for Quran content.
//!
//! This module contains the data structures shared by the API client,
//! the cache and the reader state:
//!
//! - `ChapterSummary`, `RevelationType`: one row of the chapter (surah) list
//! - `Verse`: a single verse (ayah) of an expanded chapter
//! - `LastReadMarker`: the verse shown on the "last read" card
//! - `Library`: chapter list plus last-read marker, persisted as one record

pub mod chapter;
pub mod library;
pub mod verse;

pub use chapter::{ChapterSummary, RevelationType};
pub use library::Library;
pub use verse::{LastReadMarker, Verse};
