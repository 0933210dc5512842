//! Test helpers: sample content and an in-memory `ContentSource`.
//!
//! Compiled for this crate's tests and for dependents that enable the
//! `test-util` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{ApiError, ContentSource};
use crate::models::{ChapterSummary, LastReadMarker, RevelationType, Verse};

/// `count` chapters numbered from 1, alternating revelation type.
pub fn sample_chapters(count: u32) -> Vec<ChapterSummary> {
    (1..=count)
        .map(|number| ChapterSummary {
            number,
            english_name: format!("Chapter {}", number),
            arabic_name: format!("سورة {}", number),
            english_name_translation: None,
            revelation_type: if number % 2 == 0 {
                RevelationType::Medinan
            } else {
                RevelationType::Meccan
            },
            verse_count: number + 2,
        })
        .collect()
}

pub fn sample_verses(count: u32) -> Vec<Verse> {
    (1..=count)
        .map(|n| Verse {
            number: None,
            number_in_chapter: n,
            text: format!("Verse {}", n),
        })
        .collect()
}

/// In-memory content source that counts calls and can be switched offline.
///
/// With a gate installed, `fetch_chapters` waits until [`StaticSource::open_gate`]
/// is called, which lets tests observe state while a refresh is pending.
pub struct StaticSource {
    chapters: Vec<ChapterSummary>,
    marker: LastReadMarker,
    chapter_verses: HashMap<u32, Vec<Verse>>,
    offline: AtomicBool,
    verse_failure: bool,
    gate: Option<Arc<Notify>>,
    chapter_list_calls: AtomicUsize,
    verse_calls: AtomicUsize,
    chapter_verse_calls: Mutex<Vec<(u32, String)>>,
}

impl StaticSource {
    pub fn new(chapters: Vec<ChapterSummary>, marker: LastReadMarker) -> Self {
        Self {
            chapters,
            marker,
            chapter_verses: HashMap::new(),
            offline: AtomicBool::new(false),
            verse_failure: false,
            gate: None,
            chapter_list_calls: AtomicUsize::new(0),
            verse_calls: AtomicUsize::new(0),
            chapter_verse_calls: Mutex::new(Vec::new()),
        }
    }

    /// A source whose every call fails.
    pub fn offline() -> Self {
        let source = Self::new(Vec::new(), LastReadMarker::default());
        source.set_offline(true);
        source
    }

    pub fn with_chapter(mut self, chapter: u32, verses: Vec<Verse>) -> Self {
        self.chapter_verses.insert(chapter, verses);
        self
    }

    /// Fail only the single-verse call; the chapter list still succeeds.
    pub fn with_verse_failure(mut self) -> Self {
        self.verse_failure = true;
        self
    }

    pub fn with_gate(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn chapter_list_calls(&self) -> usize {
        self.chapter_list_calls.load(Ordering::SeqCst)
    }

    pub fn verse_calls(&self) -> usize {
        self.verse_calls.load(Ordering::SeqCst)
    }

    /// `(chapter, edition)` for every per-chapter request, in order.
    pub fn chapter_verse_calls(&self) -> Vec<(u32, String)> {
        self.chapter_verse_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ApiError::InvalidResponse("source is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch_chapters(&self) -> Result<Vec<ChapterSummary>, ApiError> {
        self.chapter_list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.check_online()?;
        Ok(self.chapters.clone())
    }

    async fn fetch_verse(&self, _verse: u32, _edition: &str) -> Result<LastReadMarker, ApiError> {
        self.verse_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.verse_failure {
            return Err(ApiError::BadStatus {
                status: "ERROR".to_string(),
                message: "verse unavailable".to_string(),
            });
        }
        Ok(self.marker.clone())
    }

    async fn fetch_chapter_verses(
        &self,
        chapter: u32,
        edition: &str,
    ) -> Result<Vec<Verse>, ApiError> {
        if let Ok(mut calls) = self.chapter_verse_calls.lock() {
            calls.push((chapter, edition.to_string()));
        }
        self.check_online()?;
        self.chapter_verses
            .get(&chapter)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("chapter {}", chapter)))
    }
}
