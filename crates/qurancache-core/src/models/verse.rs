use serde::{Deserialize, Serialize};

/// A single verse of a chapter, as listed in `GET /surah/{n}/{edition}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Verse {
    /// Position across the whole text (1..=6236). Not every edition sends it.
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(rename = "numberInSurah")]
    pub number_in_chapter: u32,
    pub text: String,
}

impl Verse {
    pub fn display_line(&self) -> String {
        format!("{}. {}", self.number_in_chapter, self.text)
    }
}

/// The verse shown on the "last read" card.
///
/// Only `text` is guaranteed. The location fields were added later and are
/// absent in older cache files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LastReadMarker {
    pub text: String,
    #[serde(default)]
    pub verse_number: Option<u32>,
    #[serde(default)]
    pub chapter_name: Option<String>,
}

impl LastReadMarker {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Card heading, e.g. "Ayah: 262 (Al-Baqarah)".
    pub fn location_display(&self) -> String {
        match (self.verse_number, self.chapter_name.as_deref()) {
            (Some(n), Some(chapter)) => format!("Ayah: {} ({})", n, chapter),
            (Some(n), None) => format!("Ayah: {}", n),
            (None, Some(chapter)) => chapter.to_string(),
            (None, None) => "Ayah".to_string(),
        }
    }
}
