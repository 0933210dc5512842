use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a chapter was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum RevelationType {
    Meccan,
    Medinan,
}

impl RevelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevelationType::Meccan => "Meccan",
            RevelationType::Medinan => "Medinan",
        }
    }
}

impl fmt::Display for RevelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the chapter list, as returned by `GET /surah`.
///
/// Field names on the wire (and in the cache file) follow the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ChapterSummary {
    pub number: u32,
    #[serde(rename = "englishName")]
    pub english_name: String,
    /// Arabic name of the chapter.
    #[serde(rename = "name")]
    pub arabic_name: String,
    #[serde(rename = "englishNameTranslation", default)]
    pub english_name_translation: Option<String>,
    #[serde(rename = "revelationType")]
    pub revelation_type: RevelationType,
    #[serde(rename = "numberOfAyahs")]
    pub verse_count: u32,
}

impl ChapterSummary {
    /// "Meccan - 7 Verses"
    pub fn details_display(&self) -> String {
        let noun = if self.verse_count == 1 { "Verse" } else { "Verses" };
        format!("{} - {} {}", self.revelation_type, self.verse_count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chapter_summary() {
        let json = r#"{"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha","englishNameTranslation":"The Opening","numberOfAyahs":7,"revelationType":"Meccan"}"#;

        let chapter: ChapterSummary =
            serde_json::from_str(json).expect("Failed to parse chapter test JSON");
        assert_eq!(chapter.number, 1);
        assert_eq!(chapter.english_name, "Al-Faatiha");
        assert_eq!(chapter.arabic_name, "سُورَةُ ٱلْفَاتِحَةِ");
        assert_eq!(chapter.english_name_translation.as_deref(), Some("The Opening"));
        assert_eq!(chapter.revelation_type, RevelationType::Meccan);
        assert_eq!(chapter.verse_count, 7);
    }

    #[test]
    fn test_unknown_revelation_type_is_rejected() {
        let json = r#"{"number":1,"name":"x","englishName":"x","numberOfAyahs":7,"revelationType":"Elsewhere"}"#;
        assert!(serde_json::from_str::<ChapterSummary>(json).is_err());
    }

    #[test]
    fn test_details_display() {
        let chapter = ChapterSummary {
            number: 108,
            english_name: "Al-Kawthar".to_string(),
            arabic_name: "سورة الكوثر".to_string(),
            english_name_translation: None,
            revelation_type: RevelationType::Meccan,
            verse_count: 3,
        };
        assert_eq!(chapter.details_display(), "Meccan - 3 Verses");
    }
}
