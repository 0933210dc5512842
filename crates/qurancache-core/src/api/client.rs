//! API client for the alquran.cloud REST API.
//!
//! Every endpoint answers with the same envelope:
//! `{ "code": 200, "status": "OK", "data": ... }`. A response only counts as
//! a success when the HTTP status is 2xx **and** the envelope status is "OK".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::models::{ChapterSummary, LastReadMarker, Verse};

use super::{ApiError, ContentSource};

// ============================================================================
// Constants
// ============================================================================

/// Public base URL of the content API.
pub const DEFAULT_BASE_URL: &str = "https://api.alquran.cloud/v1";

/// Envelope status value for a successful call.
const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VerseDetail {
    #[serde(default)]
    number: Option<u32>,
    text: String,
    #[serde(default)]
    surah: Option<VerseChapterRef>,
}

#[derive(Debug, Deserialize)]
struct VerseChapterRef {
    #[serde(rename = "englishName")]
    english_name: String,
}

#[derive(Debug, Deserialize)]
struct ChapterDetail {
    ayahs: Vec<Verse>,
}

impl From<VerseDetail> for LastReadMarker {
    fn from(detail: VerseDetail) -> Self {
        LastReadMarker {
            text: detail.text,
            verse_number: detail.number,
            chapter_name: detail.surah.map(|s| s.english_name),
        }
    }
}

/// API client for alquran.cloud.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against `base_url`. With no timeout the transport's
    /// defaults apply.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Unwrap the response envelope and decode its `data` field.
    fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed envelope: {}", e)))?;

        if envelope.status != STATUS_OK {
            let message = match envelope.data {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(ApiError::BadStatus {
                status: envelope.status,
                message,
            });
        }

        serde_json::from_value(envelope.data)
            .map_err(|e| ApiError::InvalidResponse(format!("unexpected data: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).send().await?;
        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        Self::parse_envelope(&body)
    }
}

#[async_trait]
impl ContentSource for ApiClient {
    async fn fetch_chapters(&self) -> Result<Vec<ChapterSummary>, ApiError> {
        let chapters: Vec<ChapterSummary> = self.get("/surah").await?;
        debug!(count = chapters.len(), "Fetched chapter list");
        Ok(chapters)
    }

    async fn fetch_verse(&self, verse: u32, edition: &str) -> Result<LastReadMarker, ApiError> {
        let detail: VerseDetail = self.get(&format!("/ayah/{}/{}", verse, edition)).await?;
        Ok(detail.into())
    }

    async fn fetch_chapter_verses(
        &self,
        chapter: u32,
        edition: &str,
    ) -> Result<Vec<Verse>, ApiError> {
        let detail: ChapterDetail = self.get(&format!("/surah/{}/{}", chapter, edition)).await?;
        debug!(chapter, count = detail.ayahs.len(), "Fetched chapter verses");
        Ok(detail.ayahs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RevelationType;

    #[test]
    fn test_parse_chapter_list_envelope() {
        let json = r#"{"code":200,"status":"OK","data":[
            {"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha","englishNameTranslation":"The Opening","numberOfAyahs":7,"revelationType":"Meccan"},
            {"number":2,"name":"سُورَةُ البَقَرَةِ","englishName":"Al-Baqara","englishNameTranslation":"The Cow","numberOfAyahs":286,"revelationType":"Medinan"}
        ]}"#;

        let chapters: Vec<ChapterSummary> =
            ApiClient::parse_envelope(json).expect("Failed to parse chapter list test JSON");
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].number, 1);
        assert_eq!(chapters[1].english_name, "Al-Baqara");
        assert_eq!(chapters[1].revelation_type, RevelationType::Medinan);
        assert_eq!(chapters[1].verse_count, 286);
    }

    #[test]
    fn test_parse_verse_envelope() {
        let json = r#"{"code":200,"status":"OK","data":{"number":262,"text":"Those who spend their possessions for the sake of God...","edition":{"identifier":"en.asad","language":"en"},"surah":{"number":2,"name":"سُورَةُ البَقَرَةِ","englishName":"Al-Baqara","englishNameTranslation":"The Cow","numberOfAyahs":286,"revelationType":"Medinan"},"numberInSurah":255,"juz":3,"manzil":1,"page":42,"ruku":35,"hizbQuarter":17,"sajda":false}}"#;

        let detail: VerseDetail =
            ApiClient::parse_envelope(json).expect("Failed to parse verse test JSON");
        let marker = LastReadMarker::from(detail);
        assert_eq!(marker.text, "Those who spend their possessions for the sake of God...");
        assert_eq!(marker.verse_number, Some(262));
        assert_eq!(marker.chapter_name.as_deref(), Some("Al-Baqara"));
    }

    #[test]
    fn test_parse_chapter_detail_envelope() {
        let json = r#"{"code":200,"status":"OK","data":{"number":108,"englishName":"Al-Kawthar","ayahs":[
            {"number":6205,"text":"BEHOLD, We have bestowed upon thee good in abundance:","numberInSurah":1,"juz":30},
            {"number":6206,"text":"hence, pray unto thy Sustainer [alone], and sacrifice [unto Him alone].","numberInSurah":2,"juz":30},
            {"number":6207,"text":"Verily, he that hates thee has indeed been cut off [from all that is good]!","numberInSurah":3,"juz":30}
        ]}}"#;

        let detail: ChapterDetail =
            ApiClient::parse_envelope(json).expect("Failed to parse chapter detail test JSON");
        assert_eq!(detail.ayahs.len(), 3);
        assert_eq!(detail.ayahs[2].number_in_chapter, 3);
        assert_eq!(detail.ayahs[0].number, Some(6205));
    }

    #[test]
    fn test_non_ok_status_is_an_error() {
        let json = r#"{"code":404,"status":"NOT FOUND","data":"Surah number should be between 1 and 114"}"#;

        let err = ApiClient::parse_envelope::<ChapterDetail>(json).unwrap_err();
        match err {
            ApiError::BadStatus { status, message } => {
                assert_eq!(status, "NOT FOUND");
                assert_eq!(message, "Surah number should be between 1 and 114");
            }
            other => panic!("expected BadStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_body_is_invalid_response() {
        let err = ApiClient::parse_envelope::<Vec<ChapterSummary>>("<html>").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));

        let wrong_shape = r#"{"code":200,"status":"OK","data":{"unexpected":true}}"#;
        let err = ApiClient::parse_envelope::<Vec<ChapterSummary>>(wrong_shape).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("https://example.invalid/v1/", None)
            .expect("Failed to build client");
        assert_eq!(client.base_url(), "https://example.invalid/v1");
    }
}
