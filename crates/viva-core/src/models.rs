//! Backend payload types.
//!
//! These mirror the JSON the backend produces. Unknown fields are ignored and
//! optional fields default, so additive backend changes do not break
//! decoding.
//!
//! # Envelope
//!
//! Word-review endpoints wrap their payload:
//!
//! ```json
//! { "status": 0, "message": null, "data": { ... } }
//! ```
//!
//! `status == 0` is success; anything else carries a message and no data.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::session::UserProfile;

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "none")]
    pub data: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Body returned by `POST /auth/google-login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

// ============================================================================
// Essays and sentences
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Essay {
    pub essay_id: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub update_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub sentence_id: i64,
    pub sentence: String,
    #[serde(default, with = "timestamp::option")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub update_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// `GET /essays/{id}`: an essay plus its segmented sentences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayWithSentences {
    #[serde(flatten)]
    pub essay: Essay,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiReview {
    #[serde(default)]
    pub ai_review_is_correct: Option<bool>,
    #[serde(default)]
    pub ai_review_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageHistory {
    pub date: String,
    pub context: String,
}

/// A learner expression mapped onto a focus word in a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub focus_word: String,
    pub translation: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub is_need_translation: bool,
    #[serde(default)]
    pub ai_review: Option<AiReview>,
    #[serde(rename = "checkingAI", default)]
    pub checking_ai: bool,
    #[serde(default)]
    pub usage_history: Vec<UsageHistory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceText {
    pub sentence: String,
}

/// `GET /sentence/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceWithMappings {
    pub sentence: SentenceText,
    #[serde(rename = "mappingList", default)]
    pub mapping_list: Vec<Mapping>,
}

/// Body of `POST /mapping/addToAnki`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnkiCard {
    pub sentence: String,
    pub mapping_chinese: String,
    pub mapping_wrong_english: String,
    pub mapping_correct_english: String,
}

// ============================================================================
// Word review
// ============================================================================

/// Body of `POST /word`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWordReview {
    pub word: String,
    pub wrong_word: String,
    pub translation: String,
    pub example_sentence: String,
}

/// A word under spaced-repetition review (SM-2 style scheduling fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordReview {
    pub id: i64,
    pub word: String,
    #[serde(default)]
    pub wrong_word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example_sentence: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub easiness: f64,
    #[serde(default)]
    pub interval: i64,
    #[serde(default)]
    pub repetitions: i64,
    #[serde(default, with = "timestamp::option")]
    pub review_datetime: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_know: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, with = "timestamp::option")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub update_time: Option<NaiveDateTime>,
}

/// `GET /word/review/stat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStat {
    #[serde(default)]
    pub today_review_count: i64,
    #[serde(default)]
    pub today_need_review_count: i64,
    #[serde(default)]
    pub total_know_word_review_count: i64,
}

/// One heat-map cell from `GET /word/review/dayStat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStat {
    pub date: NaiveDate,
    pub value: i64,
}

/// Backend timestamps are naive ISO-8601; tolerate an offset when present.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(dt) => serializer.serialize_str(&dt.format(super::NAIVE_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {s}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn essay_decodes_backend_shape() {
        let essay: Essay = serde_json::from_value(json!({
            "essay_id": 12,
            "user_id": "google-123",
            "title": "暂无",
            "content": "I go to school yesterday.",
            "image_url": null,
            "create_time": "2024-11-02T08:15:30.123456",
            "update_time": "2024-11-02T08:15:30",
            "is_deleted": false,
            "deleted_at": null
        }))
        .unwrap();

        assert_eq!(essay.essay_id, 12);
        assert!(essay.image_url.is_none());
        let created = essay.create_time.unwrap();
        assert_eq!(created.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-11-02 08:15:30");
    }

    #[test]
    fn timestamps_with_offset_are_accepted() {
        let sentence: Sentence = serde_json::from_value(json!({
            "sentence_id": 1,
            "sentence": "Hi.",
            "create_time": "2024-11-02T08:15:30+00:00",
            "is_deleted": false
        }))
        .unwrap();
        assert!(sentence.create_time.is_some());
        assert!(sentence.update_time.is_none());
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let result: Result<Sentence, _> = serde_json::from_value(json!({
            "sentence_id": 1,
            "sentence": "Hi.",
            "create_time": "yesterday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn essay_with_sentences_flattens() {
        let detail: EssayWithSentences = serde_json::from_value(json!({
            "essay_id": 3,
            "user_id": "u",
            "title": "t",
            "content": "c",
            "sentences": [{"sentence_id": 9, "sentence": "c", "is_deleted": false}]
        }))
        .unwrap();
        assert_eq!(detail.essay.essay_id, 3);
        assert_eq!(detail.sentences[0].sentence_id, 9);
    }

    #[test]
    fn sentence_with_mappings_uses_backend_field_names() {
        let value = json!({
            "sentence": {"sentence": "我昨天去了学校"},
            "mappingList": [{
                "focus_word": "去了",
                "translation": "went",
                "part_of_speech": "",
                "definition": "",
                "example": "",
                "is_need_translation": true,
                "ai_review": {"ai_review_is_correct": null, "ai_review_expression": "went to"},
                "checkingAI": false,
                "usage_history": []
            }]
        });
        let parsed: SentenceWithMappings = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed.mapping_list.len(), 1);
        assert_eq!(
            parsed.mapping_list[0].ai_review.as_ref().unwrap().ai_review_expression.as_deref(),
            Some("went to")
        );

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["mappingList"][0]["checkingAI"], false);
    }

    #[test]
    fn envelope_with_error_status_has_no_data() {
        let env: Envelope<WordReview> = serde_json::from_value(json!({
            "status": 1,
            "message": "Add wordReview failed",
            "data": null
        }))
        .unwrap();
        assert!(!env.is_ok());
        assert!(env.data.is_none());
    }

    #[test]
    fn review_stat_is_camel_case() {
        let stat: Envelope<ReviewStat> = serde_json::from_value(json!({
            "status": 0,
            "data": {
                "todayReviewCount": 4,
                "todayNeedReviewCount": 10,
                "totalKnowWordReviewCount": 52
            }
        }))
        .unwrap();
        let stat = stat.data.unwrap();
        assert_eq!(stat.today_need_review_count, 10);
        assert_eq!(stat.total_know_word_review_count, 52);
    }

    #[test]
    fn day_stat_parses_dates() {
        let days: Vec<DayStat> =
            serde_json::from_value(json!([{"date": "2024-11-01", "value": 3}])).unwrap();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
    }

    #[test]
    fn login_payload_keeps_user_opaque() {
        let payload: LoginPayload = serde_json::from_value(json!({
            "message": "ok",
            "token": "abc",
            "user": {"id": "g-1", "email": "a@b.c", "extra": [1, 2]}
        }))
        .unwrap();
        assert_eq!(payload.token.as_deref(), Some("abc"));
        assert_eq!(payload.user.unwrap()["extra"][1], 2);
    }
}
