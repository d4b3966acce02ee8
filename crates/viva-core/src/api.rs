//! VivaApi - one method per backend endpoint.
//!
//! Every method goes through [`HttpClient`], so the bearer token and
//! session-expiry recovery apply uniformly. Responses are returned as-is;
//! only [`VivaApi::verify_google_token`] has side effects of its own.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::http::{ApiError, ApiResponse, HttpClient, MultipartForm, OutboundRequest};
use crate::models::{
    AnkiCard, DayStat, Envelope, Essay, EssayWithSentences, LoginPayload, NewWordReview,
    ReviewStat, SentenceWithMappings, WordReview,
};
use crate::session::UserProfile;
use crate::storage::{KeyValueStore, TOKEN_KEY};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Image attached to an essay submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Serialize)]
struct GoogleTokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct ReviewBody {
    id: i64,
    quality: i64,
}

#[derive(Serialize)]
struct KnownBody {
    id: i64,
    is_know: bool,
}

pub struct VivaApi {
    client: Arc<HttpClient>,
    storage: Arc<dyn KeyValueStore>,
}

impl VivaApi {
    pub fn new(client: Arc<HttpClient>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { client, storage }
    }

    // ------------------------------------------------------------------------
    // Essays
    // ------------------------------------------------------------------------

    pub fn get_essays(&self) -> Result<ApiResponse<Vec<Essay>>, ApiError> {
        self.client.get("/essays")
    }

    pub fn get_essay(&self, essay_id: i64) -> Result<ApiResponse<EssayWithSentences>, ApiError> {
        self.client.get(&format!("/essays/{essay_id}"))
    }

    /// Submit an essay for segmentation, optionally with an image.
    pub fn submit_essay(
        &self,
        content: &str,
        image: Option<ImageUpload>,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let mut form = MultipartForm::new().text("content", content);
        if let Some(image) = image {
            form = form.file("image", image.filename, image.content_type, image.data);
        }
        self.client
            .send(OutboundRequest::post("/submitEssay").multipart(form))
    }

    /// Sentence ids of an essay, in essay order.
    pub fn get_essay_sentence_ids(&self, essay_id: i64) -> Result<ApiResponse<Vec<i64>>, ApiError> {
        self.client.get(&format!("/essays/{essay_id}/sentences"))
    }

    pub fn get_sentence_with_mappings(
        &self,
        sentence_id: i64,
    ) -> Result<ApiResponse<SentenceWithMappings>, ApiError> {
        self.client.get(&format!("/sentence/{sentence_id}"))
    }

    pub fn add_word_to_anki(&self, card: &AnkiCard) -> Result<ApiResponse<Value>, ApiError> {
        self.client.post_json("/mapping/addToAnki", card)
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// Exchange a Google ID token for a backend session.
    ///
    /// A non-empty `token` in the reply is persisted before returning. On
    /// failure the error is logged and returned unchanged.
    pub fn verify_google_token(&self, token: &str) -> Result<LoginPayload, ApiError> {
        let response = self
            .client
            .post_json::<LoginPayload, _>("/auth/google-login", &GoogleTokenBody { token })
            .map_err(|e| {
                log::error!("Google token verification failed: {}", e);
                e
            })?;

        let payload = response.data;
        if let Some(token) = payload.token.as_deref().filter(|t| !t.is_empty()) {
            self.storage.set(TOKEN_KEY, token).map_err(|e| {
                log::error!("Failed to store session token: {}", e);
                ApiError::from(e)
            })?;
        }
        Ok(payload)
    }

    pub fn get_user_info(&self) -> Result<ApiResponse<UserProfile>, ApiError> {
        self.client.get("/user/info")
    }

    // ------------------------------------------------------------------------
    // Word review
    // ------------------------------------------------------------------------

    pub fn add_word_to_review(
        &self,
        word: &NewWordReview,
    ) -> Result<ApiResponse<Envelope<WordReview>>, ApiError> {
        self.client.post_json("/word", word)
    }

    /// Search the user's words. An empty keyword lists everything.
    pub fn search_words(
        &self,
        keyword: &str,
    ) -> Result<ApiResponse<Envelope<Vec<WordReview>>>, ApiError> {
        let mut request = OutboundRequest::get("/word");
        if !keyword.is_empty() {
            request = request.query("keyword", keyword);
        }
        self.client.send(request)
    }

    pub fn get_word_review_count(&self) -> Result<ApiResponse<Envelope<i64>>, ApiError> {
        self.client.get("/word/review/count")
    }

    /// Words due for review today.
    pub fn get_word_review_list(&self) -> Result<ApiResponse<Envelope<Vec<WordReview>>>, ApiError> {
        self.client.get("/word/review/list")
    }

    pub fn get_word_review_info(
        &self,
        word_id: i64,
    ) -> Result<ApiResponse<Envelope<WordReview>>, ApiError> {
        self.client.get(&format!("/word/{word_id}"))
    }

    /// Record a review answer; `quality` is the 0-5 recall grade.
    pub fn put_word_review(
        &self,
        id: i64,
        quality: i64,
    ) -> Result<ApiResponse<Envelope<WordReview>>, ApiError> {
        self.client.put_json("/word", &ReviewBody { id, quality })
    }

    pub fn post_word_review_know(
        &self,
        id: i64,
        is_know: bool,
    ) -> Result<ApiResponse<Envelope<WordReview>>, ApiError> {
        self.client.post_json("/word/known", &KnownBody { id, is_know })
    }

    pub fn get_review_stat(&self) -> Result<ApiResponse<Envelope<ReviewStat>>, ApiError> {
        self.client.get("/word/review/stat")
    }

    /// Per-day review counts between two dates, inclusive.
    pub fn get_review_day_stat(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ApiResponse<Envelope<Vec<DayStat>>>, ApiError> {
        let request = OutboundRequest::get("/word/review/dayStat")
            .query("start_date", start.format(DAY_FORMAT).to_string())
            .query("end_date", end.format(DAY_FORMAT).to_string());
        self.client.send(request)
    }
}
