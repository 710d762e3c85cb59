//! Typed wrappers for the backend endpoints.
//!
//! Every call goes through [`RetryingClient::submit`], so the long-running
//! endpoints (`/summarize`, `/generate-quiz`) transparently absorb "accepted,
//! pending" answers.

mod types;
pub mod video;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue, json};

use crate::client::{ApiRequest, ClientConfig, RetryingClient, SubmitOptions, join_endpoint};
use crate::error::ApiError;
use crate::http::ReqwestHttpClient;
use crate::readiness::{ReadinessStatus, StatusSource};

pub use types::{Health, Lecture, NewLecture, QuizQuestion, SavedLecture, Summary, Transcript};
pub use video::{embed_url, video_id};

use types::{LecturesResponse, QuizResponse};

pub const SUMMARIZE: &str = "/summarize";
pub const GENERATE_QUIZ: &str = "/generate-quiz";
pub const FETCH_TRANSCRIPT: &str = "/fetch-transcript";
pub const SAVE_LECTURE: &str = "/save-lecture";
pub const MODELS_STATUS: &str = "/models/status";
pub const MY_LECTURES: &str = "/my-lectures";
pub const HEALTH: &str = "/health";

pub struct ApiClient {
    client: RetryingClient,
}

impl ApiClient {
    pub fn new(client: RetryingClient) -> Self {
        Self { client }
    }

    /// Client with default policy talking to `base_url` over reqwest.
    pub fn connect(base_url: &str) -> Result<Self, ApiError> {
        let url = url::Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        let http = ReqwestHttpClient::new()
            .map_err(|e| ApiError::Client(e.into()))?;
        Ok(Self::new(RetryingClient::new(Arc::new(http), ClientConfig::new(url))))
    }

    pub fn retrying(&self) -> &RetryingClient {
        &self.client
    }

    pub async fn summarize(
        &self,
        text: &str,
        force_mock: bool,
        options: SubmitOptions,
    ) -> Result<Summary, ApiError> {
        self.call(ApiRequest::post(SUMMARIZE, text_body(text, force_mock)), options)
            .await
    }

    pub async fn generate_quiz(
        &self,
        text: &str,
        force_mock: bool,
        options: SubmitOptions,
    ) -> Result<Vec<QuizQuestion>, ApiError> {
        let resp: QuizResponse = self
            .call(ApiRequest::post(GENERATE_QUIZ, text_body(text, force_mock)), options)
            .await?;
        Ok(resp.questions)
    }

    pub async fn fetch_transcript(
        &self,
        video_url: &str,
        options: SubmitOptions,
    ) -> Result<Transcript, ApiError> {
        let mut body = Map::new();
        body.insert("url".to_string(), json!(video_url));
        self.call(ApiRequest::post(FETCH_TRANSCRIPT, body), options)
            .await
    }

    pub async fn save_lecture(
        &self,
        lecture: &NewLecture,
        options: SubmitOptions,
    ) -> Result<SavedLecture, ApiError> {
        let body = match serde_json::to_value(lecture) {
            Ok(JsonValue::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(ApiError::decode(SAVE_LECTURE, e.to_string())),
        };
        self.call(ApiRequest::post(SAVE_LECTURE, body), options)
            .await
    }

    pub async fn models_status(&self) -> Result<ReadinessStatus, ApiError> {
        self.call(ApiRequest::get(MODELS_STATUS), SubmitOptions::new())
            .await
    }

    pub async fn my_lectures(&self) -> Result<Vec<Lecture>, ApiError> {
        let resp: LecturesResponse = self
            .call(ApiRequest::get(MY_LECTURES), SubmitOptions::new())
            .await?;
        Ok(resp.lectures)
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.call(ApiRequest::get(HEALTH), SubmitOptions::new())
            .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        options: SubmitOptions,
    ) -> Result<T, ApiError> {
        join_endpoint(&self.client.config().base_url, request.endpoint()).map_err(|e| {
            ApiError::InvalidEndpoint {
                endpoint: request.endpoint().to_string(),
                message: e.to_string(),
            }
        })?;
        let body = self.client.submit(&request, options).await.into_result()?;
        serde_json::from_value(body).map_err(|e| ApiError::decode(request.endpoint(), e.to_string()))
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self) -> Result<ReadinessStatus, ApiError> {
        self.models_status().await
    }
}

fn text_body(text: &str, force_mock: bool) -> Map<String, JsonValue> {
    let mut body = Map::new();
    body.insert("text".to_string(), json!(text));
    if force_mock {
        body.insert("force_mock".to_string(), json!(true));
    }
    body
}
