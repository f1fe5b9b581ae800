//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use moodwave_server::server::RECOMMEND_PATH;
use reqwest::{Method, Response};
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    /// POST /api/recommend with `{ mood, artist? }`
    pub async fn recommend(&self, mood: &str, artist: Option<&str>) -> Response {
        let mut body = json!({ "mood": mood });
        if let Some(artist) = artist {
            body["artist"] = json!(artist);
        }
        self.recommend_json(body).await
    }

    /// POST /api/recommend with an arbitrary JSON body
    pub async fn recommend_json(&self, body: Value) -> Response {
        self.client
            .post(self.url(RECOMMEND_PATH))
            .json(&body)
            .send()
            .await
            .expect("Recommend request failed")
    }

    /// POST /api/recommend with a raw body
    pub async fn recommend_raw(&self, body: &'static str) -> Response {
        self.client
            .post(self.url(RECOMMEND_PATH))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .expect("Recommend request failed")
    }

    /// Any method against /api/recommend
    pub async fn recommend_with_method(&self, method: Method) -> Response {
        self.client
            .request(method, self.url(RECOMMEND_PATH))
            .send()
            .await
            .expect("Recommend request failed")
    }
}
