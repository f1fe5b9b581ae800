//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FakeGemini, TestClient, TestServer, SAMPLE_REPLY};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_recommend() {
//!     let gemini = FakeGemini::spawn().await;
//!     gemini.reply_text(SAMPLE_REPLY);
//!     let server = TestServer::spawn(&gemini).await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.recommend("rainy sunday", None).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```
#![allow(dead_code)]

mod client;
mod constants;
mod server;
mod upstream;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use server::{fast_retry_policy, slow_retry_policy, TestServer};
pub use upstream::{FakeGemini, RecordedRequest};
