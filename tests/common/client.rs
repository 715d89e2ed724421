//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest and
//! provides methods for all charts-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::REQUEST_TIMEOUT_SECS;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client
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

    /// GET /
    pub async fn stats(&self) -> Response {
        self.client
            .get(&self.base_url)
            .send()
            .await
            .expect("stats request failed")
    }

    /// POST /v1/charts/series
    pub async fn track_series(
        &self,
        track_ids: &[&str],
        region: Option<&str>,
        start_inclusive: Option<&str>,
        end_inclusive: Option<&str>,
    ) -> Response {
        let mut body = json!({ "track_ids": track_ids });
        if let Some(region) = region {
            body["region"] = json!(region);
        }
        if let Some(start) = start_inclusive {
            body["start_inclusive"] = json!(start);
        }
        if let Some(end) = end_inclusive {
            body["end_inclusive"] = json!(end);
        }

        self.client
            .post(format!("{}/v1/charts/series", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("series request failed")
    }

    /// GET /v1/charts/daily/{date}[?region=...]
    pub async fn daily_chart(&self, date: &str, region: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/v1/charts/daily/{}", self.base_url, date));
        if let Some(region) = region {
            request = request.query(&[("region", region)]);
        }
        request.send().await.expect("daily chart request failed")
    }

    /// GET /v1/tracks
    pub async fn tracks(&self) -> Response {
        self.client
            .get(format!("{}/v1/tracks", self.base_url))
            .send()
            .await
            .expect("tracks request failed")
    }

    /// GET /v1/track/{id}
    pub async fn track(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/track/{}", self.base_url, id))
            .send()
            .await
            .expect("track request failed")
    }

    /// GET /v1/regions
    pub async fn regions(&self) -> Response {
        self.client
            .get(format!("{}/v1/regions", self.base_url))
            .send()
            .await
            .expect("regions request failed")
    }
}
