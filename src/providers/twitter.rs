//! Twitter API Client (optional)
//!
//! Used only to count recent mentions of a token symbol as a weak social
//! credibility signal. When TWITTER_API_KEY is not configured the analyzer
//! falls back to pump.fun metadata link presence alone.

use serde::Deserialize;
use tracing::warn;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::USER_AGENT;

#[derive(Debug, Deserialize)]
struct CountsResponse {
    meta: Option<CountsMeta>,
}

#[derive(Debug, Deserialize)]
struct CountsMeta {
    total_tweet_count: Option<u64>,
}

/// Twitter v2 API client with a bearer token
pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
}

impl TwitterClient {
    pub fn new(bearer_token: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(
                crate::models::errors::ErrorCode::TwitterError,
                format!("HTTP client build failed: {}", e),
            ))?;

        Ok(Self {
            client,
            bearer_token: bearer_token.into(),
        })
    }

    /// Builds the tweet-counts request; reqwest handles query encoding.
    fn counts_request(&self, query: &str) -> reqwest::RequestBuilder {
        self.client
            .get("https://api.twitter.com/2/tweets/counts/recent")
            .query(&[("query", query), ("granularity", "day")])
            .bearer_auth(&self.bearer_token)
    }

    /// Count tweets mentioning `query` in the last 24h.
    /// Returns None on any API failure so social scoring can degrade.
    pub async fn recent_mention_count(&self, query: &str) -> Option<u64> {
        let response = self.counts_request(query).send().await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("⚠️ Twitter counts API returned HTTP {}", r.status());
                return None;
            }
            Err(e) => {
                warn!("⚠️ Twitter counts request failed: {}", e);
                return None;
            }
        };

        match response.json::<CountsResponse>().await {
            Ok(body) => body.meta.and_then(|m| m.total_tweet_count),
            Err(e) => {
                warn!("⚠️ Twitter counts parse failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_query_is_encoded() {
        let client = TwitterClient::new("token").unwrap();
        let request = client.counts_request("$WIF token").build().unwrap();

        assert_eq!(
            request.url().query(),
            Some("query=%24WIF+token&granularity=day")
        );
        assert!(request.headers().contains_key("authorization"));
    }
}
