use crate::config::Config;
use crate::error::FetchError;
use crate::models::{ApiErrorBody, QuestionsPage};
use async_trait::async_trait;
use reqwest::header;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("iqm/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand out numbered pages of questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<QuestionsPage, FetchError>;
}

pub struct StackExchangeClient {
    client: reqwest::Client,
    url: String,
    site: String,
    filter: String,
    timeout_secs: u64,
}

impl StackExchangeClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/questions", config.base_url.trim_end_matches('/')),
            site: config.site.clone(),
            filter: config.filter.clone(),
            timeout_secs: config.request_timeout.as_secs(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl QuestionSource for StackExchangeClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<QuestionsPage, FetchError> {
        debug!(page, page_size, url = %self.url, "requesting questions");

        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("page", page.to_string()),
                ("pagesize", page_size.to_string()),
                ("unsafe", "false".to_string()),
                ("filter", self.filter.clone()),
                ("site", self.site.clone()),
            ])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = body
                .error_message
                .or(body.error_name)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let page_body: QuestionsPage =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed(e.to_string()))?;

        info!(
            page,
            items = page_body.items.len(),
            has_more = ?page_body.has_more,
            quota_max = ?page_body.quota_max,
            quota_remaining = ?page_body.quota_remaining,
            "questions page received"
        );
        Ok(page_body)
    }
}
