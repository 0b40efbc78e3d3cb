use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::errors::FetchError;
use super::types::QuoteSet;

pub const DEFAULT_BASE_URL: &str = "https://economia.awesomeapi.com.br";
pub const QUOTE_PATH: &str = "/json/last/BTC-BRL,BTC-USD,USD-BRL";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce the current quote set. No retries: the next
/// scheduled cycle is the retry.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Result<QuoteSet, FetchError>;
}

/// HTTP client for the AwesomeAPI `json/last` endpoint.
#[derive(Clone)]
pub struct AwesomeApiClient {
    http: Client,
    url: String,
    token: Option<String>,
}

impl AwesomeApiClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), QUOTE_PATH),
            token,
        })
    }
}

#[async_trait]
impl QuoteSource for AwesomeApiClient {
    // The token travels as a query parameter; keep it out of span fields.
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch(&self) -> Result<QuoteSet, FetchError> {
        let mut req = self.http.get(&self.url);
        if let Some(token) = &self.token {
            req = req.query(&[("token", token)]);
        }

        let resp = req.send().await?.error_for_status()?;
        let body = resp.bytes().await?;

        let quotes = QuoteSet::from_json(&body)?;

        debug!(
            btc_brl = %quotes.btc_brl.bid,
            btc_usd = %quotes.btc_usd.bid,
            usd_brl = %quotes.usd_brl.bid,
            "quotes fetched"
        );

        Ok(quotes)
    }
}
