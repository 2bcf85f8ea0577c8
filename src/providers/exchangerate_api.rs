use crate::core::rates::{FetchError, RateSource, RateTable};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Currency the list of known currencies is read from.
const LIST_BASE: &str = "USD";

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    rates: RateTable,
}

/// Client for the `GET {base_url}/latest/{BASE}` rates endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent("fxconv/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| FetchError::Transport {
            base: String::new(),
            message: e.to_string(),
            connect: false,
        })?;

        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    async fn fetch_currency_list(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.fetch_rates(LIST_BASE).await?.codes())
    }

    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        let url = format!("{}/latest/{}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                base: base.to_string(),
                message: e.to_string(),
                connect: e.is_connect(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                base: base.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| FetchError::Transport {
            base: base.to_string(),
            message: e.to_string(),
            connect: false,
        })?;

        let data: LatestRatesResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Parse {
                base: base.to_string(),
                message: e.to_string(),
            })?;

        if data.rates.is_empty() {
            return Err(FetchError::Parse {
                base: base.to_string(),
                message: "response carried no rates".to_string(),
            });
        }

        debug!(count = data.rates.len(), "Received rates");
        Ok(data.rates)
    }
}
