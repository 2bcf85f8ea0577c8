//! Validate, look up a rate (cache first), and compute a conversion

use super::cache::{ExpiringCache, rates_key};
use super::connectivity::Connectivity;
use super::error::ConvertError;
use super::format::NumberFormatter;
use super::rates::{RateSource, RateTable};
use super::validate::{ConversionRequest, validate};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Where a submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    Validating,
    Invalid,
    Loading,
    CacheHit,
    Fetching,
    Formatting,
    Done,
    Error,
}

impl ConversionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversionState::Invalid | ConversionState::Done | ConversionState::Error
        )
    }
}

/// Where the rate used for a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateOrigin {
    Cache { cached_at: DateTime<Utc> },
    Network,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub request: ConversionRequest,
    pub rate: f64,
    /// Unrounded `amount * rate`
    pub converted: f64,
    pub origin: RateOrigin,
    pub display: String,
}

pub struct ConversionFlow {
    cache: ExpiringCache,
    source: Arc<dyn RateSource>,
    connectivity: Connectivity,
    formatter: NumberFormatter,
    state: watch::Sender<ConversionState>,
}

impl ConversionFlow {
    pub fn new(
        cache: ExpiringCache,
        source: Arc<dyn RateSource>,
        connectivity: Connectivity,
        formatter: NumberFormatter,
    ) -> Self {
        let (state, _) = watch::channel(ConversionState::Idle);
        Self {
            cache,
            source,
            connectivity,
            formatter,
            state,
        }
    }

    /// Follows the state of whichever submission moved last.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    fn enter(&self, state: ConversionState) {
        debug!(?state, "Conversion state");
        self.state.send_replace(state);
    }

    #[instrument(name = "Convert", skip(self), fields(amount = %amount, from = %from, to = %to))]
    pub async fn convert(&self, amount: &str, from: &str, to: &str) -> Result<Conversion, ConvertError> {
        self.enter(ConversionState::Validating);
        let request = match validate(amount, from, to) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Rejected input");
                self.enter(ConversionState::Invalid);
                return Err(e.into());
            }
        };

        self.enter(ConversionState::Loading);
        match self.lookup_rate(&request).await {
            Ok((rate, origin)) => {
                self.enter(ConversionState::Formatting);
                let converted = request.amount * rate;
                let display = self.formatter.format_conversion(
                    request.amount,
                    &request.from,
                    converted,
                    &request.to,
                );
                info!(rate, converted, "Converted");
                self.enter(ConversionState::Done);
                Ok(Conversion {
                    request,
                    rate,
                    converted,
                    origin,
                    display,
                })
            }
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                self.enter(ConversionState::Error);
                Err(e)
            }
        }
    }

    async fn lookup_rate(&self, request: &ConversionRequest) -> Result<(f64, RateOrigin), ConvertError> {
        let key = rates_key(&request.from);

        if let Some(cached) = self.cache.get_entry::<RateTable>(&key).await {
            if let Some(rate) = cached.data.get(&request.to) {
                self.enter(ConversionState::CacheHit);
                return Ok((
                    rate,
                    RateOrigin::Cache {
                        cached_at: cached.cached_at,
                    },
                ));
            }
            debug!("Cached table for {} has no rate for {}", request.from, request.to);
        }

        if !self.connectivity.is_online() {
            return Err(ConvertError::OfflineUnavailable {
                from: request.from.clone(),
                to: request.to.clone(),
            });
        }

        self.enter(ConversionState::Fetching);
        let table = match self.source.fetch_rates(&request.from).await {
            Ok(table) => table,
            Err(e) if e.is_connect() || !self.connectivity.is_online() => {
                return Err(ConvertError::Connectivity(e));
            }
            Err(e) => return Err(ConvertError::Fetch(e)),
        };

        self.cache.set(&key, &table).await;
        let rate = table.get(&request.to).ok_or_else(|| ConvertError::MissingRate {
            from: request.from.clone(),
            to: request.to.clone(),
        })?;
        Ok((rate, RateOrigin::Network))
    }
}
