//! Currency list, cached for one TTL window

use super::cache::{CURRENCIES_KEY, ExpiringCache};
use super::connectivity::Connectivity;
use super::convert::RateOrigin;
use super::error::ListingError;
use super::rates::RateSource;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyList {
    pub codes: Vec<String>,
    pub origin: RateOrigin,
}

pub struct CurrencyListing {
    cache: ExpiringCache,
    source: Arc<dyn RateSource>,
    connectivity: Connectivity,
}

impl CurrencyListing {
    pub fn new(cache: ExpiringCache, source: Arc<dyn RateSource>, connectivity: Connectivity) -> Self {
        Self {
            cache,
            source,
            connectivity,
        }
    }

    pub async fn list(&self) -> Result<CurrencyList, ListingError> {
        if let Some(cached) = self.cache.get_entry::<Vec<String>>(CURRENCIES_KEY).await {
            debug!("Using cached currencies");
            return Ok(CurrencyList {
                codes: cached.data,
                origin: RateOrigin::Cache {
                    cached_at: cached.cached_at,
                },
            });
        }

        if !self.connectivity.is_online() {
            return Err(ListingError::OfflineUnavailable);
        }

        let codes = self.source.fetch_currency_list().await.map_err(|e| {
            warn!(error = %e, "Currency fetch failed");
            ListingError::Fetch(e)
        })?;
        self.cache.set(CURRENCIES_KEY, &codes).await;

        Ok(CurrencyList {
            codes,
            origin: RateOrigin::Network,
        })
    }
}
