//! Maps user-facing events onto the listing and conversion flows.

use crate::core::validate::{ConversionRequest, sanitize_amount_input, validate};
use crate::core::{Connectivity, ConversionFlow, ConversionState, CurrencyListing, RateOrigin};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Session start, loads the currency list
    Load,
    Submit {
        amount: String,
        from: String,
        to: String,
    },
    ConnectivityChanged(bool),
    /// Amount field edited
    AmountInput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Currencies(Vec<String>),
    Converted(String),
    Error(String),
    Sanitized(String),
    Connectivity { online: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    /// Served from cache while online
    Cached { minutes: i64 },
    /// Served from cache while offline
    Offline { minutes: i64 },
}

impl Banner {
    pub fn message(&self) -> String {
        match self {
            Banner::Cached { minutes } => {
                format!("Using cached rates from {}", minutes_ago(*minutes))
            }
            Banner::Offline { minutes } => format!(
                "You are offline. Showing cached rates from {}",
                minutes_ago(*minutes)
            ),
        }
    }
}

fn minutes_ago(minutes: i64) -> String {
    match minutes {
        0 => "less than a minute ago".to_string(),
        1 => "1 minute ago".to_string(),
        n => format!("{n} minutes ago"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub view: View,
    pub banner: Option<Banner>,
}

impl From<View> for Rendered {
    fn from(view: View) -> Self {
        Rendered { view, banner: None }
    }
}

pub struct Session {
    flow: ConversionFlow,
    listing: CurrencyListing,
    connectivity: Connectivity,
    currencies: Vec<String>,
}

impl Session {
    pub fn new(flow: ConversionFlow, listing: CurrencyListing, connectivity: Connectivity) -> Self {
        Self {
            flow,
            listing,
            connectivity,
            currencies: Vec::new(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// State of the conversion currently in flight.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.flow.subscribe()
    }

    /// First code of a valid request that the loaded list does not offer.
    fn unlisted<'a>(&self, request: &'a ConversionRequest) -> Option<&'a str> {
        if self.currencies.is_empty() {
            return None;
        }
        [request.from.as_str(), request.to.as_str()]
            .into_iter()
            .find(|code| !self.currencies.iter().any(|c| c == code))
    }

    pub async fn handle(&mut self, event: Event) -> Rendered {
        debug!(?event, "Handling event");
        match event {
            Event::Load => match self.listing.list().await {
                Ok(list) => {
                    let banner = self.banner_for(list.origin);
                    self.currencies = list.codes.clone();
                    Rendered {
                        view: View::Currencies(list.codes),
                        banner,
                    }
                }
                Err(e) => View::Error(e.to_string()).into(),
            },
            Event::Submit { amount, from, to } => {
                if let Ok(request) = validate(&amount, &from, &to) {
                    if let Some(code) = self.unlisted(&request) {
                        debug!(code, "Rejected unlisted currency");
                        return View::Error(format!("{code} is not an available currency")).into();
                    }
                }
                match self.flow.convert(&amount, &from, &to).await {
                    Ok(conversion) => Rendered {
                        banner: self.banner_for(conversion.origin),
                        view: View::Converted(conversion.display),
                    },
                    Err(e) => View::Error(e.to_string()).into(),
                }
            }
            Event::ConnectivityChanged(online) => {
                self.connectivity.set_online(online);
                View::Connectivity { online }.into()
            }
            Event::AmountInput(raw) => View::Sanitized(sanitize_amount_input(&raw)).into(),
        }
    }

    fn banner_for(&self, origin: RateOrigin) -> Option<Banner> {
        self.banner_at(origin, Utc::now())
    }

    fn banner_at(&self, origin: RateOrigin, now: DateTime<Utc>) -> Option<Banner> {
        match origin {
            RateOrigin::Network => None,
            RateOrigin::Cache { cached_at } => {
                let minutes = (now - cached_at).num_minutes().max(0);
                if self.connectivity.is_online() {
                    Some(Banner::Cached { minutes })
                } else {
                    Some(Banner::Offline { minutes })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExpiringCache;
    use crate::core::convert::tests::{MockRateSource, usd_table};
    use crate::core::format::NumberFormatter;
    use crate::store::memory::MemoryCollection;
    use chrono::Duration;
    use std::sync::Arc;

    fn session(source: Arc<MockRateSource>) -> Session {
        let cache = ExpiringCache::new(Arc::new(MemoryCollection::new()));
        let connectivity = Connectivity::default();
        let flow = ConversionFlow::new(
            cache.clone(),
            source.clone(),
            connectivity.clone(),
            NumberFormatter::default(),
        );
        let listing = CurrencyListing::new(cache, source, connectivity.clone());
        Session::new(flow, listing, connectivity)
    }

    fn submit(amount: &str, from: &str, to: &str) -> Event {
        Event::Submit {
            amount: amount.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_populates_currencies() {
        let mut session = session(Arc::new(MockRateSource::new(usd_table())));

        let rendered = session.handle(Event::Load).await;

        assert_eq!(
            rendered.view,
            View::Currencies(vec![
                "USD".to_string(),
                "EUR".to_string(),
                "GBP".to_string(),
                "JPY".to_string()
            ])
        );
        assert!(rendered.banner.is_none());
        assert_eq!(session.currencies.len(), 4);

        // Second load comes from cache
        let rendered = session.handle(Event::Load).await;
        assert!(matches!(rendered.banner, Some(Banner::Cached { .. })));
    }

    #[tokio::test]
    async fn test_submit_renders_result_then_cache_banner() {
        let source = Arc::new(MockRateSource::new(usd_table()));
        let mut session = session(source.clone());

        let rendered = session.handle(submit("100", "USD", "EUR")).await;
        assert_eq!(rendered.view, View::Converted("100 USD = 92.00 EUR".to_string()));
        assert!(rendered.banner.is_none());

        let rendered = session.handle(submit("100", "USD", "EUR")).await;
        assert_eq!(rendered.view, View::Converted("100 USD = 92.00 EUR".to_string()));
        assert_eq!(rendered.banner, Some(Banner::Cached { minutes: 0 }));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_error_leaves_session_usable() {
        let mut session = session(Arc::new(MockRateSource::new(usd_table())));

        let rendered = session.handle(submit("", "USD", "EUR")).await;
        assert_eq!(
            rendered.view,
            View::Error("Please enter an amount to convert".to_string())
        );

        let rendered = session.handle(submit("3", "USD", "GBP")).await;
        assert!(matches!(rendered.view, View::Converted(_)));
    }

    #[tokio::test]
    async fn test_connectivity_changes_flow_behavior() {
        let source = Arc::new(MockRateSource::new(usd_table()));
        let mut session = session(source.clone());

        session.handle(submit("1", "USD", "EUR")).await;

        let rendered = session.handle(Event::ConnectivityChanged(false)).await;
        assert_eq!(rendered.view, View::Connectivity { online: false });
        assert!(!session.is_online());

        let rendered = session.handle(submit("1", "USD", "EUR")).await;
        assert_eq!(rendered.banner, Some(Banner::Offline { minutes: 0 }));

        let rendered = session.handle(submit("1", "EUR", "USD")).await;
        assert!(matches!(rendered.view, View::Error(ref m) if m.contains("offline")));
        assert_eq!(source.calls(), 1);

        session.handle(Event::ConnectivityChanged(true)).await;
        let rendered = session.handle(submit("1", "EUR", "USD")).await;
        assert!(matches!(rendered.view, View::Converted(_)));
    }

    #[tokio::test]
    async fn test_unlisted_currency_is_rejected_once_loaded() {
        let source = Arc::new(MockRateSource::new(usd_table()));
        let mut session = session(source.clone());

        session.handle(Event::Load).await;
        let calls = source.calls();

        let rendered = session.handle(submit("1", "US", "EUR")).await;
        assert_eq!(
            rendered.view,
            View::Error("US is not an available currency".to_string())
        );
        let rendered = session.handle(submit("1", "usd", "xyz")).await;
        assert_eq!(
            rendered.view,
            View::Error("XYZ is not an available currency".to_string())
        );
        assert_eq!(source.calls(), calls);

        // Input rules still come first
        let rendered = session.handle(submit("abc", "US", "EUR")).await;
        assert_eq!(
            rendered.view,
            View::Error("Special characters or letters are not allowed".to_string())
        );

        let rendered = session.handle(submit("1", "usd", "gbp")).await;
        assert!(matches!(rendered.view, View::Converted(_)));
    }

    #[tokio::test]
    async fn test_amount_input_is_sanitized() {
        let mut session = session(Arc::new(MockRateSource::new(usd_table())));

        let rendered = session.handle(Event::AmountInput("1a2.3.4".to_string())).await;
        assert_eq!(rendered.view, View::Sanitized("12.34".to_string()));
    }

    #[test]
    fn test_banner_messages() {
        let session = session(Arc::new(MockRateSource::new(usd_table())));
        let now = Utc::now();

        let banner = session
            .banner_at(
                RateOrigin::Cache {
                    cached_at: now - Duration::minutes(12),
                },
                now,
            )
            .unwrap();
        assert_eq!(banner.message(), "Using cached rates from 12 minutes ago");

        assert_eq!(
            Banner::Offline { minutes: 1 }.message(),
            "You are offline. Showing cached rates from 1 minute ago"
        );
        assert!(session.banner_at(RateOrigin::Network, now).is_none());
    }
}
