//! Exchange rate abstractions

use async_trait::async_trait;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Rates from one unit of a base currency to each listed currency.
///
/// Keeps the order in which the rates were received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: Vec<(String, f64)>,
}

impl RateTable {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, rate)| *rate)
    }

    /// Currency codes in received order.
    pub fn codes(&self) -> Vec<String> {
        self.rates.iter().map(|(code, _)| code.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = RateTable::default();
        for (code, rate) in iter {
            let code = code.into();
            match table.rates.iter_mut().find(|(c, _)| *c == code) {
                Some(existing) => existing.1 = rate,
                None => table.rates.push((code, rate)),
            }
        }
        table
    }
}

impl Serialize for RateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rates.len()))?;
        for (code, rate) in &self.rates {
            map.serialize_entry(code, rate)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RateTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RateTableVisitor;

        impl<'de> Visitor<'de> for RateTableVisitor {
            type Value = RateTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of currency codes to rates")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RateTable, A::Error> {
                let mut entries: Vec<(String, f64)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((code, rate)) = access.next_entry::<String, f64>()? {
                    entries.push((code, rate));
                }
                Ok(entries.into_iter().collect())
            }
        }

        deserializer.deserialize_map(RateTableVisitor)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for base currency: {base}")]
    Status { status: u16, base: String },
    #[error("Request error: {message} for base currency: {base}")]
    Transport {
        base: String,
        message: String,
        /// The connection could not be established at all
        connect: bool,
    },
    #[error("Failed to parse JSON response for {base}: {message}")]
    Parse { base: String, message: String },
}

impl FetchError {
    pub fn is_connect(&self) -> bool {
        matches!(self, FetchError::Transport { connect: true, .. })
    }
}

/// Source of exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Codes of every currency the source knows, in received order.
    async fn fetch_currency_list(&self) -> Result<Vec<String>, FetchError>;

    /// The full rate table for `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError>;
}
