//! User-facing failures of a conversion or currency listing

use super::rates::FetchError;
use super::validate::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("You are offline and no cached rate is available for {from} to {to}. Please reconnect and try again.")]
    OfflineUnavailable { from: String, to: String },
    #[error("Lost network connection while fetching rates. Please check your connection and try again.")]
    Connectivity(#[source] FetchError),
    #[error("Failed to convert currency. Please try again later.")]
    Fetch(#[source] FetchError),
    #[error("No exchange rate available from {from} to {to}.")]
    MissingRate { from: String, to: String },
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("You are offline and the currency list has not been cached yet. Please reconnect and try again.")]
    OfflineUnavailable,
    #[error("Failed to load currencies. Please try again later.")]
    Fetch(#[source] FetchError),
}
