//! Conversion logic and its abstractions

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod convert;
pub mod error;
pub mod format;
pub mod listing;
pub mod log;
pub mod rates;
pub mod validate;

// Re-export main types for cleaner imports
pub use cache::{ExpiringCache, KeyValueCollection};
pub use connectivity::Connectivity;
pub use convert::{Conversion, ConversionFlow, ConversionState, RateOrigin};
pub use error::{ConvertError, ListingError};
pub use listing::{CurrencyList, CurrencyListing};
pub use rates::{FetchError, RateSource, RateTable};
