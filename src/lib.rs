pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::binding::{Event, Session, View};
use crate::cli::{interactive, render::render, ui};
use crate::core::cache::rates_key;
use crate::core::config::AppConfig;
use crate::core::validate::normalize_code;
use crate::core::{Connectivity, ConversionFlow, CurrencyListing, ExpiringCache};
use crate::providers::ExchangeRateApiProvider;
use crate::store::KeyValueStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Collection holding the currency list and every rate table.
const CACHE_COLLECTION: &str = "exchange_rates";

pub enum AppCommand {
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    List,
    Interactive,
    /// Drops one base currency's rates, or everything when `base` is `None`
    ClearCache { base: Option<String> },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
    /// Start with the offline flag set
    pub offline: bool,
    /// Keep the cache in memory for this run only
    pub no_persist: bool,
}

/// Everything a command needs, wired from configuration.
pub struct App {
    pub session: Session,
    pub cache: ExpiringCache,
}

impl App {
    pub fn from_config(config: &AppConfig, options: RunOptions) -> Result<Self> {
        let persist = config.persist_cache && !options.no_persist;
        let store = if persist {
            KeyValueStore::open(&config.default_data_path()?)
        } else {
            KeyValueStore::in_memory()
        };
        let cache = ExpiringCache::new(store.collection(CACHE_COLLECTION, persist));

        let provider_config = &config.providers.exchangerate;
        let source = Arc::new(ExchangeRateApiProvider::new(
            &provider_config.base_url,
            provider_config.request_timeout_secs.map(Duration::from_secs),
        )?);

        let connectivity = Connectivity::new(!options.offline);
        let flow = ConversionFlow::new(
            cache.clone(),
            source.clone(),
            connectivity.clone(),
            config.formatter()?,
        );
        let listing = CurrencyListing::new(cache.clone(), source, connectivity.clone());

        Ok(App {
            session: Session::new(flow, listing, connectivity),
            cache,
        })
    }
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    options: RunOptions,
) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let mut app = App::from_config(&config, options)?;

    match command {
        AppCommand::Convert { amount, from, to } => {
            let states = app.session.subscribe();
            let rendered = ui::with_conversion_spinner(
                "Converting...",
                states,
                app.session.handle(Event::Submit { amount, from, to }),
            )
            .await;
            finish(&rendered)
        }
        AppCommand::List => {
            let rendered =
                ui::with_spinner("Loading currencies...", app.session.handle(Event::Load)).await;
            finish(&rendered)
        }
        AppCommand::Interactive => interactive::run(&mut app.session).await,
        AppCommand::ClearCache { base: None } => {
            app.cache.clear().await;
            println!("Cache cleared");
            Ok(())
        }
        AppCommand::ClearCache { base: Some(base) } => {
            let base = normalize_code(&base);
            app.cache.delete(&rates_key(&base)).await;
            println!("Cleared cached rates for {base}");
            Ok(())
        }
    }
}

/// Prints a one-shot result; an error view becomes the command's error.
fn finish(rendered: &cli::binding::Rendered) -> Result<()> {
    if let View::Error(message) = &rendered.view {
        anyhow::bail!("{message}");
    }
    println!("{}", render(rendered));
    Ok(())
}
