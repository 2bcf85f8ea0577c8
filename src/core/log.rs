use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset or unparseable.
fn fallback_directives(verbose: bool) -> &'static str {
    if verbose { "fxconv=debug" } else { "off" }
}

/// `RUST_LOG` directives win over the `--verbose` switch.
fn log_filter(verbose: bool, env_directives: Option<&str>) -> EnvFilter {
    env_directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback_directives(verbose)))
}

pub fn init_logging(verbose: bool) {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(log_filter(verbose, env_directives.as_deref()))
        .init();
}
