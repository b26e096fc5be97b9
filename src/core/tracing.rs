use std::env;
use std::str::FromStr;

use tracing::Subscriber;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

const LOG_LEVEL_VAR: &str = "FANOUT_LOG_LEVEL";

pub fn default_tracing() -> impl Subscriber {
    let level = env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|v| tracing::Level::from_str(&v).ok())
        // use the log level from the env if there is one, otherwise use the default.
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish()
        .with(default_filter_target())
}

pub fn default_filter_target<S: Subscriber>() -> impl Layer<S> {
    filter_fn(|metadata| metadata.target().starts_with("graphql_fanout"))
}

/// Installs [`default_tracing`] as the global subscriber. Returns `false` if
/// one was already installed.
pub fn init_tracing() -> bool {
    tracing::subscriber::set_global_default(default_tracing()).is_ok()
}
