use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise structured logging.
///
/// `RUST_LOG` controls the level (default `info`). JSON lines unless `pretty`
/// is set, which the `dev` platform uses. `log` records from middleware are
/// bridged into the same subscriber.
pub fn init_telemetry(pretty: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if pretty {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout).pretty())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout).json())
            .init();
    }
}
