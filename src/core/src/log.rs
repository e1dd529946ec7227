use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber. `debug` raises the default
/// level from `info` to `debug`; `RUST_LOG` always takes precedence.
pub fn init(debug: bool) {
	let default_directive = if debug { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	let registry = tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(true));

	// Installing twice (e.g. from repeated test setup) is harmless to ignore.
	let _ = registry.try_init();
}
