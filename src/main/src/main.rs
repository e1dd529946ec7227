use std::{sync::Arc, time::Duration};

use gliderd_api::AppState;
use gliderd_core::{Config, Result};
use gliderd_registry::ClientRegistry;
use gliderd_snapshot::{BatchSystemAdapter, CondorAdapter, SnapshotCache};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
	let config = Config::load()?;
	gliderd_core::log::init(config.debug);

	info!(version = env!("CARGO_PKG_VERSION"), "starting gliderd");

	let adapter: Arc<dyn BatchSystemAdapter> = Arc::new(CondorAdapter::new(config.collector_address.clone()));
	let snapshots = Arc::new(SnapshotCache::new(adapter, Duration::from_secs(config.cache_timeout)).await?);
	let registry = Arc::new(ClientRegistry::new());
	let bind_addr = config.bind_addr();
	let state = AppState { config: Arc::new(config), registry, snapshots };

	let app = gliderd_router::build(state);
	gliderd_router::serve(&bind_addr, app).await
}
