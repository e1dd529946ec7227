use std::sync::Arc;

use gliderd_core::Config;
use gliderd_registry::ClientRegistry;
use gliderd_snapshot::{BatchSystemAdapter, SnapshotCache};

/// Shared, process-wide state every handler closes over. Cheap to clone —
/// every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub registry: Arc<ClientRegistry>,
	pub snapshots: Arc<SnapshotCache<Arc<dyn BatchSystemAdapter>>>,
}
