use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use gliderd_core::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::{adapter::BatchSystemAdapter, snapshot::JobSnapshot};

struct Inner {
	snapshot: Arc<JobSnapshot>,
	refreshed_at: Instant,
}

/// Time-bounded cache over the batch system's job snapshot. `get` refreshes
/// the snapshot when it's older than `cache_timeout`; concurrent callers
/// that all observe a stale snapshot coalesce onto a single refresh rather
/// than each issuing their own batch-system query.
pub struct SnapshotCache<A> {
	adapter: A,
	cache_timeout: Duration,
	inner: RwLock<Inner>,
	refresh_gate: Mutex<()>,
}

impl<A: BatchSystemAdapter> SnapshotCache<A> {
	pub async fn new(adapter: A, cache_timeout: Duration) -> Result<Self> {
		let snapshot = adapter.fetch_snapshot().await?;
		Ok(Self {
			adapter,
			cache_timeout,
			inner: RwLock::new(Inner { snapshot: Arc::new(snapshot), refreshed_at: Instant::now() }),
			refresh_gate: Mutex::new(()),
		})
	}

	/// Refresh if stale, then return the current snapshot.
	pub async fn get(&self) -> Result<Arc<JobSnapshot>> {
		if self.is_stale().await {
			self.refresh_if_still_stale().await?;
		}
		Ok(self.get_cached().await)
	}

	/// Return whatever snapshot is currently cached without triggering a
	/// refresh, even if it's stale.
	pub async fn get_cached(&self) -> Arc<JobSnapshot> { self.inner.read().await.snapshot.clone() }

	/// Pass through to the adapter's token fetch — not part of the
	/// cached snapshot, but handlers that hold a `SnapshotCache` have no
	/// other way to reach the adapter.
	pub async fn fetch_startd_token(&self) -> Result<Vec<u8>> { self.adapter.fetch_startd_token().await }

	async fn is_stale(&self) -> bool { self.inner.read().await.refreshed_at.elapsed() >= self.cache_timeout }

	async fn refresh_if_still_stale(&self) -> Result<()> {
		let _gate = self.refresh_gate.lock().await;

		// Someone else may have refreshed while we waited for the gate.
		if !self.is_stale().await {
			return Ok(());
		}

		debug!("refreshing job snapshot cache");
		let snapshot = self.adapter.fetch_snapshot().await?;
		let mut inner = self.inner.write().await;
		inner.snapshot = Arc::new(snapshot);
		inner.refreshed_at = Instant::now();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use async_trait::async_trait;

	use super::*;

	struct CountingAdapter {
		calls: AtomicUsize,
	}

	#[async_trait]
	impl BatchSystemAdapter for CountingAdapter {
		async fn fetch_snapshot(&self) -> Result<JobSnapshot> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(JobSnapshot::default())
		}

		async fn fetch_startd_token(&self) -> Result<Vec<u8>> { Ok(Vec::new()) }
	}

	#[tokio::test]
	async fn concurrent_refreshes_coalesce() {
		let adapter = CountingAdapter { calls: AtomicUsize::new(0) };
		let cache = Arc::new(SnapshotCache::new(adapter, Duration::from_millis(0)).await.unwrap());

		// The constructor already did one fetch; drive several concurrent
		// `get()`s through the same staleness window and confirm they
		// don't each issue their own refresh.
		let mut tasks = Vec::new();
		for _ in 0..8 {
			let cache = cache.clone();
			tasks.push(tokio::spawn(async move { cache.get().await.unwrap() }));
		}
		for t in tasks {
			t.await.unwrap();
		}

		assert!(cache.adapter.calls.load(Ordering::SeqCst) <= 2);
	}

	#[tokio::test]
	async fn get_cached_never_blocks_on_refresh() {
		let adapter = CountingAdapter { calls: AtomicUsize::new(0) };
		let cache = SnapshotCache::new(adapter, Duration::from_secs(3600)).await.unwrap();
		let snap = cache.get_cached().await;
		assert!(snap.classes().next().is_none());
		assert_eq!(cache.adapter.calls.load(Ordering::SeqCst), 1);
	}
}
