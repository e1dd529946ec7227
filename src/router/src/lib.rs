//! Router assembly and the serve loop: wraps the API's routes with the
//! tracing/CORS middleware every handler gets, binds a listener, and
//! serves until a shutdown signal arrives.

use gliderd_api::AppState;
use gliderd_core::Result;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Build the full middleware-wrapped router for `state`.
pub fn build(state: AppState) -> axum::Router {
	gliderd_api::router(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Bind `addr` and serve `app` until SIGINT/SIGTERM, then let in-flight
/// requests finish. Snapshot refreshes already in flight are not
/// cancelled by this — they run to completion inside their own task
/// regardless of the listener shutting down.
pub async fn serve(addr: &str, app: axum::Router) -> Result<()> {
	let listener = TcpListener::bind(addr).await?;
	info!(%addr, "listening");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c().await.expect("failed to install ctrl-c handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install SIGTERM handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	info!("shutdown signal received");
}
