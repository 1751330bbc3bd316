//! # sonda-server
//!
//! The mock backend: four user-lifecycle endpoints over a synthetic
//! failure injector. Stateless by design — no identifier is remembered
//! between calls, so every request is judged on its own.
//!
//! Static assets and page delivery are not this crate's concern; it only
//! speaks JSON under `/api`.

pub mod fault;
pub mod routes;

pub use fault::{DEFAULT_LIST_FAILURE_RATE, FAULT_CATALOG, Fault, FaultInjector, Operation};
pub use routes::{AppState, router};

use std::net::SocketAddr;
use tracing::info;

/// Binds the given port on all interfaces and serves the API until the
/// task is dropped or the process exits.
pub async fn serve(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API simulada escutando em http://{addr}");
    axum::serve(listener, router(state)).await
}
