//! HTTP surface for the request parser.

mod router;
mod state;

pub use router::{build_router, ApiError, SERVICE_NAME};
pub use state::AppState;

use crate::error::{AgentError, Result};
use tracing::info;

/// Bind `address` and serve the API until the process is stopped.
pub async fn serve(address: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|err| AgentError::Config(format!("failed to bind {address}: {err}")))?;

    info!(
        target: "trip_agent::server",
        %address,
        ready = state.is_ready(),
        "serving trip request API"
    );

    axum::serve(listener, build_router(state))
        .await
        .map_err(|err| AgentError::Unknown(format!("server error: {err}")))
}
