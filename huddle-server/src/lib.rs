//! Signaling and room coordination for browser peer-to-peer calls.
//!
//! ```text
//! WebSocket (/ws) ──> SignalingService::dispatch
//!                        │  offer / answer / candidate ──> target's outbound queue
//!                        ▼
//!                  MembershipCoordinator
//!                        │  join / leave / kick / lock / chat
//!                        ▼
//!     RoomDirectory ──> Room actor (one task per room) ──> ConnectionRegistry
//! ```

pub mod config;
pub mod http;
pub mod membership;
pub mod registry;
pub mod room;
pub mod signaling;

pub use config::HuddleConfig;
pub use membership::MembershipCoordinator;
pub use registry::{Connection, ConnectionRegistry, MembershipState};
pub use room::{JoinOutcome, RoomCommand, RoomDirectory, RoomHandle, RoomInfo};
pub use signaling::{SignalingService, ws_handler};

use axum::Router;
use axum::routing::{get, post};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(http::health))
        .route("/api/rooms", get(http::list_rooms).post(http::create_room))
        .route("/api/rooms/validate", post(http::validate_room))
        .route(
            "/api/rooms/{room_id}",
            get(http::room_info).delete(http::delete_room),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

/// Binds `config.bind` and serves until `shutdown` resolves.
pub async fn serve<F>(config: HuddleConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let service = SignalingService::new(&config);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Signaling server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Signaling server stopped");
    Ok(())
}
