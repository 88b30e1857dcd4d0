use crate::SignalingService;
use crate::http::ApiError;
use crate::room::RoomInfo;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::{ErrorCode, RoomId};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_id: String,
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: RoomId,
    pub has_secret: bool,
}

#[derive(Debug, Serialize)]
pub struct Validation {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

pub async fn create_room(
    State(service): State<SignalingService>,
    Json(req): Json<RoomRequest>,
) -> Result<(StatusCode, Json<RoomCreated>), ApiError> {
    let room_id = service.coordinator().parse_room_id(&req.room_id)?;
    let has_secret = req.secret.as_deref().is_some_and(|s| !s.is_empty());

    service.directory().create(&room_id, req.secret)?;
    info!(room = %room_id, has_secret, "Room created over HTTP");

    Ok((
        StatusCode::CREATED,
        Json(RoomCreated {
            room_id,
            has_secret,
        }),
    ))
}

pub async fn validate_room(
    State(service): State<SignalingService>,
    Json(req): Json<RoomRequest>,
) -> Result<Json<Validation>, ApiError> {
    let coordinator = service.coordinator();
    let room_id = coordinator.parse_room_id(&req.room_id)?;
    let error = coordinator.validate(&room_id, req.secret).await.err();

    Ok(Json(Validation {
        ok: error.is_none(),
        error,
    }))
}

pub async fn list_rooms(State(service): State<SignalingService>) -> Json<Vec<RoomInfo>> {
    Json(service.directory().list().await)
}

pub async fn room_info(
    State(service): State<SignalingService>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfo>, ApiError> {
    let room_id = service.coordinator().parse_room_id(&room_id)?;
    service
        .directory()
        .info(&room_id)
        .await
        .map(Json)
        .ok_or_else(|| ErrorCode::RoomNotFound.into())
}

pub async fn delete_room(
    State(service): State<SignalingService>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let room_id = service.coordinator().parse_room_id(&room_id)?;
    service.directory().delete(&room_id).await;
    Ok(StatusCode::NO_CONTENT)
}
