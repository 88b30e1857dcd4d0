use crate::SignalingService;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub connections: usize,
    pub rooms: usize,
}

pub async fn health(State(service): State<SignalingService>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        connections: service.registry().len(),
        rooms: service.directory().len(),
    })
}
