use crate::responses::Envelope;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn get_index_route() -> Envelope<Health> {
    Envelope::success(
        "Student records API is running",
        Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

pub async fn route_not_found() -> (StatusCode, Envelope<()>) {
    (
        StatusCode::NOT_FOUND,
        Envelope::failure("Route not found", None),
    )
}
