use crate::{
    routes::{
        index::{get_index_route, route_not_found},
        students::{delete_student, get_student, get_students, post_student, put_student},
    },
    state::RollcallState,
};
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod index;
pub mod students;

pub fn router(state: RollcallState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route("/api/v1/students", get(get_students).post(post_student))
        .route(
            "/api/v1/students/{student_id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
