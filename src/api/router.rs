use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::api::{ApiState, auth, students};

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/home/index", get(students::index))
        .route("/home/getstudentbyid", get(students::get_student_by_id))
        .route("/home/save", post(students::save))
        .route("/home/deletebyid", delete(students::delete_by_id))
        .route("/home/get/:file_name", get(students::get_image))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
