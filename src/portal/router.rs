use axum::{
    Router,
    routing::{get, post},
};

use crate::portal::{PortalState, auth, students};

pub fn build_router(state: PortalState) -> Router {
    Router::new()
        .route("/", get(students::root))
        .route(
            "/auth/login",
            get(auth::login_page).post(auth::process_login),
        )
        .route("/auth/logout", get(auth::logout))
        .route("/home/index", get(students::index))
        .route("/home/addstudent", get(students::add_student))
        .route("/home/save", post(students::save))
        .route("/home/delete", post(students::delete))
        .with_state(state)
}
