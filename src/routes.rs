// routes.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/polls/", get(handlers::index))
        .route("/polls/{question_id}/", get(handlers::detail))
        .route("/polls/{question_id}/results/", get(handlers::results))
        .route("/polls/{question_id}/vote/", post(handlers::vote))
        .route(
            "/polls/triangle/",
            get(handlers::triangle_form).post(handlers::submit_triangle),
        )
        .route(
            "/polls/person/",
            get(handlers::person_form).post(handlers::create_person),
        )
        .route(
            "/polls/person/{person_id}/",
            get(handlers::person_detail).post(handlers::update_person),
        )
        .route("/admin/questions", post(handlers::create_question))
        .route("/health", get(handlers::health))
        .with_state(state)
}
