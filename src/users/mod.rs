pub(crate) mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::register))
        .route("/get-auth-token", post(handlers::get_auth_token))
        .route(
            "/account",
            get(handlers::user_profile).put(handlers::change_password),
        )
        .route("/confirm/:token", get(handlers::confirm_email))
        .route(
            "/resend_email_confirmation",
            get(handlers::resend_email_confirmation),
        )
        .route("/forgot-password", put(handlers::forgot_password))
        .route(
            "/password_reset_via_token/:token",
            get(handlers::reset_password_report).post(handlers::reset_password),
        )
}
