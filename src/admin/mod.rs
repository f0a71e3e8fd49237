pub(crate) mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/users/", get(handlers::list_users))
        .route("/users/:id/confirm_email", post(handlers::confirm_email))
        .route("/users/:id/unconfirm_email", post(handlers::unconfirm_email))
        .route("/users/:id/change_password", post(handlers::change_password))
        .route("/users/:id/revoke_token", post(handlers::revoke_token))
        .route("/users/:id/delete_user", post(handlers::delete_user))
}
