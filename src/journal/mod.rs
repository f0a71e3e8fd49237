pub(crate) mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_entries).post(handlers::create_entry))
        .route(
            "/:id",
            get(handlers::get_entry)
                .put(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
}
