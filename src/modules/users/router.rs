use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{delete_user, get_user, get_user_by_username, get_users};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/username/{username}", get(get_user_by_username))
        .route("/{id}", get(get_user).delete(delete_user))
}
