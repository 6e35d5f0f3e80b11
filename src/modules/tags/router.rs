use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_tag, delete_tag, get_tag, get_tag_by_slug, get_tags, update_tag};

pub fn init_tags_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tag).get(get_tags))
        .route("/slug/{slug}", get(get_tag_by_slug))
        .route("/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}
