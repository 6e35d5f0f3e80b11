use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_blog, delete_blog, get_blog, get_blog_by_slug, get_blogs, get_my_blogs, toggle_like,
    update_blog,
};

pub fn init_blogs_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_blog).get(get_blogs))
        .route("/my", get(get_my_blogs))
        .route("/slug/{slug}", get(get_blog_by_slug))
        .route("/{id}", get(get_blog).put(update_blog).delete(delete_blog))
        .route("/{id}/like", post(toggle_like))
}
