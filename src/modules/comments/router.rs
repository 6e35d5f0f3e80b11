use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_comment, delete_comment, get_comment, get_comments, get_comments_by_blog,
    update_comment, update_comment_status,
};

pub fn init_comments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment).get(get_comments))
        .route("/blog/{blog_id}", get(get_comments_by_blog))
        .route(
            "/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route("/{id}/status", patch(update_comment_status))
}
