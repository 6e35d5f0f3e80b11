use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_category, delete_category, get_categories, get_category, get_category_by_slug,
    update_category,
};

pub fn init_categories_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category).get(get_categories))
        .route("/slug/{slug}", get(get_category_by_slug))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}
