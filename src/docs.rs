use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use quillpress_auth::AuthPayload;
use quillpress_core::{PaginationMeta, PaginationParams};
use quillpress_models::auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
use quillpress_models::blogs::{
    Blog, BlogStatus, BlogWithRelations, CreateBlogDto, LikeResponse, UpdateBlogDto,
};
use quillpress_models::categories::{
    Category, CategorySummary, CategoryWithCount, CreateCategoryDto, UpdateCategoryDto,
};
use quillpress_models::comments::{
    Comment, CommentReply, CommentStatus, CommentWithAuthor, CreateCommentDto, UpdateCommentDto,
    UpdateCommentStatusDto,
};
use quillpress_models::tags::{CreateTagDto, Tag, TagSummary, TagWithCount, UpdateTagDto};
use quillpress_models::users::{
    Profile, UpsertProfileDto, User, UserCounts, UserDetail, UserSummary,
};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::health::controller::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_profile,
        crate::modules::auth::controller::update_profile,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::get_user_by_username,
        crate::modules::users::controller::delete_user,
        crate::modules::blogs::controller::create_blog,
        crate::modules::blogs::controller::get_blogs,
        crate::modules::blogs::controller::get_my_blogs,
        crate::modules::blogs::controller::get_blog,
        crate::modules::blogs::controller::get_blog_by_slug,
        crate::modules::blogs::controller::update_blog,
        crate::modules::blogs::controller::delete_blog,
        crate::modules::blogs::controller::toggle_like,
        crate::modules::comments::controller::create_comment,
        crate::modules::comments::controller::get_comments,
        crate::modules::comments::controller::get_comments_by_blog,
        crate::modules::comments::controller::get_comment,
        crate::modules::comments::controller::update_comment,
        crate::modules::comments::controller::update_comment_status,
        crate::modules::comments::controller::delete_comment,
        crate::modules::categories::controller::create_category,
        crate::modules::categories::controller::get_categories,
        crate::modules::categories::controller::get_category,
        crate::modules::categories::controller::get_category_by_slug,
        crate::modules::categories::controller::update_category,
        crate::modules::categories::controller::delete_category,
        crate::modules::tags::controller::create_tag,
        crate::modules::tags::controller::get_tags,
        crate::modules::tags::controller::get_tag,
        crate::modules::tags::controller::get_tag_by_slug,
        crate::modules::tags::controller::update_tag,
        crate::modules::tags::controller::delete_tag,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageResponse,
            AuthPayload,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            User,
            UserSummary,
            UserCounts,
            UserDetail,
            Profile,
            UpsertProfileDto,
            Blog,
            BlogStatus,
            BlogWithRelations,
            CreateBlogDto,
            UpdateBlogDto,
            LikeResponse,
            Comment,
            CommentStatus,
            CommentReply,
            CommentWithAuthor,
            CreateCommentDto,
            UpdateCommentDto,
            UpdateCommentStatusDto,
            Category,
            CategorySummary,
            CategoryWithCount,
            CreateCategoryDto,
            UpdateCategoryDto,
            Tag,
            TagSummary,
            TagWithCount,
            CreateTagDto,
            UpdateTagDto,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Registration, login and the caller's profile"),
        (name = "Users", description = "User lookup and account deletion"),
        (name = "Blogs", description = "Blog posts and likes"),
        (name = "Comments", description = "Comments, replies and moderation"),
        (name = "Categories", description = "Blog categories"),
        (name = "Tags", description = "Blog tags")
    ),
    info(
        title = "Quillpress API",
        version = "0.1.0",
        description = "Blog platform REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/health",
            "/api/auth/login",
            "/api/blogs/{id}/like",
            "/api/comments/{id}/status",
            "/api/metadata/categories/slug/{slug}",
            "/api/metadata/tags/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
