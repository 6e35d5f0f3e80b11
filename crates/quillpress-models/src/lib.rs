//! # Quillpress Models
//!
//! Domain models and DTOs for the Quillpress API: database rows, request
//! payloads with their validation rules, response shapes, and the filter
//! parameters of every listing endpoint.
//!
//! # Modules
//!
//! - [`auth`]: registration, login and token responses
//! - [`blogs`]: blog posts, likes and blog filters
//! - [`categories`]: categories
//! - [`comments`]: comments, replies and moderation
//! - [`tags`]: tags
//! - [`users`]: users and profiles
//!
//! Every `*FilterParams` type exposes `predicate()`, which turns the present
//! filter fields into a [`quillpress_db::Predicate`].

pub mod auth;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod tags;
pub mod users;

pub use auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
pub use blogs::{Blog, BlogFilterParams, BlogStatus, BlogWithRelations, LikeResponse};
pub use categories::{Category, CategorySummary, CategoryWithCount};
pub use comments::{Comment, CommentFilterParams, CommentStatus, CommentWithAuthor, ParentFilter};
pub use tags::{Tag, TagSummary, TagWithCount};
pub use users::{Profile, User, UserDetail, UserSummary};
