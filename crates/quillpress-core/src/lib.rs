//! # Quillpress Core
//!
//! Core types, errors, and utilities for the Quillpress API.
//!
//! - [`errors`]: Application error type and its HTTP mapping
//! - [`pagination`]: Page/limit resolution and the paginated response envelope
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Deserializers for loosely-typed query parameters
//! - [`slug`]: Slug generation and per-collection uniqueness
//!
//! # Example
//!
//! ```ignore
//! use quillpress_core::errors::AppError;
//! use quillpress_core::pagination::PaginationParams;
//! use quillpress_core::slug::slugify;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Blog not found"));
//!
//! let window = PaginationParams::new(Some(2), Some(20)).window(10, 100);
//! assert_eq!(window.skip, 20);
//!
//! assert_eq!(slugify("My First Post"), "my-first-post");
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;
pub mod slug;

pub use errors::{AppError, ErrorKind};
pub use pagination::{PageWindow, Paginated, PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use slug::{ensure_unique, slugify};
