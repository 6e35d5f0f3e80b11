pub mod auth;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod health;
pub mod tags;
pub mod users;
