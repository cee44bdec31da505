//! Posts domain module.
//!
//! This crate contains the rules for blog posts, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod post;

pub use post::{NewPost, Post, PostChanges};
