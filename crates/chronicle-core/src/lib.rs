//! Core types and trait definitions for the chronicle archive.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! The store backend and the archive engine both depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attachment;
pub mod chronicle;
pub mod error;
pub mod store;
pub mod tags;

pub use error::{Error, Result};
