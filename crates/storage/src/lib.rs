#![forbid(unsafe_code)]

//! SQLite-backed store for tags, values, tracked files and tag implications.

mod store;

pub use store::*;
