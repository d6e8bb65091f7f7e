//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the `DbActor` owning the pool, plus its handle
//! - `key_store.rs`: `KeyStore` on top of the handle

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

mod key_store;
mod patch_impl;

pub use models::{ApiKey, BlogPost, KeyId, UsageUpdate};
pub use patch::{DbPatchable, KeyPatch, KeyUpdate, NewApiKey, NewBlogPost};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, spawn};
