//! # Fyyur Common Library
//!
//! Shared code for the Fyyur listing service:
//! - Entity model (venues, artists, shows)
//! - SQLite store with transactional writes
//! - View projections (past/upcoming shows, city/state grouping)
//! - Typed form payloads and validation
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod projections;
pub mod time;

pub use error::{Error, Result};
