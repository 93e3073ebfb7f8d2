//! Foodgram Core - Shared domain types.
//!
//! This crate provides the types used across all Foodgram components:
//! - `server` - JSON API consumed by the single-page frontend
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and their validation rules - no I/O,
//! no database access, no HTTP. Database encoding is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, usernames, colors and
//!   bounded recipe quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
