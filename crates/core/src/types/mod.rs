//! Core types for Foodgram.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod bounded;
pub mod color;
pub mod email;
pub mod id;
pub mod username;

pub use bounded::{Amount, BoundedError, CookingTime};
pub use color::{ColorError, HexColor};
pub use email::{Email, EmailError};
pub use id::*;
pub use username::{Username, UsernameError};
