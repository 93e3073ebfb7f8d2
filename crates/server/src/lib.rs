//! Foodgram API server library.
//!
//! Recipes, tags and ingredients, favorites, a shopping cart with a
//! consolidated shopping list, and subscriptions between users, served as a
//! JSON API. The library form lets the CLI and the integration tests reuse
//! the repositories and the router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
