//! MangaHub: the core of a manga reading client.
//!
//! This library crate exposes all modules for use by the bridge binary and
//! integration tests.

pub mod app;
pub mod bridge;
pub mod config;
pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
