// MangaHub shared type definitions
// Each submodule defines types used across the application.

pub mod catalog;
pub mod errors;
pub mod progress;
pub mod settings;
pub mod view;
