// MangaHub state managers
// Managers hold application state: progress, settings, search, reader and navigation.

pub mod navigation;
pub mod progress_store;
pub mod reader_view;
pub mod search_debouncer;
pub mod settings_store;
