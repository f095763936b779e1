//! View models handed to the rendering layer.
//!
//! Everything here is plain data: the host turns it into UI however it likes.

use serde::Serialize;

use super::settings::ReadingMode;

/// Cover shown when a series has no cover or its cover fails to load.
pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/300x450?text=No+Cover";

/// The single active view, tagged by name.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    Catalog(CatalogViewModel),
    ChapterList(ChapterListViewModel),
    Reader(ReaderViewModel),
}

impl ViewModel {
    /// The app header (title bar, search box) is hidden while reading.
    pub fn header_visible(&self) -> bool {
        !matches!(self, ViewModel::Reader(_))
    }
}

/// A list fetched from the API, in one of its four display states.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListStatus<T> {
    Loading,
    /// The fetch succeeded with zero items.
    Empty,
    Loaded { items: Vec<T> },
    /// The fetch failed; the host shows `message` and a retry control.
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogViewModel {
    pub query: String,
    pub status: ListStatus<SeriesCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesCard {
    pub id: String,
    pub title: String,
    pub cover_url: String,
    /// Image to swap in if `cover_url` fails to load.
    pub fallback_cover_url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChapterListViewModel {
    pub series_id: String,
    pub series_title: String,
    pub status: ListStatus<ChapterRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChapterRow {
    pub id: String,
    pub label: String,
    /// e.g. `#12`.
    pub number_label: String,
    /// Set on the chapter the stored progress points at.
    pub continue_reading: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReaderViewModel {
    pub series_id: String,
    pub chapter_id: String,
    pub status: ReaderStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReaderStatus {
    Loading,
    Error { message: String },
    Ready(ReaderPageSet),
}

/// A rendered chapter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReaderPageSet {
    pub mode: ReadingMode,
    pub pages: Vec<PageView>,
    /// Page shown on its own in horizontal mode; `None` in vertical mode.
    pub visible_page: Option<usize>,
    /// `"{n} / {total}"`, one-based.
    pub indicator: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageView {
    pub index: usize,
    pub url: String,
    /// Whether the host should fetch this image now.
    pub load: bool,
    pub status: ImageStatus,
    /// Bumped on every manual reload so the host can bust its image cache.
    pub reload_nonce: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Loading,
    Loaded,
    /// Render a placeholder with a tap-to-reload affordance.
    Failed,
}
