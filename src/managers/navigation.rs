//! Navigation Controller for MangaHub.
//!
//! Owns the application state: the catalog, and exactly one active view
//! (catalog, chapter list or reader). UI events come in as [`NavEvent`]s and
//! may produce an [`Effect`] (a fetch to run). Fetch results come back as
//! [`Completion`]s tagged with the generation they were issued under; only
//! the latest generation of each fetch kind is ever applied.

use std::fmt;
use std::time::Instant;

use tracing::debug;

use super::progress_store::ProgressStoreTrait;
use super::reader_view::ReaderView;
use crate::types::catalog::{Chapter, ChapterPages, Series};
use crate::types::errors::{ConnectionError, LoadError};
use crate::types::settings::ReadingMode;
use crate::types::view::{
    CatalogViewModel, ChapterListViewModel, ChapterRow, ListStatus, ReaderStatus,
    ReaderViewModel, SeriesCard, ViewModel, PLACEHOLDER_COVER_URL,
};

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// Fetch the catalog for `query` (already debounced). Valid in any view.
    LoadCatalog { query: String },
    SelectSeries { series_id: String },
    SelectChapter { chapter_id: String },
    /// Chapter list → catalog.
    Back,
    /// Reader → chapter list.
    ExitReader,
    PreviousChapter,
    NextChapter,
    /// Re-issue the failed fetch of the active view.
    Retry,
}

/// A fetch the runtime must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSeries { query: String, generation: u64 },
    FetchChapters { series_id: String, generation: u64 },
    FetchPages { chapter_id: String, generation: u64 },
}

/// The outcome of an [`Effect`].
#[derive(Debug, Clone)]
pub enum Completion {
    SeriesLoaded {
        generation: u64,
        result: Result<Vec<Series>, ConnectionError>,
    },
    ChaptersLoaded {
        generation: u64,
        result: Result<Vec<Chapter>, ConnectionError>,
    },
    PagesLoaded {
        generation: u64,
        result: Result<ChapterPages, LoadError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T, E> {
    Loading,
    Loaded(T),
    Failed(E),
}

impl<T, E> From<Result<T, E>> for FetchState<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => FetchState::Loaded(value),
            Err(e) => FetchState::Failed(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    pub query: String,
    pub status: FetchState<Vec<Series>, ConnectionError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterListState {
    pub series: SeriesRef,
    pub chapters: FetchState<Vec<Chapter>, ConnectionError>,
}

#[derive(Debug, Clone)]
pub enum ReaderContent {
    Loading,
    Ready(ReaderView),
    Failed(LoadError),
}

#[derive(Debug, Clone)]
pub struct ReaderState {
    /// Restored when the reader is exited.
    pub chapter_list: ChapterListState,
    pub chapter_id: String,
    pub content: ReaderContent,
}

#[derive(Debug, Clone)]
pub enum View {
    Catalog,
    ChapterList(ChapterListState),
    Reader(ReaderState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewName {
    Catalog,
    ChapterList,
    Reader,
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewName::Catalog => write!(f, "catalog"),
            ViewName::ChapterList => write!(f, "chapter_list"),
            ViewName::Reader => write!(f, "reader"),
        }
    }
}

impl View {
    pub fn name(&self) -> ViewName {
        match self {
            View::Catalog => ViewName::Catalog,
            View::ChapterList(_) => ViewName::ChapterList,
            View::Reader(_) => ViewName::Reader,
        }
    }
}

#[derive(Debug, Default)]
struct Generations {
    series: u64,
    chapters: u64,
    pages: u64,
}

#[derive(Clone, Copy)]
enum Direction {
    Previous,
    Next,
}

pub struct NavigationController {
    catalog: CatalogState,
    view: View,
    generations: Generations,
}

impl NavigationController {
    /// Starts on the catalog view with no fetch issued yet.
    pub fn new() -> Self {
        Self {
            catalog: CatalogState {
                query: String::new(),
                status: FetchState::Loading,
            },
            view: View::Catalog,
            generations: Generations::default(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_name(&self) -> ViewName {
        self.view.name()
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    /// The open chapter, once its pages have loaded.
    pub fn reader(&self) -> Option<&ReaderView> {
        match &self.view {
            View::Reader(ReaderState {
                content: ReaderContent::Ready(view),
                ..
            }) => Some(view),
            _ => None,
        }
    }

    pub fn reader_mut(&mut self) -> Option<&mut ReaderView> {
        match &mut self.view {
            View::Reader(ReaderState {
                content: ReaderContent::Ready(view),
                ..
            }) => Some(view),
            _ => None,
        }
    }

    /// Applies a user event and returns the fetch it requires, if any.
    ///
    /// Events that make no sense in the current view are ignored.
    pub fn handle(&mut self, event: NavEvent) -> Option<Effect> {
        let view = std::mem::replace(&mut self.view, View::Catalog);
        let (view, effect) = self.transition(view, event);
        self.view = view;
        effect
    }

    fn transition(&mut self, view: View, event: NavEvent) -> (View, Option<Effect>) {
        match (view, event) {
            (view, NavEvent::LoadCatalog { query }) => {
                let effect = self.fetch_series(query);
                (view, Some(effect))
            }
            (View::Catalog, NavEvent::SelectSeries { series_id }) => {
                let series = SeriesRef {
                    title: self.series_title(&series_id),
                    id: series_id,
                };
                let effect = self.fetch_chapters(&series.id);
                let list = ChapterListState {
                    series,
                    chapters: FetchState::Loading,
                };
                (View::ChapterList(list), Some(effect))
            }
            (View::ChapterList(list), NavEvent::SelectChapter { chapter_id }) => {
                let effect = self.fetch_pages(&chapter_id);
                let reader = ReaderState {
                    chapter_list: list,
                    chapter_id,
                    content: ReaderContent::Loading,
                };
                (View::Reader(reader), Some(effect))
            }
            (View::ChapterList(_), NavEvent::Back) => (View::Catalog, None),
            (View::Reader(reader), NavEvent::ExitReader) => {
                (View::ChapterList(reader.chapter_list), None)
            }
            (View::Reader(reader), NavEvent::PreviousChapter) => {
                self.step_chapter(reader, Direction::Previous)
            }
            (View::Reader(reader), NavEvent::NextChapter) => {
                self.step_chapter(reader, Direction::Next)
            }
            (View::Reader(mut reader), NavEvent::Retry)
                if matches!(reader.content, ReaderContent::Failed(_)) =>
            {
                reader.content = ReaderContent::Loading;
                let effect = self.fetch_pages(&reader.chapter_id);
                (View::Reader(reader), Some(effect))
            }
            (View::ChapterList(mut list), NavEvent::Retry)
                if matches!(list.chapters, FetchState::Failed(_)) =>
            {
                list.chapters = FetchState::Loading;
                let effect = self.fetch_chapters(&list.series.id);
                (View::ChapterList(list), Some(effect))
            }
            (View::Catalog, NavEvent::Retry)
                if matches!(self.catalog.status, FetchState::Failed(_)) =>
            {
                let query = self.catalog.query.clone();
                let effect = self.fetch_series(query);
                (View::Catalog, Some(effect))
            }
            (view, event) => {
                debug!(?event, view = %view.name(), "event ignored");
                (view, None)
            }
        }
    }

    /// Moves to the neighbouring chapter. A missing neighbour, or a chapter
    /// that has not finished loading, leaves the reader untouched.
    fn step_chapter(&mut self, reader: ReaderState, direction: Direction) -> (View, Option<Effect>) {
        let target = match &reader.content {
            ReaderContent::Ready(view) => match direction {
                Direction::Previous => view.prev_chapter(),
                Direction::Next => view.next_chapter(),
            }
            .map(str::to_string),
            _ => None,
        };

        match target {
            Some(chapter_id) => {
                let effect = self.fetch_pages(&chapter_id);
                let next = ReaderState {
                    chapter_list: reader.chapter_list,
                    chapter_id,
                    content: ReaderContent::Loading,
                };
                (View::Reader(next), Some(effect))
            }
            None => (View::Reader(reader), None),
        }
    }

    fn fetch_series(&mut self, query: String) -> Effect {
        self.generations.series += 1;
        self.catalog = CatalogState {
            query: query.clone(),
            status: FetchState::Loading,
        };
        Effect::FetchSeries {
            query,
            generation: self.generations.series,
        }
    }

    fn fetch_chapters(&mut self, series_id: &str) -> Effect {
        self.generations.chapters += 1;
        Effect::FetchChapters {
            series_id: series_id.to_string(),
            generation: self.generations.chapters,
        }
    }

    fn fetch_pages(&mut self, chapter_id: &str) -> Effect {
        self.generations.pages += 1;
        Effect::FetchPages {
            chapter_id: chapter_id.to_string(),
            generation: self.generations.pages,
        }
    }

    fn series_title(&self, series_id: &str) -> String {
        match &self.catalog.status {
            FetchState::Loaded(series) => series
                .iter()
                .find(|s| s.id == series_id)
                .map(|s| s.title.clone())
                .unwrap_or_else(|| series_id.to_string()),
            _ => series_id.to_string(),
        }
    }

    /// Applies a fetch result. Returns `false` when it was stale (a newer
    /// fetch of the same kind was issued since) or no longer has a view to
    /// land in.
    pub fn complete(
        &mut self,
        completion: Completion,
        mode: ReadingMode,
        progress: &dyn ProgressStoreTrait,
        now: Instant,
    ) -> bool {
        match completion {
            Completion::SeriesLoaded { generation, result } => {
                if generation != self.generations.series {
                    debug!(generation, latest = self.generations.series, "dropping stale catalog");
                    return false;
                }
                self.catalog.status = result.into();
                true
            }
            Completion::ChaptersLoaded { generation, result } => {
                if generation != self.generations.chapters {
                    debug!(generation, latest = self.generations.chapters, "dropping stale chapter list");
                    return false;
                }
                let list = match &mut self.view {
                    View::ChapterList(list) => list,
                    View::Reader(reader) => &mut reader.chapter_list,
                    View::Catalog => return false,
                };
                list.chapters = result.into();
                true
            }
            Completion::PagesLoaded { generation, result } => {
                if generation != self.generations.pages {
                    debug!(generation, latest = self.generations.pages, "dropping stale chapter pages");
                    return false;
                }
                let View::Reader(reader) = &mut self.view else {
                    return false;
                };
                if !matches!(reader.content, ReaderContent::Loading) {
                    return false;
                }
                reader.content = match result {
                    Ok(pages) => {
                        let series_id = &reader.chapter_list.series.id;
                        let stored = progress.get(series_id);
                        ReaderContent::Ready(ReaderView::open(
                            series_id,
                            &reader.chapter_id,
                            pages,
                            mode,
                            stored.as_ref(),
                            now,
                        ))
                    }
                    Err(e) => ReaderContent::Failed(e),
                };
                true
            }
        }
    }

    /// Renders the active view.
    pub fn view_model(&self, progress: &dyn ProgressStoreTrait, now: Instant) -> ViewModel {
        match &self.view {
            View::Catalog => ViewModel::Catalog(catalog_view_model(&self.catalog)),
            View::ChapterList(list) => ViewModel::ChapterList(chapter_list_view_model(list, progress)),
            View::Reader(reader) => ViewModel::Reader(ReaderViewModel {
                series_id: reader.chapter_list.series.id.clone(),
                chapter_id: reader.chapter_id.clone(),
                status: match &reader.content {
                    ReaderContent::Loading => ReaderStatus::Loading,
                    ReaderContent::Failed(e) => ReaderStatus::Error {
                        message: e.to_string(),
                    },
                    ReaderContent::Ready(view) => ReaderStatus::Ready(view.view_model(now)),
                },
            }),
        }
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

fn list_status<T, U, E: fmt::Display>(
    state: &FetchState<Vec<T>, E>,
    map: impl Fn(&T) -> U,
) -> ListStatus<U> {
    match state {
        FetchState::Loading => ListStatus::Loading,
        FetchState::Failed(e) => ListStatus::Error {
            message: e.to_string(),
        },
        FetchState::Loaded(items) if items.is_empty() => ListStatus::Empty,
        FetchState::Loaded(items) => ListStatus::Loaded {
            items: items.iter().map(map).collect(),
        },
    }
}

fn series_card(series: &Series) -> SeriesCard {
    let cover_url = if series.cover_url.trim().is_empty() {
        PLACEHOLDER_COVER_URL.to_string()
    } else {
        series.cover_url.clone()
    };
    SeriesCard {
        id: series.id.clone(),
        title: series.title.clone(),
        cover_url,
        fallback_cover_url: PLACEHOLDER_COVER_URL.to_string(),
    }
}

fn catalog_view_model(catalog: &CatalogState) -> CatalogViewModel {
    CatalogViewModel {
        query: catalog.query.clone(),
        status: list_status(&catalog.status, series_card),
    }
}

fn chapter_list_view_model(
    list: &ChapterListState,
    progress: &dyn ProgressStoreTrait,
) -> ChapterListViewModel {
    let last_chapter = progress.get(&list.series.id).map(|r| r.last_chapter);
    ChapterListViewModel {
        series_id: list.series.id.clone(),
        series_title: list.series.title.clone(),
        status: list_status(&list.chapters, |chapter: &Chapter| ChapterRow {
            id: chapter.id.clone(),
            label: chapter.display_label(),
            number_label: format!("#{}", chapter.chapter_number),
            continue_reading: last_chapter.as_deref() == Some(chapter.id.as_str()),
        }),
    }
}
