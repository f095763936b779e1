//! App runtime for MangaHub.
//!
//! Owns the navigation controller, the stores and the API clients. Fetches
//! requested by the controller run as spawned tokio tasks and report back over
//! an mpsc channel, so controller state is only ever touched from the task
//! that owns the `App`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::managers::navigation::{Completion, Effect, NavEvent, NavigationController};
use crate::managers::progress_store::{ProgressStore, ProgressStoreTrait};
use crate::managers::reader_view::{visibility_from_layout, PageChange, ReaderView, VisibilityReport};
use crate::managers::search_debouncer::SearchDebouncer;
use crate::managers::settings_store::{SettingsStore, SettingsStoreTrait};
use crate::services::catalog_client::CatalogClient;
use crate::services::chapter_loader::ChapterLoader;
use crate::services::storage::{KeyValueStorage, SqliteStorage};
use crate::services::transport::{HttpTransport, Transport};
use crate::types::errors::StorageError;
use crate::types::progress::ProgressRecord;
use crate::types::settings::{ReaderSettings, ReadingMode};
use crate::types::view::ViewModel;

/// Something the host should react to, produced by [`App::next_update`].
#[derive(Debug, Clone, PartialEq)]
pub enum AppUpdate {
    /// The active view model changed; re-render it.
    ViewChanged,
    /// A chapter finished loading. Scroll to `scroll_to` once it is rendered.
    ReaderReady { scroll_to: Option<usize> },
    /// The resume notice timed out.
    NoticeExpired,
}

/// Reads the runtime clock. Under a paused tokio clock this is virtual time.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

pub struct App {
    controller: NavigationController,
    catalog: CatalogClient,
    loader: ChapterLoader,
    progress: ProgressStore,
    settings: SettingsStore,
    debouncer: SearchDebouncer,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl App {
    /// Creates an App talking HTTP to `config.api_base_url` and persisting to
    /// the SQLite database in the configured data directory.
    pub fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory {}: {}", data_dir.display(), e))?;
        let storage = SqliteStorage::open(config.database_path())?;
        let transport = HttpTransport::new(&config.api_base_url, config.request_timeout())?;
        info!(api = %config.api_base_url, db = %config.database_path().display(), "app initialized");
        Ok(Self::with_parts(
            Arc::new(transport),
            Arc::new(storage),
            config.debounce(),
        ))
    }

    /// Creates an App from explicit parts.
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn KeyValueStorage>,
        debounce: Duration,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            controller: NavigationController::new(),
            catalog: CatalogClient::new(transport.clone()),
            loader: ChapterLoader::new(transport),
            progress: ProgressStore::new(storage.clone()),
            settings: SettingsStore::new(storage),
            debouncer: SearchDebouncer::new(debounce),
            completions_tx,
            completions_rx,
        }
    }

    /// Startup sequence: fetch the full catalog.
    pub fn startup(&mut self) {
        info!(mode = self.settings.get().mode.as_str(), "starting");
        self.dispatch(NavEvent::LoadCatalog {
            query: String::new(),
        });
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Applies a user event and starts whatever fetch it requires.
    ///
    /// A catalog load supersedes any search still waiting out its debounce.
    pub fn dispatch(&mut self, event: NavEvent) {
        if matches!(event, NavEvent::LoadCatalog { .. }) {
            self.debouncer.cancel();
        }
        if let Some(effect) = self.controller.handle(event) {
            self.spawn(effect);
        }
    }

    fn spawn(&self, effect: Effect) {
        debug!(?effect, "issuing fetch");
        let tx = self.completions_tx.clone();
        match effect {
            Effect::FetchSeries { query, generation } => {
                let client = self.catalog.clone();
                tokio::spawn(async move {
                    let result = client.list_series(&query).await;
                    let _ = tx.send(Completion::SeriesLoaded { generation, result });
                });
            }
            Effect::FetchChapters { series_id, generation } => {
                let client = self.catalog.clone();
                tokio::spawn(async move {
                    let result = client.list_chapters(&series_id).await;
                    let _ = tx.send(Completion::ChaptersLoaded { generation, result });
                });
            }
            Effect::FetchPages { chapter_id, generation } => {
                let loader = self.loader.clone();
                tokio::spawn(async move {
                    let result = loader.load_chapter(&chapter_id).await;
                    let _ = tx.send(Completion::PagesLoaded { generation, result });
                });
            }
        }
    }

    /// Records a keystroke in the search box. The catalog fetch is issued by
    /// [`next_update`](Self::next_update) once typing pauses.
    pub fn search_input(&mut self, query: &str) {
        self.debouncer.input(query, now());
    }

    /// Waits for the next thing the host must react to: a fetch completing,
    /// the search debounce elapsing, or the resume notice expiring.
    ///
    /// Stale completions are absorbed here and never surface.
    pub async fn next_update(&mut self) -> Option<AppUpdate> {
        loop {
            let search_deadline = self.debouncer.deadline();
            let notice_deadline = self.controller.reader().and_then(ReaderView::notice_deadline);

            tokio::select! {
                completion = self.completions_rx.recv() => {
                    if let Some(update) = self.apply(completion?) {
                        return Some(update);
                    }
                }
                _ = sleep_until(search_deadline) => {
                    if let Some(query) = self.debouncer.poll(now()) {
                        debug!(query = %query, "search debounce elapsed");
                        self.dispatch(NavEvent::LoadCatalog { query });
                        return Some(AppUpdate::ViewChanged);
                    }
                }
                _ = sleep_until(notice_deadline) => {
                    let expired = self
                        .controller
                        .reader_mut()
                        .is_some_and(|reader| reader.dismiss_expired_notice(now()));
                    if expired {
                        return Some(AppUpdate::NoticeExpired);
                    }
                }
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Option<AppUpdate> {
        let opens_chapter = matches!(completion, Completion::PagesLoaded { result: Ok(_), .. });
        let mode = self.settings.get().mode;
        if !self.controller.complete(completion, mode, &self.progress, now()) {
            return None;
        }
        if opens_chapter {
            let scroll_to = self
                .controller
                .reader_mut()
                .and_then(ReaderView::take_resume_target);
            return Some(AppUpdate::ReaderReady { scroll_to });
        }
        Some(AppUpdate::ViewChanged)
    }

    fn record(&mut self, change: Option<PageChange>) -> Option<PageChange> {
        let change = change?;
        self.progress
            .set(&change.series_id, &change.chapter_id, change.index);
        Some(change)
    }

    /// Feeds viewport reports to the reader and persists the new page.
    pub fn on_visibility(&mut self, reports: &[VisibilityReport]) -> Option<PageChange> {
        let change = self.controller.reader_mut()?.on_visibility(reports);
        self.record(change)
    }

    /// Same as [`on_visibility`](Self::on_visibility), from page geometry.
    pub fn on_layout(
        &mut self,
        extents: &[f64],
        scroll_offset: f64,
        viewport_extent: f64,
    ) -> Option<PageChange> {
        let reports = visibility_from_layout(extents, scroll_offset, viewport_extent);
        self.on_visibility(&reports)
    }

    pub fn next_page(&mut self) -> Option<PageChange> {
        let change = self.controller.reader_mut()?.next_page();
        self.record(change)
    }

    pub fn previous_page(&mut self) -> Option<PageChange> {
        let change = self.controller.reader_mut()?.previous_page();
        self.record(change)
    }

    /// Persists the reading mode and re-lays out an open chapter in place.
    pub fn set_mode(&mut self, mode: ReadingMode) -> Result<(), StorageError> {
        if let Some(reader) = self.controller.reader_mut() {
            reader.set_mode(mode);
        }
        self.settings.set(ReaderSettings { mode })
    }

    pub fn settings(&self) -> ReaderSettings {
        self.settings.get()
    }

    pub fn progress(&self, series_id: &str) -> Option<ProgressRecord> {
        self.progress.get(series_id)
    }

    pub fn image_failed(&mut self, index: usize) -> bool {
        self.controller
            .reader_mut()
            .is_some_and(|reader| reader.mark_image_failed(index))
    }

    pub fn image_loaded(&mut self, index: usize) -> bool {
        self.controller
            .reader_mut()
            .is_some_and(|reader| reader.mark_image_loaded(index))
    }

    pub fn retry_image(&mut self, index: usize) -> bool {
        self.controller
            .reader_mut()
            .is_some_and(|reader| reader.retry_image(index))
    }

    pub fn view_model(&self) -> ViewModel {
        self.controller.view_model(&self.progress, now())
    }
}
