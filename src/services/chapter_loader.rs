//! Chapter Loader for MangaHub.
//!
//! Fetches a chapter's ordered page images and its prev/next linkage.

use std::sync::Arc;

use tracing::{debug, warn};

use super::transport::{fetch_json, ApiRequest, Transport};
use crate::types::catalog::ChapterPages;
use crate::types::errors::LoadError;

#[derive(Clone)]
pub struct ChapterLoader {
    transport: Arc<dyn Transport>,
}

impl ChapterLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Loads `/api/pages/<chapter_id>`.
    ///
    /// Empty neighbour ids are normalized to `None` so callers never try to
    /// navigate to an empty target.
    pub async fn load_chapter(&self, chapter_id: &str) -> Result<ChapterPages, LoadError> {
        let request = ApiRequest::new(&["api", "pages", chapter_id]);
        debug!(%request, "fetching chapter pages");
        let mut pages: ChapterPages = fetch_json(self.transport.as_ref(), &request)
            .await
            .map_err(|e| {
                warn!(%request, error = %e, "chapter load failed");
                LoadError::from(e)
            })?;
        pages.prev_chapter = pages.prev_chapter.filter(|id| !id.trim().is_empty());
        pages.next_chapter = pages.next_chapter.filter(|id| !id.trim().is_empty());
        Ok(pages)
    }
}
