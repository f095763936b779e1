//! Catalog Client for MangaHub.
//!
//! Fetches the series catalog and per-series chapter lists. There is no
//! caching layer: every call goes to the network.

use std::sync::Arc;

use tracing::{debug, warn};

use super::transport::{fetch_json, ApiRequest, Transport};
use crate::types::catalog::{Chapter, Series};
use crate::types::errors::ConnectionError;

/// Client for `/api/series` and `/api/chapters/<id>`.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Lists series whose title matches `query`. A blank query lists the
    /// whole catalog.
    pub async fn list_series(&self, query: &str) -> Result<Vec<Series>, ConnectionError> {
        let request = ApiRequest::new(&["api", "series"]).with_query("q", query.trim());
        debug!(%request, "fetching series");
        fetch_json(self.transport.as_ref(), &request)
            .await
            .map_err(|e| {
                warn!(%request, error = %e, "series fetch failed");
                ConnectionError::from(e)
            })
    }

    /// Lists the chapters of `series_id` in the order the server returns them.
    ///
    /// The server is expected to sort by chapter number; that ordering is
    /// trusted as-is and not re-sorted here.
    pub async fn list_chapters(&self, series_id: &str) -> Result<Vec<Chapter>, ConnectionError> {
        let request = ApiRequest::new(&["api", "chapters", series_id]);
        debug!(%request, "fetching chapters");
        let mut chapters: Vec<Chapter> = fetch_json(self.transport.as_ref(), &request)
            .await
            .map_err(|e| {
                warn!(%request, error = %e, "chapter list fetch failed");
                ConnectionError::from(e)
            })?;
        for chapter in chapters.iter_mut().filter(|c| c.series_id.is_empty()) {
            chapter.series_id = series_id.to_string();
        }
        Ok(chapters)
    }
}
