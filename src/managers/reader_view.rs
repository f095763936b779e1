//! Reader View Controller for MangaHub.
//!
//! Holds one loaded chapter and turns viewport reports into a current page.
//! Rendering produces a [`ReaderPageSet`]; nothing here touches a UI toolkit.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::catalog::ChapterPages;
use crate::types::progress::ProgressRecord;
use crate::types::settings::ReadingMode;
use crate::types::view::{ImageStatus, PageView, ReaderPageSet};

/// Minimum visible fraction for a page to count as being read.
pub const VISIBILITY_THRESHOLD: f64 = 0.1;
/// How long the "resumed from page N" notice stays up.
pub const RESUME_NOTICE_DURATION: Duration = Duration::from_secs(2);
/// Pages at the start of a chapter that are always fetched immediately.
pub const EAGER_PAGE_COUNT: usize = 3;
/// Pages either side of the current page that are fetched ahead of time.
pub const LAZY_WINDOW: usize = 3;

/// Visible fraction of one rendered page, as reported by the host's
/// viewport observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityReport {
    pub index: usize,
    pub ratio: f64,
}

/// Emitted when the current page changes; the caller persists it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChange {
    pub series_id: String,
    pub chapter_id: String,
    pub index: usize,
    pub indicator: String,
}

/// Transient notice shown after jumping to stored progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeNotice {
    pub page_index: usize,
    pub shown_at: Instant,
}

impl ResumeNotice {
    pub fn message(&self) -> String {
        format!("Resumed from page {}", self.page_index + 1)
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + RESUME_NOTICE_DURATION
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}

#[derive(Debug, Clone)]
struct PageSlot {
    url: String,
    status: ImageStatus,
    reload_nonce: u32,
}

/// One chapter open in the reader.
#[derive(Debug, Clone)]
pub struct ReaderView {
    series_id: String,
    chapter_id: String,
    pages: Vec<PageSlot>,
    prev_chapter: Option<String>,
    next_chapter: Option<String>,
    mode: ReadingMode,
    current_page: Option<usize>,
    resume_target: Option<usize>,
    resume_pending: bool,
    /// Held while the host scrolls to the resume target. Reports for other
    /// pages are its pre-scroll position and are not recorded.
    resume_pin: Option<usize>,
    notice: Option<ResumeNotice>,
}

impl ReaderView {
    /// Opens a freshly loaded chapter.
    ///
    /// If `stored` points into this chapter past its first page, and that page
    /// still exists, the view arms a one-shot scroll target and a resume notice.
    pub fn open(
        series_id: &str,
        chapter_id: &str,
        content: ChapterPages,
        mode: ReadingMode,
        stored: Option<&ProgressRecord>,
        now: Instant,
    ) -> Self {
        let pages: Vec<PageSlot> = content
            .pages
            .into_iter()
            .map(|url| PageSlot {
                url,
                status: ImageStatus::Loading,
                reload_nonce: 0,
            })
            .collect();

        let resume_target = stored
            .filter(|r| r.last_chapter == chapter_id && r.last_page > 0)
            .map(|r| r.last_page)
            .filter(|&page| page < pages.len());

        Self {
            series_id: series_id.to_string(),
            chapter_id: chapter_id.to_string(),
            pages,
            prev_chapter: content.prev_chapter,
            next_chapter: content.next_chapter,
            mode,
            current_page: None,
            resume_target,
            resume_pending: resume_target.is_some(),
            resume_pin: resume_target,
            notice: resume_target.map(|page_index| ResumeNotice {
                page_index,
                shown_at: now,
            }),
        }
    }

    pub fn series_id(&self) -> &str {
        &self.series_id
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn prev_chapter(&self) -> Option<&str> {
        self.prev_chapter.as_deref()
    }

    pub fn next_chapter(&self) -> Option<&str> {
        self.next_chapter.as_deref()
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page last reported as current, if any report has arrived yet.
    pub fn current_page(&self) -> Option<usize> {
        self.current_page
    }

    pub fn notice(&self) -> Option<&ResumeNotice> {
        self.notice.as_ref()
    }

    /// The page the reader is positioned on: the pinned resume target, else
    /// the last reported page, else the resume target, else the first page.
    fn anchor(&self) -> usize {
        self.resume_pin
            .or(self.current_page)
            .or(self.resume_target)
            .unwrap_or(0)
    }

    pub fn indicator(&self) -> String {
        if self.pages.is_empty() {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.anchor() + 1, self.pages.len())
    }

    /// Returns the stored page to scroll to, once. Later calls return `None`.
    pub fn take_resume_target(&mut self) -> Option<usize> {
        if !self.resume_pending {
            return None;
        }
        self.resume_pending = false;
        self.resume_target
    }

    /// Applies a batch of viewport reports.
    ///
    /// The first in-range page at or above [`VISIBILITY_THRESHOLD`] becomes
    /// current. Returns a change only when the current page actually moves.
    ///
    /// While a resume is pinned, only a qualifying report for the target page
    /// is accepted; it releases the pin.
    pub fn on_visibility(&mut self, reports: &[VisibilityReport]) -> Option<PageChange> {
        if let Some(target) = self.resume_pin {
            reports
                .iter()
                .find(|r| r.index == target && r.ratio >= VISIBILITY_THRESHOLD)?;
            self.resume_pin = None;
            return self.move_to(target);
        }
        let index = reports
            .iter()
            .find(|r| r.index < self.pages.len() && r.ratio >= VISIBILITY_THRESHOLD)?
            .index;
        self.move_to(index)
    }

    /// Steps one page forward. `None` on the last page.
    pub fn next_page(&mut self) -> Option<PageChange> {
        let next = self.anchor() + 1;
        if next >= self.pages.len() {
            return None;
        }
        self.resume_pin = None;
        self.move_to(next)
    }

    /// Steps one page back. `None` on the first page.
    pub fn previous_page(&mut self) -> Option<PageChange> {
        let previous = self.anchor().checked_sub(1)?;
        self.resume_pin = None;
        self.move_to(previous)
    }

    fn move_to(&mut self, index: usize) -> Option<PageChange> {
        if self.current_page == Some(index) {
            return None;
        }
        self.current_page = Some(index);
        Some(PageChange {
            series_id: self.series_id.clone(),
            chapter_id: self.chapter_id.clone(),
            index,
            indicator: self.indicator(),
        })
    }

    /// Switches layout in place; pages and position are kept.
    pub fn set_mode(&mut self, mode: ReadingMode) {
        self.mode = mode;
    }

    pub fn mark_image_loaded(&mut self, index: usize) -> bool {
        self.set_image_status(index, ImageStatus::Loaded)
    }

    /// Marks one page as broken; the rest of the chapter is unaffected.
    pub fn mark_image_failed(&mut self, index: usize) -> bool {
        self.set_image_status(index, ImageStatus::Failed)
    }

    /// Requests a fresh fetch of one page image.
    pub fn retry_image(&mut self, index: usize) -> bool {
        match self.pages.get_mut(index) {
            Some(slot) => {
                slot.status = ImageStatus::Loading;
                slot.reload_nonce = slot.reload_nonce.wrapping_add(1);
                true
            }
            None => false,
        }
    }

    fn set_image_status(&mut self, index: usize, status: ImageStatus) -> bool {
        match self.pages.get_mut(index) {
            Some(slot) => {
                slot.status = status;
                true
            }
            None => false,
        }
    }

    /// When the resume notice should be taken down.
    pub fn notice_deadline(&self) -> Option<Instant> {
        self.notice.as_ref().map(ResumeNotice::expires_at)
    }

    /// Drops the resume notice once it has expired. Returns whether it was dropped.
    ///
    /// A resume pin still held at that point is released, so a host that never
    /// reported the target page goes back to recording what it shows.
    pub fn dismiss_expired_notice(&mut self, now: Instant) -> bool {
        let expired = self.notice.as_ref().is_some_and(|n| !n.is_visible(now));
        if expired {
            self.notice = None;
            self.resume_pin = None;
        }
        expired
    }

    fn should_load(index: usize, anchor: usize) -> bool {
        index < EAGER_PAGE_COUNT || index.abs_diff(anchor) <= LAZY_WINDOW
    }

    pub fn view_model(&self, now: Instant) -> ReaderPageSet {
        let anchor = self.anchor();
        let pages = self
            .pages
            .iter()
            .enumerate()
            .map(|(index, slot)| PageView {
                index,
                url: slot.url.clone(),
                load: slot.status != ImageStatus::Loading || Self::should_load(index, anchor),
                status: slot.status,
                reload_nonce: slot.reload_nonce,
            })
            .collect();

        let visible_page = match self.mode {
            ReadingMode::Horizontal if !self.pages.is_empty() => Some(anchor),
            _ => None,
        };

        ReaderPageSet {
            mode: self.mode,
            pages,
            visible_page,
            indicator: self.indicator(),
            prev_enabled: self.prev_chapter.is_some(),
            next_enabled: self.next_chapter.is_some(),
            notice: self
                .notice
                .as_ref()
                .filter(|n| n.is_visible(now))
                .map(ResumeNotice::message),
        }
    }
}

/// Derives visibility reports from page geometry, for hosts without a
/// native viewport observer.
///
/// `extents` are the rendered page sizes along the scroll axis, laid out
/// back to back from offset 0. Pages with no overlap are omitted.
pub fn visibility_from_layout(
    extents: &[f64],
    scroll_offset: f64,
    viewport_extent: f64,
) -> Vec<VisibilityReport> {
    let view_start = scroll_offset;
    let view_end = scroll_offset + viewport_extent.max(0.0);
    let mut start = 0.0;
    let mut reports = Vec::new();

    for (index, &extent) in extents.iter().enumerate() {
        let extent = if extent.is_finite() && extent > 0.0 { extent } else { 0.0 };
        let end = start + extent;
        if extent > 0.0 {
            let overlap = (end.min(view_end) - start.max(view_start)).max(0.0);
            if overlap > 0.0 {
                reports.push(VisibilityReport {
                    index,
                    ratio: (overlap / extent).min(1.0),
                });
            }
        }
        start = end;
    }
    reports
}
