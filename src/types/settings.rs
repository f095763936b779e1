use serde::{Deserialize, Serialize};

/// How the reader lays out a chapter's pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    /// Continuous top-to-bottom scroll of every page.
    #[default]
    Vertical,
    /// One page at a time, stepped horizontally.
    Horizontal,
}

impl ReadingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingMode::Vertical => "vertical",
            ReadingMode::Horizontal => "horizontal",
        }
    }
}

/// Reader display settings, stored under `reader_settings`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReaderSettings {
    pub mode: ReadingMode,
}
