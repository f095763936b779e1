use serde::{Deserialize, Serialize};

/// A manga title as listed by the catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub id: String,
    pub title: String,
    /// Cover image reference. Empty when the backend has no cover.
    #[serde(default)]
    pub cover_url: String,
}

/// A numbered chapter of a series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub id: String,
    /// Parent series. The chapters endpoint may omit it; the catalog client
    /// fills it from the series that was requested.
    #[serde(default)]
    pub series_id: String,
    pub chapter_number: f64,
    #[serde(default)]
    pub title: Option<String>,
}

impl Chapter {
    /// Label shown in chapter lists: the title when present, else "Chapter N".
    pub fn display_label(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Chapter {}", self.chapter_number),
        }
    }
}

/// Page images of one chapter plus its neighbours in the series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChapterPages {
    pub pages: Vec<String>,
    #[serde(default)]
    pub prev_chapter: Option<String>,
    #[serde(default)]
    pub next_chapter: Option<String>,
    #[serde(default)]
    pub chapter_number: Option<f64>,
}
