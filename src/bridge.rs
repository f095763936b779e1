//! Event handler for the MangaHub host bridge protocol.
//!
//! Kept apart from the `mangahub-bridge` binary so it can be unit-tested.
//! `handle_event` dispatches one UI event from the host shell to the [`App`]
//! and answers with JSON; most events answer with the re-rendered view.

use serde_json::{json, Value};

use crate::app::{App, AppUpdate};
use crate::managers::navigation::NavEvent;
use crate::managers::reader_view::{PageChange, VisibilityReport};
use crate::types::settings::ReadingMode;

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn index_param(params: &Value) -> Result<usize, String> {
    params
        .get("index")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| "missing index".to_string())
}

fn f64_param(params: &Value, key: &str) -> Result<f64, String> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| format!("missing {}", key))
}

/// The active view model plus the header flag.
pub fn render(app: &App) -> Result<Value, String> {
    let view = app.view_model();
    let mut value = serde_json::to_value(&view).map_err(|e| e.to_string())?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("header_visible".to_string(), json!(view.header_visible()));
    }
    Ok(value)
}

fn page_change(change: Option<PageChange>) -> Value {
    match change {
        Some(change) => json!({"changed": true, "page": change.index, "indicator": change.indicator}),
        None => json!({"changed": false}),
    }
}

fn dispatch(app: &mut App, event: NavEvent) -> Result<Value, String> {
    app.dispatch(event);
    render(app)
}

/// Dispatches one host event.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_event(app: &mut App, event: &str, params: &Value) -> Result<Value, String> {
    match event {
        // ─── Catalog ───
        "catalog.search" => {
            let query = str_param(params, "query")?;
            app.search_input(query);
            Ok(json!({"ok": true}))
        }
        "catalog.load" => {
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            dispatch(app, NavEvent::LoadCatalog { query: query.to_string() })
        }
        "series.select" => {
            let series_id = str_param(params, "series_id")?;
            dispatch(app, NavEvent::SelectSeries { series_id: series_id.to_string() })
        }
        "chapter.select" => {
            let chapter_id = str_param(params, "chapter_id")?;
            dispatch(app, NavEvent::SelectChapter { chapter_id: chapter_id.to_string() })
        }

        // ─── Navigation ───
        "nav.back" => dispatch(app, NavEvent::Back),
        "reader.exit" => dispatch(app, NavEvent::ExitReader),
        "reader.prev" => dispatch(app, NavEvent::PreviousChapter),
        "reader.next" => dispatch(app, NavEvent::NextChapter),
        "retry" => dispatch(app, NavEvent::Retry),

        // ─── Reader position ───
        "reader.visibility" => {
            let reports = params
                .get("reports")
                .cloned()
                .map(serde_json::from_value::<Vec<VisibilityReport>>)
                .ok_or("missing reports")?
                .map_err(|e| format!("invalid reports: {}", e))?;
            Ok(page_change(app.on_visibility(&reports)))
        }
        "reader.layout" => {
            let extents: Vec<f64> = params
                .get("extents")
                .and_then(|v| v.as_array())
                .ok_or("missing extents")?
                .iter()
                .map(|v| v.as_f64().ok_or("invalid extents"))
                .collect::<Result<_, _>>()?;
            let scroll_offset = f64_param(params, "scroll_offset")?;
            let viewport_extent = f64_param(params, "viewport_extent")?;
            Ok(page_change(app.on_layout(&extents, scroll_offset, viewport_extent)))
        }
        "reader.page_next" => Ok(page_change(app.next_page())),
        "reader.page_prev" => Ok(page_change(app.previous_page())),

        // ─── Images ───
        "image.failed" => {
            let index = index_param(params)?;
            Ok(json!({"ok": app.image_failed(index)}))
        }
        "image.loaded" => {
            let index = index_param(params)?;
            Ok(json!({"ok": app.image_loaded(index)}))
        }
        "image.retry" => {
            let index = index_param(params)?;
            Ok(json!({"ok": app.retry_image(index)}))
        }

        // ─── Settings & progress ───
        "settings.get" => serde_json::to_value(app.settings()).map_err(|e| e.to_string()),
        "settings.set" => {
            let mode = params.get("mode").cloned().ok_or("missing mode")?;
            let mode: ReadingMode =
                serde_json::from_value(mode).map_err(|e| format!("invalid mode: {}", e))?;
            app.set_mode(mode).map_err(|e| e.to_string())?;
            render(app)
        }
        "progress.get" => {
            let series_id = str_param(params, "series_id")?;
            serde_json::to_value(app.progress(series_id)).map_err(|e| e.to_string())
        }

        "view" => render(app),

        _ => Err(format!("unknown event: {}", event)),
    }
}

/// Handles one protocol line: `{"id":1,"event":"...","params":{...}}`.
///
/// Answers `{"id":1,"result":...}` or `{"id":1,"error":"..."}`.
pub fn handle_line(app: &mut App, line: &str) -> Value {
    let req: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return json!({"id": null, "error": format!("parse error: {}", e)}),
    };
    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let event = req.get("event").and_then(|v| v.as_str()).unwrap_or("");
    let params = req.get("params").cloned().unwrap_or(json!({}));

    match handle_event(app, event, &params) {
        Ok(val) => json!({"id": id, "result": val}),
        Err(err) => json!({"id": id, "error": err}),
    }
}

/// The unsolicited message pushed to the host for an [`AppUpdate`].
pub fn update_message(app: &App, update: &AppUpdate) -> Value {
    let view = render(app).unwrap_or(Value::Null);
    match update {
        AppUpdate::ViewChanged => json!({"event": "view", "update": "view_changed", "view": view}),
        AppUpdate::ReaderReady { scroll_to } => json!({
            "event": "view",
            "update": "reader_ready",
            "scroll_to": scroll_to,
            "view": view,
        }),
        AppUpdate::NoticeExpired => json!({"event": "view", "update": "notice_expired", "view": view}),
    }
}
