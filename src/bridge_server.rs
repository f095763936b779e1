//! MangaHub bridge: newline-delimited JSON over stdin/stdout for a host shell.
//!
//! Request:  {"id":1, "event":"series.select", "params":{"series_id":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Pushed:   {"event":"view", "update":"view_changed", "view":{...}}
//!
//! Logs go to stderr; stdout carries protocol lines only.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mangahub::app::App;
use mangahub::bridge::{handle_line, update_message};
use mangahub::config::AppConfig;

const LOG_ENV: &str = "MANGAHUB_LOG";

async fn write_line(stdout: &mut Stdout, value: &Value) -> std::io::Result<()> {
    stdout.write_all(format!("{}\n", value).as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    let mut app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize MangaHub");
            std::process::exit(1);
        }
    };

    let mut stdout = tokio::io::stdout();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if write_line(&mut stdout, &ready).await.is_err() {
        return;
    }

    app.startup();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let message = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => handle_line(&mut app, &line),
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "stdin read failed");
                    break;
                }
            },
            update = app.next_update() => match update {
                Some(update) => update_message(&app, &update),
                None => break,
            },
        };
        if let Err(e) = write_line(&mut stdout, &message).await {
            error!(error = %e, "stdout write failed");
            break;
        }
    }

    info!("host disconnected, shutting down");
}
