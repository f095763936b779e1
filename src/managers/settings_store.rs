//! Settings Store for MangaHub.
//!
//! Persists the reader display mode under `reader_settings`.

use std::sync::Arc;

use tracing::warn;

use crate::services::storage::{read_json, write_json, KeyValueStorage};
use crate::types::errors::StorageError;
use crate::types::settings::ReaderSettings;

/// Storage key of the reader settings.
pub const SETTINGS_KEY: &str = "reader_settings";

/// Trait defining reader settings persistence.
pub trait SettingsStoreTrait {
    fn get(&self) -> ReaderSettings;
    fn set(&mut self, settings: ReaderSettings) -> Result<(), StorageError>;
}

pub struct SettingsStore {
    storage: Arc<dyn KeyValueStorage>,
    settings: ReaderSettings,
}

impl SettingsStore {
    /// Loads the stored settings.
    ///
    /// Absent settings are created with the default on first run. Malformed
    /// settings fall back to the default silently and are left in place
    /// until the next `set`.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let settings = match read_json::<ReaderSettings>(storage.as_ref(), SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                let defaults = ReaderSettings::default();
                if let Err(e) = write_json(storage.as_ref(), SETTINGS_KEY, &defaults) {
                    warn!(error = %e, "failed to write default reader settings");
                }
                defaults
            }
            Err(e) => {
                warn!(error = %e, "using default reader settings");
                ReaderSettings::default()
            }
        };
        Self { storage, settings }
    }
}

impl SettingsStoreTrait for SettingsStore {
    fn get(&self) -> ReaderSettings {
        self.settings
    }

    /// Persists `settings`. The in-memory value is updated even if the write
    /// fails, so the current session honours the user's choice.
    fn set(&mut self, settings: ReaderSettings) -> Result<(), StorageError> {
        self.settings = settings;
        write_json(self.storage.as_ref(), SETTINGS_KEY, &settings)
    }
}
