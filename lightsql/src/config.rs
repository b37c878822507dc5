///
/// # Session configuration
///
/// Options are read from a TOML document whose keys live under a
/// `[session]` table. Every key is optional.
///
/// ```toml
/// [session]
/// busy_timeout_ms = 5000
/// read_only = false
/// create = true
/// foreign_keys = true
///
/// [session.temporal]
/// julian_day_epoch = 2440587.5
/// bind_encoding = "iso8601"   # unix_millis | julian_day | iso8601
/// ```
///

use std::path::Path;
use std::time::Duration;

use lightsql_value::TemporalConfig;
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// How long a statement waits on an engine lock before failing.
    pub busy_timeout_ms: u64,
    /// Open the engine read-only. Unlike `Session::set_read_only` this
    /// can not be undone for the life of the session.
    pub read_only: bool,
    pub create: bool,
    pub foreign_keys: bool,
    pub temporal: TemporalConfig,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 3000,
            read_only: false,
            create: true,
            foreign_keys: true,
            temporal: TemporalConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    session: SessionOptions,
}

impl SessionOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let doc: ConfigDocument = toml::from_str(text)?;
        Ok(doc.session)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let mode = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if self.create {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        mode | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }
}
