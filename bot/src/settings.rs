//! Per-channel bot settings.
//!
//! Settings live in one JSON file keyed by channel. Reads go through an
//! in-memory copy that is reloaded from disk once it is older than the TTL,
//! so edits made to the file by hand show up without a restart. Updates
//! write through to the file and refresh the copy.

use chatgames_types::ChannelId;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub minigames_enabled: bool,
    pub rps_enabled: bool,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            minigames_enabled: true,
            rps_enabled: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is malformed: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[source] serde_json::Error),
}

type SettingsMap = BTreeMap<ChannelId, ChannelSettings>;

struct Cached {
    loaded: Instant,
    settings: SettingsMap,
}

pub struct SettingsStore {
    path: PathBuf,
    ttl: Duration,
    cache: Mutex<Option<Cached>>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SettingsMap, SettingsError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(SettingsMap::new());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw).map_err(|source| SettingsError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    async fn store(&self, settings: &SettingsMap) -> Result<(), SettingsError> {
        let io = |source: std::io::Error| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        let encoded = serde_json::to_vec_pretty(settings).map_err(SettingsError::Encode)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io)?;
        }

        // Write a sibling file first so readers never see a partial file
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded).await.map_err(io)?;
        tokio::fs::rename(&staging, &self.path).await.map_err(io)
    }

    /// Settings for `channel`, defaults if it has none.
    pub async fn get(&self, channel: &ChannelId) -> Result<ChannelSettings, SettingsError> {
        let mut cache = self.cache.lock().await;
        let fresh = cache
            .as_ref()
            .is_some_and(|cached| cached.loaded.elapsed() < self.ttl);
        if !fresh {
            *cache = Some(Cached {
                loaded: Instant::now(),
                settings: self.load().await?,
            });
        }
        Ok(cache
            .as_ref()
            .and_then(|cached| cached.settings.get(channel).cloned())
            .unwrap_or_default())
    }

    /// Change the settings of `channel` and persist them.
    pub async fn update(
        &self,
        channel: &ChannelId,
        f: impl FnOnce(&mut ChannelSettings) + Send,
    ) -> Result<ChannelSettings, SettingsError> {
        let mut cache = self.cache.lock().await;

        // Always start from disk so concurrent edits to the file are not lost
        let mut settings = self.load().await?;
        let entry = settings.entry(channel.clone()).or_default();
        f(entry);
        let updated = entry.clone();
        self.store(&settings).await?;
        info!(%channel, settings = ?updated, "updated channel settings");

        *cache = Some(Cached {
            loaded: Instant::now(),
            settings,
        });
        Ok(updated)
    }
}
