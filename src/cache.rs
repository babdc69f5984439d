// src/cache.rs
//
// Durable key/value store for externally sourced reference data. Two
// namespaces: country profiles and comparable company overviews. The store
// itself is deliberately dumb — it knows nothing about freshness; expiry is
// evaluated by the owning service against a date embedded in the payload.
// Every put rewrites the backing file so entries survive process restarts.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Countries,
    Companies,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    countries: HashMap<String, String>,
    #[serde(default)]
    companies: HashMap<String, String>,
}

impl CacheFile {
    fn map(&self, namespace: Namespace) -> &HashMap<String, String> {
        match namespace {
            Namespace::Countries => &self.countries,
            Namespace::Companies => &self.companies,
        }
    }

    fn map_mut(&mut self, namespace: Namespace) -> &mut HashMap<String, String> {
        match namespace {
            Namespace::Countries => &mut self.countries,
            Namespace::Companies => &mut self.companies,
        }
    }
}

/// File-backed cache store. Constructed once at startup and shared by
/// handle; the interior mutex serializes concurrent check-then-store
/// sequences from the services.
pub struct CacheStore {
    path: PathBuf,
    inner: Mutex<CacheFile>,
}

impl CacheStore {
    /// Opens the store at `path`, loading any existing content. A missing
    /// file starts an empty store; an unreadable one is an error, a corrupt
    /// one is discarded with a warning (it will be rewritten on first put).
    pub fn open(path: impl AsRef<Path>) -> Result<CacheStore> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let text = fs::read_to_string(&path)?;
            match serde_json::from_str::<CacheFile>(&text) {
                Ok(file) => file,
                Err(e) => {
                    warn!("Discarding corrupt cache file {}: {}", path.display(), e);
                    CacheFile::default()
                }
            }
        } else {
            CacheFile::default()
        };
        Ok(CacheStore {
            path,
            inner: Mutex::new(inner),
        })
    }

    pub fn get(&self, namespace: Namespace, key: &str) -> Option<String> {
        let inner = self.inner.lock().expect("cache mutex poisoned");
        inner.map(namespace).get(key).cloned()
    }

    /// Inserts or overwrites an entry and commits the whole store to disk
    /// before returning.
    pub fn put(&self, namespace: Namespace, key: &str, payload: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner
            .map_mut(namespace)
            .insert(key.to_string(), payload.to_string());
        self.commit(&inner)?;
        debug!("Cached {:?}/{} ({} bytes)", namespace, key, payload.len());
        Ok(())
    }

    fn commit(&self, inner: &CacheFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(inner)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
