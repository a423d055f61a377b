//! File-based subscription store.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{StoreError, Subscription, SubscriptionStore};

/// Current store file format version.
///
/// Increment this when making breaking changes to the format.
const STORE_FILE_VERSION: u32 = 1;

/// On-disk format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    subscriptions: Vec<Subscription>,
}

/// Subscriptions keyed by recipient id, kept sorted so the file diffs cleanly.
type Records = BTreeMap<String, Subscription>;

/// JSON file implementation of [`SubscriptionStore`].
///
/// Every operation reads the file; mutations rewrite it with
/// write-to-temp-then-rename so a crash never leaves a half-written file.
/// A missing file is an empty store. Mutations are serialized within the
/// process so concurrent subscribe commands cannot lose each other's writes.
#[derive(Debug, Clone)]
pub struct FileSubscriptionStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileSubscriptionStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file is created on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_blocking(path: &Path) -> Result<Records, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Records::new()),
            Err(e) => return Err(StoreError::Read(e)),
        };

        let file: StoreFile =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            })?;

        if file.version != STORE_FILE_VERSION {
            return Err(StoreError::Corrupted {
                reason: format!(
                    "Incompatible version: expected {STORE_FILE_VERSION}, got {}",
                    file.version
                ),
            });
        }

        Ok(file
            .subscriptions
            .into_iter()
            .map(|s| (s.recipient_id.clone(), s))
            .collect())
    }

    fn save_blocking(path: &Path, records: &Records) -> Result<(), StoreError> {
        let file = StoreFile {
            version: STORE_FILE_VERSION,
            subscriptions: records.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(StoreError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }

        // subscriptions.json -> subscriptions.json.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
        std::fs::write(&temp_path, content).map_err(StoreError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StoreError::Write)?;

        Ok(())
    }

    async fn load(&self) -> Result<Records, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_blocking(&path))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Loads, applies `change`, and saves if `change` reports a modification.
    async fn modify<T, F>(&self, change: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Records) -> (T, bool) + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
            let mut records = Self::load_blocking(&path)?;
            let (result, changed) = change(&mut records);
            if changed {
                Self::save_blocking(&path, &records)?;
            }
            Ok(result)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

impl SubscriptionStore for FileSubscriptionStore {
    async fn upsert(&self, subscription: Subscription) -> Result<(), StoreError> {
        self.modify(move |records| {
            records.insert(subscription.recipient_id.clone(), subscription);
            ((), true)
        })
        .await
    }

    async fn get(&self, recipient_id: &str) -> Result<Option<Subscription>, StoreError> {
        let mut records = self.load().await?;
        Ok(records.remove(recipient_id))
    }

    async fn remove(&self, recipient_ids: &[&str]) -> Result<usize, StoreError> {
        let ids: Vec<String> = recipient_ids.iter().map(ToString::to_string).collect();
        self.modify(move |records| {
            let removed = ids.iter().filter(|id| records.remove(*id).is_some()).count();
            (removed, removed > 0)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.load().await?.into_values().collect())
    }
}
