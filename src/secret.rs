//! Runtime secret store.
//!
//! Holds the process-wide `FAKE_SECRET` value. Readers take a snapshot of the
//! current value and writers swap in a new one, so a reader always sees a whole
//! value and its matching length, never a partial update.
//!
//! The value can be reloaded from `<secret dir>/FAKE_SECRET` at runtime, either
//! through `POST /-/reload` or on SIGHUP.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{ENV_FAKE_SECRET, SECRET_FILE_NAME};

/// Error returned when a new secret value is rejected.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret value contains a NUL byte")]
    ContainsNul,
}

/// Error returned by [`reload`].
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to read secret file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to update secret: {0}")]
    Update(#[from] SecretError),
}

/// A consistent view of the secret at one instant.
#[derive(Clone)]
pub struct SecretSnapshot(Arc<String>);

impl SecretSnapshot {
    /// True if the secret is set to a non-empty value.
    pub fn is_present(&self) -> bool {
        !self.0.is_empty()
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw value. Never include this in responses or logs.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSnapshot")
            .field("present", &self.is_present())
            .field("len", &self.len())
            .finish()
    }
}

/// Shared, atomically replaceable secret value.
pub struct SecretStore {
    current: ArcSwap<String>,
}

impl SecretStore {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial.into()),
        }
    }

    /// Seed from the `FAKE_SECRET` environment variable (empty if unset).
    pub fn from_env() -> Self {
        Self::new(std::env::var(ENV_FAKE_SECRET).unwrap_or_default())
    }

    pub fn get(&self) -> SecretSnapshot {
        SecretSnapshot(self.current.load_full())
    }

    /// Replace the stored value. Readers that start after this returns see the
    /// new value; on error the previous value is kept.
    pub fn set(&self, value: impl Into<String>) -> Result<(), SecretError> {
        let value = value.into();
        if value.contains('\0') {
            return Err(SecretError::ContainsNul);
        }
        self.current.store(Arc::new(value));
        Ok(())
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("current", &self.get())
            .finish()
    }
}

/// Path of the secret file under `dir`.
pub fn secret_file_path(dir: &Path) -> PathBuf {
    dir.join(SECRET_FILE_NAME)
}

/// Read `<dir>/FAKE_SECRET`, strip trailing CR/LF and publish it to `store`.
///
/// Returns the new secret length. The store is left untouched on any error.
pub async fn reload(store: &SecretStore, dir: &Path) -> Result<usize, ReloadError> {
    let path = secret_file_path(dir);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ReloadError::Read {
            path: path.clone(),
            source,
        })?;

    let value = contents.trim_end_matches(|c: char| c == '\r' || c == '\n');
    let len = value.len();
    store.set(value)?;

    tracing::info!(path = %path.display(), fake_secret_len = len, "Reloaded secret");
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_secret_is_absent() {
        let store = SecretStore::new("");
        let snapshot = store.get();
        assert!(!snapshot.is_present());
        assert_eq!(snapshot.len(), 0);
    }

    #[test]
    fn test_set_replaces_value() {
        let store = SecretStore::new("old");
        store.set("brand-new").unwrap();
        let snapshot = store.get();
        assert!(snapshot.is_present());
        assert_eq!(snapshot.value(), "brand-new");
        assert_eq!(snapshot.len(), 9);
    }

    #[test]
    fn test_snapshot_outlives_update() {
        let store = SecretStore::new("first");
        let before = store.get();
        store.set("second-value").unwrap();
        assert_eq!(before.value(), "first");
        assert_eq!(store.get().value(), "second-value");
    }

    #[test]
    fn test_set_rejects_nul_and_keeps_previous() {
        let store = SecretStore::new("keep-me");
        let err = store.set("bad\0value").unwrap_err();
        assert!(matches!(err, SecretError::ContainsNul));
        assert_eq!(store.get().value(), "keep-me");
    }

    #[test]
    fn test_debug_does_not_leak_value() {
        let store = SecretStore::new("hunter2");
        let rendered = format!("{:?}", store);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("len: 7"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let short = "a".repeat(8);
        let long = "b".repeat(4096);
        let store = Arc::new(SecretStore::new(short.clone()));

        let writer = {
            let store = Arc::clone(&store);
            let (short, long) = (short.clone(), long.clone());
            thread::spawn(move || {
                for i in 0..2000 {
                    let next = if i % 2 == 0 { &long } else { &short };
                    store.set(next.as_str()).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let (short, long) = (short.clone(), long.clone());
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let snapshot = store.get();
                        let value = snapshot.value();
                        assert!(value == short || value == long);
                        assert_eq!(snapshot.len(), value.len());
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[tokio::test]
    async fn test_reload_trims_trailing_newlines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("FAKE_SECRET"), "new-secret\r\n\n").unwrap();

        let store = SecretStore::new("old-secret");
        let len = reload(&store, dir.path()).await.unwrap();

        assert_eq!(len, 10);
        assert_eq!(store.get().value(), "new-secret");
    }

    #[tokio::test]
    async fn test_reload_keeps_inner_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("FAKE_SECRET"), "  spaced out \n").unwrap();

        let store = SecretStore::new("");
        reload(&store, dir.path()).await.unwrap();

        assert_eq!(store.get().value(), "  spaced out ");
    }

    #[tokio::test]
    async fn test_reload_missing_file_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::new("should-stay");

        let err = reload(&store, &dir.path().join("missing")).await.unwrap_err();

        assert!(matches!(err, ReloadError::Read { .. }));
        assert_eq!(store.get().value(), "should-stay");
    }

    #[tokio::test]
    async fn test_reload_rejected_value_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("FAKE_SECRET"), "bad\0secret\n").unwrap();
        let store = SecretStore::new("should-stay");

        let err = reload(&store, dir.path()).await.unwrap_err();

        assert!(matches!(err, ReloadError::Update(SecretError::ContainsNul)));
        assert_eq!(store.get().value(), "should-stay");
    }
}
