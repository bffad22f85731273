//! Durable, observable storage for the session token.
//!
//! A single token value is persisted to disk so the session survives
//! process restarts, and mirrored into a watch channel so any number of
//! consumers (view-models, the request authenticator) can observe the
//! current value and every subsequent change. Slow consumers see the
//! latest value, not a backlog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::debug;

/// Token file name in the data directory
const TOKEN_FILE: &str = "session.json";

/// On-disk shape of the persisted session.
/// The field name matches the preference key used by earlier clients.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedToken {
    auth_token: String,
}

pub struct TokenStore {
    path: PathBuf,
    tx: watch::Sender<Option<String>>,
    // Serializes save/clear so concurrent writers cannot interleave
    write_lock: Mutex<()>,
}

impl TokenStore {
    /// Open the store rooted at `data_dir`, loading any token persisted
    /// by a previous run.
    pub async fn open(data_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .context("Failed to create token storage directory")?;

        let path = data_dir.join(TOKEN_FILE);
        let initial = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let persisted: PersistedToken = serde_json::from_str(&contents)
                    .context("Failed to parse persisted session file")?;
                debug!(chars = persisted.auth_token.len(), "Loaded persisted token");
                Some(persisted.auth_token)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e).context("Failed to read persisted session file"),
        };

        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        })
    }

    /// Persist a token, overwriting any existing value.
    /// Observers see the new value only after the write has completed.
    pub async fn save(&self, token: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let contents = serde_json::to_string_pretty(&PersistedToken {
            auth_token: token.to_string(),
        })?;

        // Write to a sibling temp file and rename so an interrupted write
        // never leaves a partial session file behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .context("Failed to write session file")?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("Failed to commit session file")?;

        self.tx.send_replace(Some(token.to_string()));
        Ok(())
    }

    /// Remove the persisted token. A no-op if nothing is stored.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("Failed to remove session file"),
        }

        self.tx.send_replace(None);
        Ok(())
    }

    /// Latest committed token value, `None` when logged out.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Subscribe to token changes. The receiver holds the current value
    /// immediately; `changed().await` wakes on every later save/clear.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_current_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();

        assert_eq!(store.current(), None);
        store.save("abc.def.ghi").await.unwrap();
        assert_eq!(store.current(), Some("abc.def.ghi".to_string()));
    }

    #[tokio::test]
    async fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();
            store.save("persisted-token").await.unwrap();
        }

        let reopened = TokenStore::open(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(reopened.current(), Some("persisted-token".to_string()));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();

        store.save("tok").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.current(), None);

        // Second clear with nothing stored must also succeed
        store.clear().await.unwrap();
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn clear_removes_the_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();

        store.save("tok").await.unwrap();
        assert!(dir.path().join(TOKEN_FILE).exists());

        store.clear().await.unwrap();
        assert!(!dir.path().join(TOKEN_FILE).exists());
    }

    #[tokio::test]
    async fn subscribers_observe_saves_and_clears_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();

        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), None);

        store.save("abc").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some("abc".to_string()));

        store.clear().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test]
    async fn independent_subscribers_each_see_the_full_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();

        let mut rx_a = store.subscribe();
        let mut rx_b = store.subscribe();
        assert_eq!(*rx_a.borrow(), None);
        assert_eq!(*rx_b.borrow(), None);

        store.save("abc").await.unwrap();
        rx_a.changed().await.unwrap();
        rx_b.changed().await.unwrap();
        assert_eq!(*rx_a.borrow(), Some("abc".to_string()));
        assert_eq!(*rx_b.borrow(), Some("abc".to_string()));

        store.clear().await.unwrap();
        rx_a.changed().await.unwrap();
        rx_b.changed().await.unwrap();
        assert_eq!(*rx_a.borrow(), None);
        assert_eq!(*rx_b.borrow(), None);
    }

    #[tokio::test]
    async fn late_subscriber_gets_latest_value_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().to_path_buf()).await.unwrap();

        store.save("first").await.unwrap();
        store.save("second").await.unwrap();

        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "not json").unwrap();

        assert!(TokenStore::open(dir.path().to_path_buf()).await.is_err());
    }
}
