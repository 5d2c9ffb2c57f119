//! Durable storage for the conversation.
//!
//! The snapshot is a pretty-printed JSON array of messages. Loading is
//! fail-open: a missing, unreadable, or malformed file yields an empty
//! conversation. Saving and clearing are best-effort; failures are logged and
//! never reach the caller.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::core::config::data::path_display;
use crate::core::message::Conversation;

/// Errors raised while reading or writing a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// The snapshot exists but could not be read.
    Read { path: PathBuf, source: io::Error },

    /// The snapshot is not a JSON array of messages.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The conversation could not be encoded.
    Encode(serde_json::Error),

    /// Creating the directory or the temporary file failed.
    Write { path: PathBuf, source: io::Error },

    /// Moving the finished temporary file into place failed.
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Read { path, source } => write!(
                f,
                "Failed to read conversation at {}: {}",
                path_display(path),
                source
            ),
            SnapshotError::Parse { path, source } => write!(
                f,
                "Failed to parse conversation at {}: {}",
                path_display(path),
                source
            ),
            SnapshotError::Encode(source) => write!(f, "Failed to encode conversation: {source}"),
            SnapshotError::Write { path, source } => write!(
                f,
                "Failed to write conversation to {}: {}",
                path_display(path),
                source
            ),
            SnapshotError::Persist { path, source } => write!(
                f,
                "Failed to replace conversation at {}: {}",
                path_display(path),
                source
            ),
        }
    }
}

impl StdError for SnapshotError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SnapshotError::Read { source, .. } | SnapshotError::Write { source, .. } => {
                Some(source)
            }
            SnapshotError::Parse { source, .. } | SnapshotError::Encode(source) => Some(source),
            SnapshotError::Persist { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the saved conversation, or an empty one when there is nothing
    /// usable on disk.
    pub fn load(&self) -> Conversation {
        match self.read_snapshot() {
            Ok(Some(conversation)) => {
                debug!(
                    path = %self.path.display(),
                    messages = conversation.len(),
                    "loaded conversation snapshot"
                );
                conversation
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no conversation snapshot");
                Conversation::new()
            }
            Err(err) => {
                warn!(error = %err, "ignoring unusable conversation snapshot");
                Conversation::new()
            }
        }
    }

    /// Reads the snapshot, distinguishing "absent" from "broken".
    pub fn read_snapshot(&self) -> Result<Option<Conversation>, SnapshotError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| SnapshotError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the snapshot with `conversation`. Failures are logged only.
    pub fn save(&self, conversation: &Conversation) {
        match self.write_snapshot(conversation) {
            Ok(()) => debug!(
                path = %self.path.display(),
                messages = conversation.len(),
                "saved conversation snapshot"
            ),
            Err(err) => warn!(error = %err, "conversation was not saved"),
        }
    }

    /// Writes to a temporary file next to the target, then renames it over
    /// the old snapshot.
    pub fn write_snapshot(&self, conversation: &Conversation) -> Result<(), SnapshotError> {
        let write_error = |source| SnapshotError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_error)?;
        }

        let contents =
            serde_json::to_string_pretty(conversation).map_err(SnapshotError::Encode)?;
        let mut temp_file = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))
            .map_err(write_error)?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(write_error)?;
        temp_file.as_file_mut().sync_all().map_err(write_error)?;
        temp_file
            .persist(&self.path)
            .map_err(|source| SnapshotError::Persist {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }

    /// Deletes the snapshot. A missing file is fine.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed conversation snapshot"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove conversation snapshot"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Message, Role};
    use crate::utils::test_utils::sample_conversation;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> MemoryStore {
        MemoryStore::new(dir.path().join("conversation_memory.json"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        let conversation = sample_conversation();

        store.save(&conversation);

        assert_eq!(store.load(), conversation);
    }

    #[test]
    fn resaving_a_loaded_snapshot_keeps_it_identical() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        store.save(&sample_conversation());
        let first = fs::read_to_string(store.path()).unwrap();

        store.save(&store.load());

        assert_eq!(fs::read_to_string(store.path()).unwrap(), first);
        assert_eq!(store.load(), sample_conversation());
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);

        assert!(store.load().is_empty());
        assert!(matches!(store.read_snapshot(), Ok(None)));
    }

    #[test]
    fn malformed_snapshots_load_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);

        let cases = [
            "not json at all",
            r#"{"role": "user", "content": "an object, not an array"}"#,
            r#"[{"role": "system", "content": "unknown role"}]"#,
            r#"[{"role": "user"}]"#,
            r#""just a string""#,
            "",
        ];

        for contents in cases {
            fs::write(store.path(), contents).unwrap();
            assert!(
                store.load().is_empty(),
                "expected empty conversation for {contents:?}"
            );
            assert!(
                matches!(store.read_snapshot(), Err(SnapshotError::Parse { .. })),
                "expected parse error for {contents:?}"
            );
        }
    }

    #[test]
    fn snapshot_is_readable_json_array() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        store.save(&Conversation::from(vec![
            Message::user("héllo"),
            Message::greeting("welcome"),
        ]));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("héllo"), "non-ASCII text should be stored as-is");
        assert!(raw.contains('\n'), "snapshot should be indented");

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["role"], "user");
        assert_eq!(value[0]["content"], "héllo");
        assert_eq!(value[1]["role"], "assistant");
        assert_eq!(value[1]["origin"], "greeting");
    }

    #[test]
    fn snapshot_without_origin_fields_loads() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        fs::write(
            store.path(),
            r#"[{"role": "user", "content": "a"}, {"role": "assistant", "content": "b"}]"#,
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.messages()[1].role(), Role::Assistant);
        assert!(!loaded.messages()[1].is_autoreply());
    }

    #[test]
    fn save_creates_missing_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = MemoryStore::new(temp_dir.path().join("nested/deeper/memory.json"));

        store.save(&sample_conversation());

        assert_eq!(store.load(), sample_conversation());
    }

    #[test]
    fn failed_save_is_swallowed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        let store = MemoryStore::new(&target);

        store.save(&sample_conversation());

        assert!(store.write_snapshot(&sample_conversation()).is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn clear_removes_snapshot_and_tolerates_absence() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        store.save(&sample_conversation());
        assert!(store.path().exists());

        store.clear();
        assert!(!store.path().exists());
        assert!(store.load().is_empty());

        store.clear();
    }
}
