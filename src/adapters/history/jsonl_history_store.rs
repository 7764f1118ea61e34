//! JSON Lines History Store Adapter
//!
//! One `HistoryEntry` per line, appended to a single file that is opened once
//! at startup. The file is opened with `O_APPEND` and every record goes out as
//! one newline-terminated write followed by `sync_data`, so records written by
//! concurrent processes never interleave. Writers inside this process are
//! serialized by an async mutex.
//!
//! A writer that crashes mid-record leaves a torn last line. Readers skip
//! lines that do not parse. Before each append the last byte of the file is
//! checked; if another writer left a torn tail, the record is written with a
//! leading newline so it starts on a fresh line.
//!
//! Session ids already in the file are loaded at `open` and tracked as
//! entries are appended, so a session is written at most once per log.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::domain::history::HistoryEntry;
use crate::ports::{HistoryError, HistoryStore};

/// File-backed append-only history log.
#[derive(Debug)]
pub struct JsonlHistoryStore {
    path: PathBuf,
    log: Mutex<Log>,
}

#[derive(Debug)]
struct Log {
    file: File,
    recorded: HashSet<SessionId>,
}

impl JsonlHistoryStore {
    /// Opens (creating if needed) the log at `path`.
    ///
    /// Parent directories are created. A trailing partial record is
    /// terminated with a newline.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if Self::has_torn_tail(&path).await? {
            tracing::warn!(path = %path.display(), "Terminating torn trailing history record");
            file.write_all(b"\n").await?;
            file.flush().await?;
            file.sync_data().await?;
        }

        let existing = fs::read(&path).await?;
        let recorded: HashSet<SessionId> = Self::parse_lines(&path, &existing)
            .iter()
            .map(|entry| *entry.session_id())
            .collect();

        tracing::info!(
            path = %path.display(),
            entries = recorded.len(),
            "Opened history log"
        );

        Ok(Self {
            path,
            log: Mutex::new(Log { file, recorded }),
        })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file is non-empty and does not end in a newline.
    async fn has_torn_tail(path: &Path) -> Result<bool, HistoryError> {
        let mut reader = File::open(path).await?;
        let len = reader.metadata().await?.len();
        if len == 0 {
            return Ok(false);
        }

        reader.seek(SeekFrom::Start(len - 1)).await?;
        let mut last = [0u8; 1];
        reader.read_exact(&mut last).await?;
        Ok(last[0] != b'\n')
    }

    fn parse_lines(path: &Path, bytes: &[u8]) -> Vec<HistoryEntry> {
        let mut entries = Vec::new();

        for (index, line) in bytes.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<HistoryEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = index + 1,
                        error = %err,
                        "Skipping unreadable history record"
                    );
                }
            }
        }

        entries
    }
}

#[async_trait]
impl HistoryStore for JsonlHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let json = serde_json::to_vec(entry)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        let mut log = self.log.lock().await;
        if log.recorded.contains(entry.session_id()) {
            return Err(HistoryError::Duplicate(*entry.session_id()));
        }

        let mut record = Vec::with_capacity(json.len() + 2);
        if Self::has_torn_tail(&self.path).await? {
            tracing::warn!(path = %self.path.display(), "Starting record after torn history line");
            record.push(b'\n');
        }
        record.extend_from_slice(&json);
        record.push(b'\n');

        log.file.write_all(&record).await?;
        log.file.flush().await?;
        log.file.sync_data().await?;
        log.recorded.insert(*entry.session_id());

        tracing::debug!(
            session_id = %entry.session_id(),
            case_id = %entry.case_id(),
            score = entry.score().value(),
            "Appended history record"
        );
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(Self::parse_lines(&self.path, &bytes))
    }
}
