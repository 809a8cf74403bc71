use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error, warn};

use super::domain::{NewProduct, ProductId, ScoredProduct};
use super::repository::{newest_first, ProductRepository, RepositoryError};

/// Append target for encoded records.
pub(crate) trait LineSink: Send {
    fn committed_len(&self) -> io::Result<u64>;
    /// Write, flush and sync one newline-terminated record.
    fn write_line(&mut self, line: &[u8]) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LineSink for File {
    fn committed_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.write_all(line)?;
        self.flush()?;
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_data()
    }
}

struct FileState {
    sink: Box<dyn LineSink>,
    records: Vec<ScoredProduct>,
    last_id: u64,
}

/// Durable store writing one JSON record per line.
///
/// The whole file is indexed in memory on open; each append writes and syncs
/// a single line before the record becomes visible to readers. A failed
/// append is truncated away so the file never ends in a partial line.
pub struct JsonLinesProductRepository {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl JsonLinesProductRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (records, torn_tail) = if path.exists() {
            (load_records(&path)?, ends_mid_line(&path)?)
        } else {
            (Vec::new(), false)
        };

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if torn_tail {
            // Keep the next append off the unterminated line.
            warn!(path = %path.display(), "product store ended mid-line; terminating it");
            file.write_line(b"\n")?;
        }
        debug!(path = %path.display(), records = records.len(), "opened product store");

        Ok(Self::with_sink(path, Box::new(file), records))
    }

    pub(crate) fn with_sink(
        path: PathBuf,
        sink: Box<dyn LineSink>,
        mut records: Vec<ScoredProduct>,
    ) -> Self {
        records.sort_by_key(|record| record.id);
        let last_id = records.last().map(|record| record.id.0).unwrap_or(0);
        Self {
            path,
            state: Mutex::new(FileState {
                sink,
                records,
                last_id,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, FileState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("file store lock poisoned".to_string()))
    }
}

fn load_records(path: &Path) -> Result<Vec<ScoredProduct>, RepositoryError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ScoredProduct>(&line) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(path = %path.display(), line = index + 1, %err, "skipping malformed product record");
            }
        }
    }
    Ok(records)
}

fn ends_mid_line(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl ProductRepository for JsonLinesProductRepository {
    fn append(&self, product: NewProduct) -> Result<ScoredProduct, RepositoryError> {
        let mut guard = self.lock()?;
        // Ids are never reused, even when the write below fails.
        let id = ProductId(guard.last_id + 1);
        guard.last_id = id.0;
        let record = product.into_record(id, Utc::now());

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let committed = guard.sink.committed_len()?;
        if let Err(err) = guard.sink.write_line(line.as_bytes()) {
            if let Err(rollback) = guard.sink.truncate(committed) {
                error!(path = %self.path.display(), %rollback, "failed to roll back product record");
            }
            return Err(err.into());
        }

        guard.records.push(record.clone());
        Ok(record)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<ScoredProduct>, RepositoryError> {
        let guard = self.lock()?;
        Ok(newest_first(&guard.records, limit))
    }

    fn list_all(&self) -> Result<Vec<ScoredProduct>, RepositoryError> {
        Ok(self.lock()?.records.clone())
    }
}
