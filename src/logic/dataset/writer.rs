use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;

use super::record::ScoreLogRecord;
use super::ScoreSink;
use crate::logic::error::EngineResult;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB
const FILE_PREFIX: &str = "scores-";

/// Summary of the files in a log directory
#[derive(Debug, Clone, PartialEq)]
pub struct SinkStats {
    pub files: usize,
    pub total_bytes: u64,
    pub current_file: Option<String>,
}

/// Append-only JSONL sink, one file per `max_file_size` bytes
pub struct JsonlScoreSink {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
    max_file_size: u64,
}

impl JsonlScoreSink {
    pub fn new(base_dir: PathBuf) -> EngineResult<Self> {
        Self::with_max_file_size(base_dir, MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(base_dir: PathBuf, max_file_size: u64) -> EngineResult<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            file: Mutex::new(None),
            base_dir,
            max_file_size: max_file_size.max(1),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Append one record, rotating when the current file is full
    pub fn append(&self, record: &ScoreLogRecord) -> io::Result<()> {
        let mut guard = self.file.lock();

        if guard.is_none() {
            *guard = Some(match self.find_latest_log_file()? {
                Some(path) => {
                    let f = OpenOptions::new().append(true).open(&path)?;
                    if f.metadata()?.len() < self.max_file_size {
                        f
                    } else {
                        self.create_new_file()?
                    }
                }
                None => self.create_new_file()?,
            });
        }

        // the open file may have filled up since the last call
        let should_rotate = match guard.as_ref() {
            Some(f) => f.metadata()?.len() >= self.max_file_size,
            None => false,
        };
        if should_rotate {
            *guard = Some(self.create_new_file()?);
        }

        if let Some(file) = guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    pub fn stats(&self) -> io::Result<SinkStats> {
        let paths = self.log_files()?;
        let mut total_bytes = 0;
        for path in &paths {
            total_bytes += fs::metadata(path)?.len();
        }

        Ok(SinkStats {
            files: paths.len(),
            total_bytes,
            current_file: paths
                .last()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(String::from),
        })
    }

    /// Log files in chronological (name) order
    pub fn log_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| is_log_file(p))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn create_new_file(&self) -> io::Result<File> {
        // YYYYMMDD-HHMMSS-NNNN; the counter separates rotations within one second
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let mut seq = 0u32;
        let path = loop {
            let candidate = self
                .base_dir
                .join(format!("{}{}-{:04}.jsonl", FILE_PREFIX, stamp, seq));
            if !candidate.exists() {
                break candidate;
            }
            seq += 1;
        };

        log::info!("Opening score log {:?}", path);
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn find_latest_log_file(&self) -> io::Result<Option<PathBuf>> {
        Ok(self.log_files()?.pop())
    }
}

impl ScoreSink for JsonlScoreSink {
    fn record(&self, record: &ScoreLogRecord) -> EngineResult<()> {
        self.append(record)?;
        Ok(())
    }
}

pub(crate) fn is_log_file(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "jsonl")
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.starts_with(FILE_PREFIX))
}
