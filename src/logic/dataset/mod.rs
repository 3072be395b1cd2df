//! Dataset Module - Score logging, JSONL and CSV files
//!
//! One `ScoreLogRecord` per scored request goes to a `ScoreSink`. The JSONL
//! sink appends to size-rotated files under a log directory; the helpers in
//! `export` and `table` read and write the row files used for training and
//! batch runs.

pub mod export;
pub mod record;
pub mod table;
pub mod writer;


use parking_lot::Mutex;

use crate::logic::error::EngineResult;

pub use export::{export_logs, load_raw_records, read_jsonl_rows, write_jsonl_rows, JsonRow};
pub use record::ScoreLogRecord;
pub use table::{is_csv, read_csv_rows, write_csv_rows, CsvTable};
pub use writer::{JsonlScoreSink, SinkStats};

/// Destination for scored requests
pub trait ScoreSink: Send + Sync {
    fn record(&self, record: &ScoreLogRecord) -> EngineResult<()>;
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ScoreLogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ScoreLogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ScoreSink for MemorySink {
    fn record(&self, record: &ScoreLogRecord) -> EngineResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
