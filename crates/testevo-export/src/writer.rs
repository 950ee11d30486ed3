use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::ExportError;
use crate::records::EvolutionRecord;

/// Sink for typed records. Implementations own their format; the core
/// only guarantees call order (records of one version before the next).
pub trait RecordWriter {
    fn write(&mut self, record: &EvolutionRecord) -> Result<(), ExportError>;
    fn flush(&mut self) -> Result<(), ExportError>;
}

/// One JSON object per line, appended to a file.
pub struct JsonLinesWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLinesWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordWriter for JsonLinesWriter {
    fn write(&mut self, record: &EvolutionRecord) -> Result<(), ExportError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        self.out.flush()?;
        Ok(())
    }
}

pub type SharedRecords = Arc<Mutex<Vec<EvolutionRecord>>>;

/// Collects records in memory; the test double for file-backed writers.
pub struct MemoryWriter {
    records: SharedRecords,
}

impl MemoryWriter {
    pub fn shared() -> (Self, SharedRecords) {
        let records: SharedRecords = Arc::default();
        (
            Self {
                records: Arc::clone(&records),
            },
            records,
        )
    }
}

impl RecordWriter for MemoryWriter {
    fn write(&mut self, record: &EvolutionRecord) -> Result<(), ExportError> {
        self.records
            .lock()
            .expect("record buffer poisoned")
            .push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}
