//! Local fallback for registrations that could not reach the spreadsheet.
//!
//! Append-only, pipe-delimited, one line per registration in the same
//! column order as the sheet row, no header. Nothing in the system reads
//! this file back; it exists so a sheets outage never loses a submission.

use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

pub struct FallbackWriter {
    path: PathBuf,
    // Serializes writers within the process so lines never interleave.
    lock: Mutex<()>,
}

impl FallbackWriter {
    pub fn new(path: PathBuf) -> Self {
        FallbackWriter {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn append(&self, row: &[String]) -> Result<(), csv::Error> {
        let _guard = self.lock.lock().unwrap();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;

        tracing::info!("registration saved to {}", self.path.display());
        Ok(())
    }
}
