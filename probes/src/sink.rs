use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;

/// Append-only text artifact fed by many probe invocations at once.
///
/// The file handle is shared across every worker, so writes are serialized
/// behind a mutex; one call appends exactly one line.
pub struct ResultSink {
    file: Mutex<File>,
}

impl ResultSink {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening result file {}", path.display()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn record(&self, entry: &str) -> io::Result<()> {
        let mut file = self.file.lock().expect("result sink poisoned");
        writeln!(file, "{entry}")
    }
}
