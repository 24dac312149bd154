use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Errors surfaced by a single [`RotatingFileSink::append`] call.
///
/// The record being written is dropped; the sink stays enabled and the
/// next append retries.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write log file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

type DateSource = Box<dyn Fn() -> NaiveDate + Send + Sync>;

struct OpenFile {
    date: NaiveDate,
    path: PathBuf,
    file: File,
}

struct RotationState {
    enabled: bool,
    current: Option<OpenFile>,
}

impl RotationState {
    fn close(&mut self) {
        if let Some(mut open) = self.current.take() {
            let _ = open.file.flush();
        }
    }
}

/// Append-only log file that rolls over to `<YYYY-MM-DD>.log` whenever the
/// calendar day changes.
///
/// States: disabled, enabled without an open file, enabled with the file
/// for one day open. The rotation decision and the append run under one
/// write guard; observers take the read guard.
pub struct RotatingFileSink {
    dir: PathBuf,
    today: DateSource,
    state: RwLock<RotationState>,
}

impl RotatingFileSink {
    /// Disabled sink writing under `dir`, dated by the local calendar.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_date_source(dir, || Local::now().date_naive())
    }

    /// Disabled sink whose notion of "today" comes from `today`.
    pub fn with_date_source<F>(dir: impl Into<PathBuf>, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        RotatingFileSink {
            dir: dir.into(),
            today: Box::new(today),
            state: RwLock::new(RotationState {
                enabled: false,
                current: None,
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path used for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.log", date.format("%Y-%m-%d")))
    }

    pub fn enable(&self) {
        self.state.write().enabled = true;
    }

    /// Flush and close any open file, then stop accepting writes.
    pub fn disable(&self) {
        let mut state = self.state.write();
        state.close();
        state.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    pub fn is_open(&self) -> bool {
        self.state.read().current.is_some()
    }

    /// Day of the currently open file, if any.
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.state.read().current.as_ref().map(|open| open.date)
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.read().current.as_ref().map(|open| open.path.clone())
    }

    /// Append `rendered` plus a trailing newline to today's file, rotating
    /// first if the day changed. A disabled sink ignores the call.
    pub fn append(&self, rendered: &str) -> Result<(), SinkError> {
        let mut state = self.state.write();
        if !state.enabled {
            return Ok(());
        }

        let today = (self.today)();
        if state.current.as_ref().map(|open| open.date) != Some(today) {
            state.close();
            state.current = Some(self.open(today)?);
        }

        let Some(open) = state.current.as_mut() else {
            return Ok(());
        };

        let mut line = String::with_capacity(rendered.len() + 1);
        line.push_str(rendered);
        line.push('\n');
        open.file
            .write_all(line.as_bytes())
            .map_err(|source| SinkError::Write {
                path: open.path.clone(),
                source,
            })
    }

    pub fn flush(&self) -> io::Result<()> {
        let mut state = self.state.write();
        match state.current.as_mut() {
            Some(open) => open.file.flush(),
            None => Ok(()),
        }
    }

    fn open(&self, date: NaiveDate) -> Result<OpenFile, SinkError> {
        fs::create_dir_all(&self.dir).map_err(|source| SinkError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(date);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(OpenFile { date, path, file })
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        self.state.get_mut().close();
    }
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RotatingFileSink")
            .field("dir", &self.dir)
            .field("enabled", &state.enabled)
            .field("current_date", &state.current.as_ref().map(|o| o.date))
            .finish()
    }
}
