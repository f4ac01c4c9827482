// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, warn};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::errors::Error;

static LAST_TIMESTAMP_NANOS: AtomicU64 = AtomicU64::new(0);

/// Nanoseconds since the epoch, strictly increasing within this process so
/// that two dumps for the same id never share a file name.
fn unique_timestamp_nanos() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0);

    let mut last = LAST_TIMESTAMP_NANOS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last.saturating_add(1));
        match LAST_TIMESTAMP_NANOS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

pub fn log_file_name(id: &str, timestamp_nanos: u64) -> String {
    format!("{id}-{timestamp_nanos}.log")
}

/// Four-letter level names, as logrus prints them.
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERRO",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBU",
        Level::Trace => "TRAC",
    }
}

fn format_line(level: Level, at: OffsetDateTime, message: fmt::Arguments<'_>) -> String {
    let at = at
        .format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("{}[{}] {}\n", level_tag(level), at, message)
}

/// Append-only, synchronously written dump file. Closed on drop.
///
/// Write failures are reported through the process logger and otherwise
/// ignored: a dump that loses a line is still worth more than no dump.
#[derive(Debug)]
pub struct DumpLog {
    file: File,
    path: PathBuf,
}

impl DumpLog {
    /// Creates `dir` if needed and opens `<id>-<nanos>.log` inside it.
    pub fn create(dir: &Path, id: &str) -> Result<Self, Error> {
        DirBuilder::new()
            .recursive(true)
            .mode(0o755)
            .create(dir)
            .map_err(|source| Error::CreateOutputDir {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(log_file_name(id, unique_timestamp_nanos()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .mode(0o666)
            .custom_flags(libc::O_SYNC)
            .open(&path)
            .map_err(|source| Error::OpenLogFile {
                path: path.clone(),
                source,
            })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&mut self, level: Level, message: fmt::Arguments<'_>) {
        let line = format_line(level, OffsetDateTime::now_utc(), message);
        self.write_raw(line.as_bytes());
    }

    pub fn debug(&mut self, message: fmt::Arguments<'_>) {
        self.log(Level::Debug, message);
    }

    pub fn error(&mut self, message: fmt::Arguments<'_>) {
        self.log(Level::Error, message);
    }

    /// Writes `data` with no prefix or trailing newline.
    pub fn write_raw(&mut self, data: &[u8]) {
        if let Err(e) = self.file.write_all(data) {
            warn!("failed to write to {}: {e}", self.path.display());
        }
    }
}
