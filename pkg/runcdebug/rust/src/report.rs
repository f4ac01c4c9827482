// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Best-effort description of a path's metadata. Nothing here returns an
//! error: every failure becomes a line in the dump.

use std::fmt;
use std::fs::{self, DirEntry, Metadata};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::mode::Mode;
use crate::sink::DumpLog;

/// The `struct stat` fields that have no portable accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStat {
    pub dev: u64,
    pub ino: u64,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub blksize: u64,
    pub blocks: u64,
    pub atime: i64,
    pub atime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub ctime: i64,
    pub ctime_nsec: i64,
}

impl From<&Metadata> for RawStat {
    fn from(m: &Metadata) -> Self {
        Self {
            dev: m.dev(),
            ino: m.ino(),
            nlink: m.nlink(),
            uid: m.uid(),
            gid: m.gid(),
            rdev: m.rdev(),
            blksize: m.blksize(),
            blocks: m.blocks(),
            atime: m.atime(),
            atime_nsec: m.atime_nsec(),
            mtime: m.mtime(),
            mtime_nsec: m.mtime_nsec(),
            ctime: m.ctime(),
            ctime_nsec: m.ctime_nsec(),
        }
    }
}

/// Size, mode, mtime, directory flag and raw status of one path.
#[derive(Debug)]
pub struct StatSummary {
    pub size: u64,
    pub mode: Mode,
    pub modified: Option<OffsetDateTime>,
    pub is_dir: bool,
    pub raw: RawStat,
}

impl StatSummary {
    pub fn new(metadata: &Metadata) -> Self {
        let mode = Mode::from_metadata(metadata);
        Self {
            size: metadata.len(),
            mode,
            modified: mtime_from_raw(metadata.mtime(), metadata.mtime_nsec()),
            is_dir: mode.is_dir(),
            raw: RawStat::from(metadata),
        }
    }
}

/// None when the filesystem holds a time `OffsetDateTime` cannot represent.
fn mtime_from_raw(secs: i64, nsecs: i64) -> Option<OffsetDateTime> {
    let nanos = i128::from(secs) * 1_000_000_000 + i128::from(nsecs);
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

impl fmt::Display for StatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modified = self
            .modified
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| "unknown".to_string());
        write!(
            f,
            "{} {} {} {} {:?}",
            self.size, self.mode, modified, self.is_dir, self.raw
        )
    }
}

/// Reads a symlink. Relative targets are resolved against the link's own
/// directory rather than the working directory.
pub fn resolve_link(path: &Path) -> io::Result<PathBuf> {
    let target = fs::read_link(path)?;
    if target.is_absolute() {
        return Ok(target);
    }
    Ok(match path.parent() {
        Some(parent) => parent.join(target),
        None => target,
    })
}

pub fn report_path(log: &mut DumpLog, label: &str, path: &Path) {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            log.error(format_args!("lstat {label}: {e}"));
            return;
        }
    };
    let summary = StatSummary::new(&metadata);
    log.debug(format_args!("lstat {label}: {summary}"));

    let (dir_path, summary) = if summary.mode.is_symlink() {
        let target = match resolve_link(path) {
            Ok(target) => target,
            Err(e) => {
                log.error(format_args!("readlink {label}: {e}"));
                return;
            }
        };
        let target_metadata = match fs::symlink_metadata(&target) {
            Ok(metadata) => metadata,
            Err(e) => {
                log.error(format_args!("stat {label}: {e}"));
                return;
            }
        };
        let target_summary = StatSummary::new(&target_metadata);
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.display().to_string());
        log.debug(format_args!("stat {name}: {target_summary}"));
        (target, target_summary)
    } else {
        (path.to_path_buf(), summary)
    };

    if summary.is_dir {
        list_dir(log, label, &dir_path);
    }
}

fn list_dir(log: &mut DumpLog, label: &str, path: &Path) {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            log.error(format_args!("open {label}: {e}"));
            return;
        }
    };
    let mut entries = match entries.collect::<io::Result<Vec<DirEntry>>>() {
        Ok(entries) => entries,
        Err(e) => {
            log.error(format_args!("readdir {label}: {e}"));
            return;
        }
    };
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        // DirEntry::metadata does not follow symlinks.
        match entry.metadata() {
            Ok(metadata) => log.debug(format_args!(
                "readdir: {name}, {}, {}",
                metadata.is_dir(),
                Mode::from_metadata(&metadata)
            )),
            Err(e) => log.error(format_args!("readdir {label}: {name}: {e}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn report(label: &str, path: &Path) -> (TempDir, Vec<String>) {
        let out = tempfile::tempdir().unwrap();
        let mut log = DumpLog::create(out.path(), "report").unwrap();
        report_path(&mut log, label, path);
        let contents = fs::read_to_string(log.path()).unwrap();
        let lines = contents.lines().map(str::to_string).collect();
        (out, lines)
    }

    #[test]
    fn test_missing_path_logs_single_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_out, lines) = report("root", &dir.path().join("missing"));

        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with("ERRO["));
        assert!(lines[0].contains("lstat root: "));
    }

    #[test]
    fn test_empty_path_logs_single_error() {
        let (_out, lines) = report("root", Path::new(""));
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with("ERRO["));
    }

    #[test]
    fn test_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hosts");
        fs::write(&file, "127.0.0.1 localhost\n").unwrap();

        let (_out, lines) = report("mount-0 /etc/hosts", &file);

        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with("DEBU["));
        assert!(lines[0].contains("lstat mount-0 /etc/hosts: 20 -rw"));
        assert!(lines[0].contains(" false RawStat {"));
    }

    #[test]
    fn test_directory_lists_children_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zeta"), "").unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("alpha").join("nested")).unwrap();

        let (_out, lines) = report("root", dir.path());

        assert_eq!(lines.len(), 3, "{lines:?}");
        assert!(lines[0].contains("lstat root: "));
        assert!(lines[0].contains(" drwx"));
        assert!(lines[0].contains(" true RawStat {"));
        assert!(lines[1].contains("readdir: alpha, true, d"));
        assert!(lines[2].contains("readdir: zeta, false, -"));
    }

    #[test]
    fn test_symlink_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rootfs-real");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("a"), "").unwrap();
        fs::create_dir(target.join("b")).unwrap();
        let link = dir.path().join("rootfs");
        symlink(&target, &link).unwrap();

        let (_out, lines) = report("root", &link);

        assert_eq!(lines.len(), 4, "{lines:?}");
        assert!(lines[0].contains("lstat root: "));
        assert!(lines[0].contains(" lrwxrwxrwx "));
        assert!(lines[1].contains("stat rootfs-real: "));
        assert!(lines[1].contains(" true RawStat {"));
        assert!(lines[2].contains("readdir: a, false, "));
        assert!(lines[3].contains("readdir: b, true, "));
    }

    #[test]
    fn test_relative_symlink_resolves_against_link_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real").join("only"), "").unwrap();
        let link = dir.path().join("link");
        symlink("real", &link).unwrap();

        assert_eq!(resolve_link(&link).unwrap(), dir.path().join("real"));

        let (_out, lines) = report("root", &link);
        assert_eq!(lines.len(), 3, "{lines:?}");
        assert!(lines[1].contains("stat real: "));
        assert!(lines[2].contains("readdir: only, false, "));
    }

    #[test]
    fn test_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        symlink(dir.path().join("gone"), &link).unwrap();

        let (_out, lines) = report("root", &link);

        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].starts_with("DEBU["));
        assert!(lines[1].starts_with("ERRO["));
        assert!(lines[1].contains("stat root: "));
    }

    #[test]
    fn test_symlink_to_file_is_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("resolv.conf");
        fs::write(&target, "nameserver 1.1.1.1\n").unwrap();
        let link = dir.path().join("link");
        symlink(&target, &link).unwrap();

        let (_out, lines) = report("root", &link);

        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[1].contains("stat resolv.conf: "));
        assert!(lines[1].contains(" false RawStat {"));
    }

    #[test]
    fn test_mtime_out_of_range_is_unknown() {
        assert!(mtime_from_raw(300_000_000_000, 0).is_none());
        assert!(mtime_from_raw(i64::MIN, 0).is_none());
        assert_eq!(
            mtime_from_raw(1, 500),
            Some(OffsetDateTime::from_unix_timestamp_nanos(1_000_000_500).unwrap())
        );
    }

    #[test]
    fn test_far_future_mtime_does_not_abort_report() {
        // tmpfs stores 64-bit times; most disk filesystems clamp them.
        let shm = Path::new("/dev/shm");
        if !shm.is_dir() {
            return;
        }
        let dir = tempfile::tempdir_in(shm).unwrap();
        let file = dir.path().join("future");
        let handle = fs::File::create(&file).unwrap();
        let future = std::time::UNIX_EPOCH + std::time::Duration::from_secs(300_000_000_000);
        handle.set_modified(future).unwrap();
        drop(handle);

        let (_out, lines) = report("root", &file);

        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with("DEBU["));
        assert!(lines[0].contains(" unknown false RawStat {"), "{}", lines[0]);
    }

    fn list(label: &str, path: &Path) -> (TempDir, Vec<String>) {
        let out = tempfile::tempdir().unwrap();
        let mut log = DumpLog::create(out.path(), "list").unwrap();
        list_dir(&mut log, label, path);
        let contents = fs::read_to_string(log.path()).unwrap();
        let lines = contents.lines().map(str::to_string).collect();
        (out, lines)
    }

    #[test]
    fn test_list_dir_missing_directory_logs_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_out, lines) = list("root", &dir.path().join("vanished"));

        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with("ERRO["));
        assert!(lines[0].contains("] open root: "));
    }

    #[test]
    fn test_list_dir_on_file_logs_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "").unwrap();

        let (_out, lines) = list("mount-3 /plain", &file);

        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with("ERRO["));
        assert!(lines[0].contains("] open mount-3 /plain: "));
    }

    #[test]
    fn test_unreadable_directory_stops_after_lstat() {
        use std::os::unix::fs::PermissionsExt;

        // Root bypasses directory permissions.
        if nix::unistd::geteuid().is_root() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let (_out, lines) = report("root", &locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();

        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].starts_with("DEBU["));
        assert!(lines[0].contains("lstat root: "));
        assert!(lines[1].starts_with("ERRO["));
        assert!(lines[1].contains("] open root: "));
    }

    #[test]
    fn test_stat_summary_display() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = fs::symlink_metadata(dir.path()).unwrap();
        let summary = StatSummary::new(&metadata);

        assert!(summary.is_dir);
        assert_eq!(summary.raw.ino, metadata.ino());
        let rendered = summary.to_string();
        assert!(rendered.starts_with(&format!("{} d", metadata.len())));
        assert!(!rendered.contains("unknown"));
    }
}
