// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;
use std::fs::Metadata;
use std::os::unix::fs::PermissionsExt;

// `mode_t` is u16 on some platforms.
#[allow(clippy::unnecessary_cast)]
const fn bits(mode: libc::mode_t) -> u32 {
    mode as u32
}

const S_IFMT: u32 = bits(libc::S_IFMT);
const S_IFSOCK: u32 = bits(libc::S_IFSOCK);
const S_IFLNK: u32 = bits(libc::S_IFLNK);
const S_IFREG: u32 = bits(libc::S_IFREG);
const S_IFBLK: u32 = bits(libc::S_IFBLK);
const S_IFDIR: u32 = bits(libc::S_IFDIR);
const S_IFCHR: u32 = bits(libc::S_IFCHR);
const S_IFIFO: u32 = bits(libc::S_IFIFO);

const S_ISUID: u32 = bits(libc::S_ISUID);
const S_ISGID: u32 = bits(libc::S_ISGID);
const S_ISVTX: u32 = bits(libc::S_ISVTX);

/// Raw `st_mode` bits, type included. Displays like `ls -l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode(pub u32);

impl Mode {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Mode(metadata.permissions().mode())
    }

    fn file_type(self) -> u32 {
        self.0 & S_IFMT
    }

    pub fn is_symlink(self) -> bool {
        self.file_type() == S_IFLNK
    }

    pub fn is_dir(self) -> bool {
        self.file_type() == S_IFDIR
    }

    fn type_char(self) -> char {
        match self.file_type() {
            S_IFREG => '-',
            S_IFDIR => 'd',
            S_IFLNK => 'l',
            S_IFCHR => 'c',
            S_IFBLK => 'b',
            S_IFIFO => 'p',
            S_IFSOCK => 's',
            _ => '?',
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.0;
        let bit = |mask: u32, c: char| if bits & mask != 0 { c } else { '-' };
        // Execute slot doubles as the special-bit marker.
        let exec = |x_mask: u32, special: u32, set: char, unset: char| {
            match (bits & x_mask != 0, bits & special != 0) {
                (true, true) => set,
                (false, true) => unset,
                (true, false) => 'x',
                (false, false) => '-',
            }
        };

        let s: String = [
            self.type_char(),
            bit(0o400, 'r'),
            bit(0o200, 'w'),
            exec(0o100, S_ISUID, 's', 'S'),
            bit(0o040, 'r'),
            bit(0o020, 'w'),
            exec(0o010, S_ISGID, 's', 'S'),
            bit(0o004, 'r'),
            bit(0o002, 'w'),
            exec(0o001, S_ISVTX, 't', 'T'),
        ]
        .into_iter()
        .collect();

        f.write_str(&s)
    }
}
