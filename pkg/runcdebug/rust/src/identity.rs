// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use nix::unistd::{getgid, getgroups, gethostname, getuid};

use crate::sink::DumpLog;

/// Facts about the running process. Lookups that can fail keep their error so
/// it ends up in the dump instead of aborting it.
#[derive(Debug)]
pub struct ProcessFacts {
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
    pub uid: u32,
    pub user: Option<OsString>,
    pub gid: u32,
    pub group: Option<OsString>,
    pub groups: io::Result<Vec<u32>>,
    pub cwd: io::Result<PathBuf>,
    pub hostname: io::Result<OsString>,
}

impl ProcessFacts {
    pub fn collect() -> Self {
        let uid = getuid().as_raw();
        let gid = getgid().as_raw();

        Self {
            args: env::args_os().collect(),
            env: env::vars_os().collect(),
            uid,
            user: uzers::get_user_by_uid(uid).map(|u| u.name().to_os_string()),
            gid,
            group: uzers::get_group_by_gid(gid).map(|g| g.name().to_os_string()),
            groups: getgroups()
                .map(|groups| groups.iter().map(|g| g.as_raw()).collect())
                .map_err(io::Error::from),
            cwd: env::current_dir(),
            hostname: gethostname().map_err(io::Error::from),
        }
    }

    pub fn write_to(&self, log: &mut DumpLog) {
        log.debug(format_args!("args: {:?}", self.args));

        let env: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
            .collect();
        log.debug(format_args!("env: {env:?}"));

        let uid = with_name(self.uid, self.user.as_ref());
        let gid = with_name(self.gid, self.group.as_ref());
        match &self.groups {
            Ok(groups) => log.debug(format_args!("uid: {uid}, gid: {gid}, groups: {groups:?}")),
            Err(e) => log.error(format_args!("uid: {uid}, gid: {gid}, groups: {e}")),
        }

        match &self.cwd {
            Ok(cwd) => log.debug(format_args!("cwd: {}", cwd.display())),
            Err(e) => log.error(format_args!("cwd: {e}")),
        }

        match &self.hostname {
            Ok(host) => log.debug(format_args!("host: {}", host.to_string_lossy())),
            Err(e) => log.error(format_args!("host: {e}")),
        }
    }
}

fn with_name(id: u32, name: Option<&OsString>) -> String {
    match name {
        Some(name) => format!("{id} ({})", name.to_string_lossy()),
        None => id.to_string(),
    }
}
