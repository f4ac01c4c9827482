// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::bundle::ContainerConfig;
use crate::config::DumpOptions;
use crate::errors::Error;
use crate::identity::ProcessFacts;
use crate::report::report_path;
use crate::sink::DumpLog;

/// Writes a debug dump for container `id` and returns the log file path.
///
/// Only failing to create the log or to read and parse the container config
/// aborts the dump. In the config case the log file is kept and holds
/// everything written up to that point.
pub fn run_debug_dump(id: &str, options: &DumpOptions) -> Result<PathBuf, Error> {
    let mut log = DumpLog::create(&options.output_dir, id)?;
    debug!("writing debug dump for {id} to {}", log.path().display());

    ProcessFacts::collect().write_to(&mut log);

    let config_path = options.config_path.as_path();
    let data = match fs::read(config_path) {
        Ok(data) => {
            log.debug(format_args!(
                "config: read {} ({} bytes)",
                config_path.display(),
                data.len()
            ));
            data
        }
        Err(source) => {
            log.error(format_args!("config: {}: {source}", config_path.display()));
            return Err(Error::ReadConfig {
                path: config_path.to_path_buf(),
                source,
            });
        }
    };

    log.write_raw(&data);
    log.write_raw(b"\n");

    let config = match ContainerConfig::parse(&data) {
        Ok(config) => config,
        Err(source) => {
            log.error(format_args!("config: parse: {source}"));
            return Err(Error::ParseConfig {
                path: config_path.to_path_buf(),
                source,
            });
        }
    };

    report_path(&mut log, "root", Path::new(&config.root.path));
    for (index, mount) in config.bind_mounts() {
        let label = format!("mount-{index} {}", mount.source);
        report_path(&mut log, &label, Path::new(&mount.source));
    }

    debug!("debug dump for {id} complete");
    Ok(log.path().to_path_buf())
}
