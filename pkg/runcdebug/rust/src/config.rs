// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;
use std::path::PathBuf;

pub const DEBUG_PATH_ENV: &str = "RUNC_DEBUG_PATH";
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/runc-debug";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Where a dump writes its log and which container config it inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub output_dir: PathBuf,
    /// Relative paths resolve against the working directory at dump time.
    pub config_path: PathBuf,
}

impl DumpOptions {
    pub fn new(output_dir: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            config_path: config_path.into(),
        }
    }

    /// Reads `RUNC_DEBUG_PATH` once. An empty value counts as unset.
    pub fn from_env() -> Self {
        Self::new(output_dir_from_env(), DEFAULT_CONFIG_PATH)
    }
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR, DEFAULT_CONFIG_PATH)
    }
}

fn output_dir_from_env() -> PathBuf {
    match env::var_os(DEBUG_PATH_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
    }
}
