// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The subset of an OCI bundle `config.json` that the dump inspects.

use serde::Deserialize;

const BIND_MOUNT_TYPE: &str = "bind";

#[derive(Debug, Default, Deserialize)]
pub struct ContainerConfig {
    #[serde(default)]
    pub root: Root,
    #[serde(default)]
    pub mounts: Vec<Mount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Mount {
    #[serde(default, rename = "type")]
    pub mount_type: String,
    #[serde(default)]
    pub source: String,
}

impl Mount {
    pub fn is_bind(&self) -> bool {
        self.mount_type == BIND_MOUNT_TYPE
    }
}

impl ContainerConfig {
    pub fn parse(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Bind mounts paired with their position in the full mount list.
    pub fn bind_mounts(&self) -> impl Iterator<Item = (usize, &Mount)> {
        self.mounts.iter().enumerate().filter(|(_, m)| m.is_bind())
    }
}
