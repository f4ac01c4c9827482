// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use runc_debug::{DumpOptions, run_debug_dump};

#[derive(Parser, Debug)]
#[command(name = "runc-debug")]
#[command(about = "Dump process, identity and bundle filesystem state for a failed container", long_about = None)]
struct Args {
    /// Container ID, used to name the dump file
    id: String,

    /// Directory to write the dump into (overrides RUNC_DEBUG_PATH)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Container config to inspect
    #[arg(long, default_value = runc_debug::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbosity of this tool's own logging
    #[arg(long, default_value = "info")]
    log_level: log::Level,
}

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level)?;

    let mut options = DumpOptions::from_env();
    if let Some(dir) = args.output_dir {
        options.output_dir = dir;
    }
    options.config_path = args.config;

    let path = run_debug_dump(&args.id, &options)
        .with_context(|| format!("debug dump for {} failed", args.id))?;
    info!("Wrote debug dump to {}", path.display());
    println!("{}", path.display());

    Ok(())
}
