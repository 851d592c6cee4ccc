// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::config::Config;

/// The terminal belongs to the UI, so stderr is only used when `RUST_LOG`
/// asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Off,
    Stderr,
    File(PathBuf),
}

pub fn destination(file: Option<PathBuf>, rust_log: Option<&str>) -> LogDestination {
    match (file, rust_log.filter(|spec| !spec.trim().is_empty())) {
        (Some(path), _) => LogDestination::File(path),
        (None, Some(_)) => LogDestination::Stderr,
        (None, None) => LogDestination::Off,
    }
}

pub fn init(config: &Config) -> Result<LogDestination> {
    let rust_log = env::var("RUST_LOG").ok();
    let destination = destination(config.log_file(), rust_log.as_deref());

    let mut builder = Builder::new();
    builder.filter_level(config.log_level()?);
    if let Some(spec) = rust_log.as_deref() {
        builder.parse_filters(spec);
    }

    match &destination {
        LogDestination::Off => return Ok(destination),
        LogDestination::Stderr => {
            builder.target(Target::Stderr);
        }
        LogDestination::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }

    builder.try_init().context("initialise logger")?;
    Ok(destination)
}
